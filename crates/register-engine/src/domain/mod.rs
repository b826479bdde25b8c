//! Domain layer: entities, numbering scopes, validation and pure projections.

pub mod config;
pub mod entities;
pub mod errors;
pub mod projector;
pub mod query;
pub mod stats;
pub mod validation;
pub mod value_objects;
