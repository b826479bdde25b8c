//! # Integration Tests
//!
//! Flows across the register engine and its telemetry, driven from an
//! async runtime the way a request handler would call the engine.

pub mod flows;
