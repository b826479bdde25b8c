//! # Ports Layer
//!
//! - `inbound.rs` - Driving ports (API exposed to the surrounding application)
//! - `outbound.rs` - Driven ports (storage, clock, ids, codec, index projection)

pub mod inbound;
pub mod outbound;
