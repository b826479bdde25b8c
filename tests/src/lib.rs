//! # Register Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Allocation and query throughput
//! │   ├── allocation.rs
//! │   └── queries.rs
//! │
//! └── integration/      # Engine + telemetry flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p register-tests
//!
//! # Integration flows only
//! cargo test -p register-tests integration::
//!
//! # Benchmarks
//! cargo bench -p register-tests
//! ```

pub mod benchmarks;
pub mod integration;
