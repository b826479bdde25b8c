//! # Register Benchmarks
//!
//! Allocation throughput (single writer and contended) and reader latency
//! over a populated year.

pub mod allocation;
pub mod queries;
