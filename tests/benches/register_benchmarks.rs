//! # Register Engine Benchmarks
//!
//! | Path | Measures |
//! |------|----------|
//! | allocation/sequential | one numbering transaction, uncontended |
//! | allocation/contended | same-year vs spread-year writers |
//! | reader | month page, search, index letter, stats |

use criterion::{criterion_group, criterion_main};
use register_tests::benchmarks::{allocation, queries};

criterion_group!(
    name = allocation_benches;
    config = criterion::Criterion::default();
    targets = allocation::sequential_creates, allocation::contended_creates
);

criterion_group!(
    name = reader_benches;
    config = criterion::Criterion::default();
    targets = queries::reader_queries
);

criterion_main!(allocation_benches, reader_benches);
