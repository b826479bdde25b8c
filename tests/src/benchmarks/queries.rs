//! # Query Benchmarks
//!
//! Reader cost over a year of entries: month page, free-text search,
//! name-index letter and uncached stats.

use chrono::NaiveDate;
use criterion::{black_box, BenchmarkId, Criterion};
use rand::seq::SliceRandom;
use rand::Rng;
use register_engine::{
    ActorId, EngineConfig, IndexFilter, InMemoryRegisterService, NewRegisterEntry, RegisterApi,
    RegisterFilter,
};
use std::time::Duration;

const SURNAMES: [&str; 8] = [
    "Wijaya", "Santoso", "Halim", "Kusuma", "Pratama", "Lestari", "Nugroho", "Siregar",
];
const NATURES: [&str; 4] = ["Deed of Sale", "Deed of Grant", "Power of Attorney", "Lease"];

fn populated(entries: usize) -> InMemoryRegisterService {
    let service = InMemoryRegisterService::in_memory(
        EngineConfig::default().with_stats_cache_ttl(Duration::ZERO),
    )
    .unwrap();
    let mut rng = rand::thread_rng();

    for _ in 0..entries {
        let executed_at =
            NaiveDate::from_ymd_opt(2025, rng.gen_range(1..=12), rng.gen_range(1..=28))
                .unwrap_or_default();
        let names: Vec<String> = (0..rng.gen_range(1..=3))
            .map(|_| SURNAMES.choose(&mut rng).copied().unwrap_or("Anon").to_string())
            .collect();
        let nature = NATURES.choose(&mut rng).copied().unwrap_or("Deed");
        service
            .create_entry(NewRegisterEntry::new(
                executed_at,
                nature,
                names,
                ActorId::new("bench"),
            ))
            .unwrap();
    }
    service
}

pub fn reader_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("register/reader");
    group.measurement_time(Duration::from_secs(5));

    for size in [1_000usize, 10_000] {
        let service = populated(size);

        group.bench_with_input(BenchmarkId::new("month_page", size), &size, |b, _| {
            b.iter(|| black_box(service.query_entries(&RegisterFilter::for_month(2025, 6)).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("search", size), &size, |b, _| {
            let filter = RegisterFilter::for_year(2025).with_search("grant");
            b.iter(|| black_box(service.query_entries(&filter).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("index_letter", size), &size, |b, _| {
            let filter = IndexFilter::for_letter('S').in_year(2025);
            b.iter(|| black_box(service.query_index(&filter).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("stats_uncached", size), &size, |b, _| {
            b.iter(|| black_box(service.stats(2025).unwrap()))
        });
    }

    group.finish();
}
