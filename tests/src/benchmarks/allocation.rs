//! # Allocation Benchmarks
//!
//! - Sequential creates: cost of one numbering transaction
//! - Contended creates: every thread competes for the same yearly counter
//! - Spread creates: threads in different years never wait on each other

use chrono::NaiveDate;
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use register_engine::{
    ActorId, EngineConfig, InMemoryRegisterService, NewRegisterEntry, RegisterApi, RetryPolicy,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn bench_config() -> EngineConfig {
    EngineConfig::default()
        .with_retry(RetryPolicy {
            max_attempts: 100,
            base_delay: Duration::from_micros(200),
            max_delay: Duration::from_millis(5),
            jitter: Duration::from_millis(1),
        })
        .with_stats_cache_ttl(Duration::ZERO)
}

fn deed(year: i32, n: u32) -> NewRegisterEntry {
    NewRegisterEntry::new(
        NaiveDate::from_ymd_opt(year, 1 + n % 12, 1 + n % 28).unwrap_or_default(),
        "Deed of Sale",
        ["Bench Appearer", "Second Party"],
        ActorId::new("bench"),
    )
}

pub fn sequential_creates(c: &mut Criterion) {
    let mut group = c.benchmark_group("register/allocation/sequential");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(1));

    let service = InMemoryRegisterService::in_memory(bench_config()).unwrap();
    let mut n = 0u32;
    group.bench_function("create_entry", |b| {
        b.iter(|| {
            n = n.wrapping_add(1);
            black_box(service.create_entry(deed(2025, n)).unwrap())
        })
    });

    group.finish();
}

fn run_threads(service: &Arc<InMemoryRegisterService>, threads: u32, per_thread: u32, spread: bool) {
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let service = Arc::clone(service);
            thread::spawn(move || {
                let year = if spread { 2000 + t as i32 } else { 2025 };
                for i in 0..per_thread {
                    let _ = service.create_entry(deed(year, t * per_thread + i));
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }
}

pub fn contended_creates(c: &mut Criterion) {
    let mut group = c.benchmark_group("register/allocation/contended");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let per_thread = 25;
    for threads in [2u32, 4, 8, 16] {
        group.throughput(Throughput::Elements((threads * per_thread) as u64));

        group.bench_with_input(BenchmarkId::new("same_year", threads), &threads, |b, &t| {
            b.iter(|| {
                let service = Arc::new(InMemoryRegisterService::in_memory(bench_config()).unwrap());
                run_threads(&service, t, per_thread, false);
            })
        });

        group.bench_with_input(BenchmarkId::new("spread_years", threads), &threads, |b, &t| {
            b.iter(|| {
                let service = Arc::new(InMemoryRegisterService::in_memory(bench_config()).unwrap());
                run_threads(&service, t, per_thread, true);
            })
        });
    }

    group.finish();
}
