//! # RocksDB Register Tests
//!
//! Durability and locking of the RocksDB-backed register.

#![cfg(feature = "rocksdb")]

use chrono::NaiveDate;
use register_engine::adapters::RocksDbConfig;
use register_engine::{
    ActorId, EngineConfig, NewRegisterEntry, RegisterApi, RegisterError, RegisterFilter,
    RetryPolicy, RocksDbRegisterService, StorageError,
};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn deed(month: u32, day: u32, name: &str) -> NewRegisterEntry {
    NewRegisterEntry::new(
        NaiveDate::from_ymd_opt(2025, month, day).unwrap(),
        "Deed of Grant",
        [name],
        ActorId::new("staff"),
    )
}

#[test]
fn test_entries_survive_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let service =
            RocksDbRegisterService::open(RocksDbConfig::for_testing(dir.path()), EngineConfig::default())
                .unwrap();
        service.create_entry(deed(3, 5, "Siti")).unwrap();
        service.create_entry(deed(3, 10, "Budi")).unwrap();
    }

    let service =
        RocksDbRegisterService::open(RocksDbConfig::for_testing(dir.path()), EngineConfig::default())
            .unwrap();
    let next = service.create_entry(deed(3, 20, "Ani")).unwrap();
    assert_eq!((next.yearly_seq, next.monthly_seq), (3, 3));

    let page = service.query_entries(&RegisterFilter::for_month(2025, 3)).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(service.stats(2025).unwrap().count_for_month(3), 3);
}

#[test]
fn test_second_open_reports_locked() {
    let dir = TempDir::new().unwrap();
    let _first =
        RocksDbRegisterService::open(RocksDbConfig::for_testing(dir.path()), EngineConfig::default())
            .unwrap();

    let second =
        RocksDbRegisterService::open(RocksDbConfig::for_testing(dir.path()), EngineConfig::default());
    assert!(matches!(
        second,
        Err(RegisterError::Storage(StorageError::Locked { .. }))
    ));
}

#[test]
fn test_concurrent_creates_are_gapless() {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig::default().with_retry(RetryPolicy {
        max_attempts: 20,
        ..RetryPolicy::default()
    });
    let service = Arc::new(
        RocksDbRegisterService::open(RocksDbConfig::for_testing(dir.path()), config).unwrap(),
    );

    let handles: Vec<_> = (0..20u32)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.create_entry(deed(4, 1 + i, "Dewi")).unwrap())
        })
        .collect();

    let mut numbers: Vec<u64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().yearly_seq)
        .collect();
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=20).collect::<Vec<u64>>());
}
