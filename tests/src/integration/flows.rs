//! # Integration Test Flows
//!
//! The engine is synchronous and shared by reference; async callers hand
//! each request to `spawn_blocking`. These flows check that numbering,
//! the name index, amendments and metrics line up end to end.

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use register_engine::{
        ActorId, AdministrativePatch, DocumentId, EngineConfig, IndexFilter, InMemoryRegisterService,
        LandRegistryPool, NewRegisterEntry, NumberingPool, RegisterApi, RegisterError,
        RegisterFilter, RetryPolicy,
    };
    use register_telemetry::{gather_metrics, init_telemetry, register_metrics, TelemetryConfig};
    use std::collections::BTreeSet;
    use std::sync::{Arc, Once};
    use std::time::Duration;

    static TELEMETRY: Once = Once::new();

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn init_test_telemetry() {
        TELEMETRY.call_once(|| {
            // Another test binary or harness may already own the global subscriber.
            if let Ok(guard) = init_telemetry(TelemetryConfig::for_tests()) {
                std::mem::forget(guard);
            }
        });
        register_metrics().unwrap();
    }

    fn quick_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            jitter: Duration::from_millis(2),
        }
    }

    fn make_service(config: EngineConfig) -> Arc<InMemoryRegisterService> {
        Arc::new(InMemoryRegisterService::in_memory(config).unwrap())
    }

    fn deed(month: u32, day: u32, names: &[&str]) -> NewRegisterEntry {
        NewRegisterEntry::new(
            NaiveDate::from_ymd_opt(2025, month, day).unwrap(),
            "Deed of Establishment",
            names.iter().copied(),
            ActorId::new("front-desk"),
        )
    }

    // =============================================================================
    // INTEGRATION TESTS: CONCURRENT REQUEST HANDLERS
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_handlers_receive_gapless_numbers() {
        init_test_telemetry();
        let service = make_service(EngineConfig::default().with_retry(quick_retry(50)));

        let mut handles = Vec::new();
        for i in 0..50u32 {
            let service = Arc::clone(&service);
            handles.push(tokio::task::spawn_blocking(move || {
                service.create_entry(deed(2 + i % 2, 1 + i % 28, &["Hartono", "Wulan"]))
            }));
        }

        let mut yearly = BTreeSet::new();
        for handle in handles {
            let entry = handle.await.unwrap().unwrap();
            assert!(yearly.insert(entry.yearly_seq), "duplicate yearly number");
        }
        assert_eq!(yearly, (1..=50).collect::<BTreeSet<u64>>());

        let stats = service.stats(2025).unwrap();
        assert_eq!(stats.count_for_month(2), 25);
        assert_eq!(stats.count_for_month(3), 25);
        assert_eq!(stats.last_monthly_seq.get(&2), Some(&25));

        let index = service
            .query_index(&IndexFilter::for_letter('h').in_year(2025).page(0, 500))
            .unwrap();
        assert_eq!(index.total, 50);

        let exposition = gather_metrics().unwrap();
        assert!(exposition.contains("register_entries_created_total"));
        assert!(exposition.contains("register_index_rows_written_total"));
    }

    #[tokio::test]
    async fn test_contention_surfaces_as_retryable_error() {
        init_test_telemetry();
        let service = make_service(EngineConfig::default().with_retry(quick_retry(2)));
        service.store().inject_commit_conflicts(2);

        let busy = {
            let service = Arc::clone(&service);
            tokio::task::spawn_blocking(move || service.create_entry(deed(5, 1, &["Yusuf"])))
                .await
                .unwrap()
        };
        match busy {
            Err(RegisterError::Contention { scope, attempts }) => {
                assert_eq!(scope, "yearly/N/2025");
                assert_eq!(attempts, 2);
            }
            other => panic!("expected contention, got {other:?}"),
        }

        // Resubmitting succeeds and the failed attempts left no gap.
        let entry = service.create_entry(deed(5, 1, &["Yusuf"])).unwrap();
        assert_eq!((entry.yearly_seq, entry.monthly_seq), (1, 1));
        assert!(gather_metrics()
            .unwrap()
            .contains("register_contention_failures_total"));
    }

    // =============================================================================
    // INTEGRATION TESTS: REGISTER LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_create_amend_lookup_flow() {
        init_test_telemetry();
        let service = make_service(EngineConfig::default());

        let rejected = service
            .create_entry(deed(7, 14, &["Rahmat", "  ", "Sari"]).with_notes("original"))
            .unwrap_err();
        assert!(matches!(rejected, RegisterError::Validation(_)));

        let created = service
            .create_entry(deed(7, 14, &["Rahmat", "Sari"]).with_notes("original"))
            .unwrap();

        let amended = service
            .amend_administrative_fields(
                created.id,
                AdministrativePatch::default()
                    .set_notes("corrected")
                    .link_document(DocumentId::new("doc-77")),
                ActorId::new("supervisor"),
            )
            .unwrap();
        assert_eq!(amended.notes.as_deref(), Some("corrected"));
        assert_eq!(amended.yearly_seq, created.yearly_seq);
        assert_eq!(amended.amended_by_actor_id, Some(ActorId::new("supervisor")));

        let by_number = service
            .get_entry_by_number(2025, NumberingPool::Notarial, created.yearly_seq)
            .unwrap();
        assert_eq!(by_number, amended);
        assert_eq!(service.get_entry(created.id).unwrap(), amended);

        let sari = service
            .query_index(&IndexFilter::for_letter('S').in_year(2025))
            .unwrap();
        assert_eq!(sari.total, 1);
        assert_eq!(sari.items[0].appearer_name, "Sari");
        assert_eq!(sari.items[0].yearly_seq, created.yearly_seq);
    }

    #[tokio::test]
    async fn test_separate_land_registry_pool_flow() {
        init_test_telemetry();
        let service = make_service(
            EngineConfig::default().with_land_registry_pool(LandRegistryPool::Separate),
        );

        let notarial = service.create_entry(deed(9, 1, &["Agus"])).unwrap();
        let ppat = service
            .create_entry(deed(9, 2, &["Agus"]).land_registry_act())
            .unwrap();
        let second_notarial = service.create_entry(deed(9, 3, &["Dian"])).unwrap();

        assert_eq!(notarial.yearly_seq, 1);
        assert_eq!(ppat.pool, NumberingPool::LandRegistry);
        assert_eq!(ppat.yearly_seq, 1);
        assert_eq!(second_notarial.yearly_seq, 2);

        let stats = service.stats(2025).unwrap();
        assert_eq!(stats.total_for_year, 3);
        assert_eq!(stats.last_yearly_seq, 2);
        assert_eq!(stats.last_land_registry_seq, Some(1));

        let september = service
            .query_entries(&RegisterFilter::for_month(2025, 9))
            .unwrap();
        assert_eq!(september.total, 3);
    }
}
