//! Prometheus metrics for the Register Engine.
//!
//! All metrics follow the naming convention `register_<metric>_<unit>` and
//! live in a crate-level registry so several engines in one process share them.
//!
//! - **Counter**: entries created, retries, contention failures, rejections
//! - **Histogram**: query latency by kind

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};
use std::time::Instant;

use crate::TelemetryError;

/// Collectors of the engine, registered together.
pub struct RegisterMetrics {
    registry: Registry,
    /// Committed register entries by numbering pool.
    pub entries_created: IntCounterVec,
    /// Transient conflicts retried by the writer.
    pub allocation_retries: IntCounter,
    /// Creations that exhausted the retry budget.
    pub contention_failures: IntCounter,
    /// Requests rejected before a transaction was opened.
    pub validation_rejections: IntCounter,
    /// Name-index rows committed.
    pub index_rows_written: IntCounter,
    /// Query latency by kind (`entries`, `index`, `stats`).
    pub query_duration: HistogramVec,
}

impl RegisterMetrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let entries_created = IntCounterVec::new(
            Opts::new(
                "register_entries_created_total",
                "Register entries committed, by numbering pool",
            ),
            &["pool"],
        )?;
        let allocation_retries = IntCounter::new(
            "register_allocation_retries_total",
            "Transient conflicts retried while allocating register numbers",
        )?;
        let contention_failures = IntCounter::new(
            "register_contention_failures_total",
            "Creations that gave up after exhausting the retry budget",
        )?;
        let validation_rejections = IntCounter::new(
            "register_validation_rejections_total",
            "Creation or amendment requests rejected by validation",
        )?;
        let index_rows_written = IntCounter::new(
            "register_index_rows_written_total",
            "Name-index rows committed alongside register entries",
        )?;
        let query_duration = HistogramVec::new(
            HistogramOpts::new(
                "register_query_duration_seconds",
                "Time spent serving register queries",
            )
            .buckets(exponential_buckets(0.0005, 2.0, 14)?),
            &["kind"],
        )?;

        registry.register(Box::new(entries_created.clone()))?;
        registry.register(Box::new(allocation_retries.clone()))?;
        registry.register(Box::new(contention_failures.clone()))?;
        registry.register(Box::new(validation_rejections.clone()))?;
        registry.register(Box::new(index_rows_written.clone()))?;
        registry.register(Box::new(query_duration.clone()))?;

        Ok(Self {
            registry,
            entries_created,
            allocation_retries,
            contention_failures,
            validation_rejections,
            index_rows_written,
            query_duration,
        })
    }
}

lazy_static! {
    static ref METRICS: Result<RegisterMetrics, String> =
        RegisterMetrics::new().map_err(|e| e.to_string());
}

/// Global metrics, or the reason they could not be created.
pub fn metrics() -> Result<&'static RegisterMetrics, TelemetryError> {
    METRICS
        .as_ref()
        .map_err(|e| TelemetryError::MetricsInit(e.clone()))
}

/// Register all collectors; safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    metrics().map(|_| ())
}

/// Record a committed entry.
pub fn record_entry_created(pool: &str) {
    if let Ok(m) = metrics() {
        m.entries_created.with_label_values(&[pool]).inc();
    }
}

/// Record a retried conflict.
pub fn record_allocation_retry() {
    if let Ok(m) = metrics() {
        m.allocation_retries.inc();
    }
}

/// Record an exhausted retry budget.
pub fn record_contention_failure() {
    if let Ok(m) = metrics() {
        m.contention_failures.inc();
    }
}

/// Record a validation rejection.
pub fn record_validation_rejection() {
    if let Ok(m) = metrics() {
        m.validation_rejections.inc();
    }
}

/// Record committed index rows.
pub fn record_index_rows(rows: u64) {
    if let Ok(m) = metrics() {
        m.index_rows_written.inc_by(rows);
    }
}

/// Encode all metrics in the Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let metrics = metrics()?;
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&metrics.registry.gather(), &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard observing `register_query_duration_seconds` on drop.
pub struct QueryTimer {
    kind: &'static str,
    start: Instant,
}

impl QueryTimer {
    /// Start timing a query of the given kind.
    pub fn start(kind: &'static str) -> Self {
        Self {
            kind,
            start: Instant::now(),
        }
    }
}

impl Drop for QueryTimer {
    fn drop(&mut self) {
        if let Ok(m) = metrics() {
            m.query_duration
                .with_label_values(&[self.kind])
                .observe(self.start.elapsed().as_secs_f64());
        }
    }
}
