//! # Register Telemetry
//!
//! Observability for the notary Register Engine.
//!
//! - Structured logs through `tracing`, pretty or JSON
//! - Prometheus counters and histograms in a crate-level registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use register_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `register-engine` | Service name in logs |
//! | `REGISTER_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `REGISTER_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `REGISTER_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging, LoggingGuard};
pub use metrics::{
    gather_metrics, record_allocation_retry, record_contention_failure, record_entry_created,
    record_index_rows, record_validation_rejection, register_metrics, QueryTimer, RegisterMetrics,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metric collectors could not be created or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize metrics and the global log subscriber.
///
/// Returns a guard to hold for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    let logging = init_logging(&config)?;
    Ok(TelemetryGuard { _logging: logging })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("[register] shutting down telemetry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_name() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "register-engine");
    }
}
