//! # Engine Configuration
//!
//! All values have sensible defaults; `from_env()` overlays environment
//! variables the same way the telemetry config does.

use crate::domain::value_objects::{NumberingPool, ScopeKey, ScopePair};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use std::env;
use std::time::Duration;

/// Numbering-pool policy for land-registry (PPAT) deeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LandRegistryPool {
    /// PPAT deeds draw from the notarial counters (default).
    #[default]
    Shared,
    /// PPAT deeds keep their own yearly and monthly counters.
    Separate,
}

impl LandRegistryPool {
    /// Pool an entry with the given flag belongs to.
    pub fn pool_for(&self, is_land_registry_act: bool) -> NumberingPool {
        match (self, is_land_registry_act) {
            (LandRegistryPool::Separate, true) => NumberingPool::LandRegistry,
            _ => NumberingPool::Notarial,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "shared" => Some(LandRegistryPool::Shared),
            "separate" => Some(LandRegistryPool::Separate),
            _ => None,
        }
    }
}

/// Bounded exponential backoff for transient conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Upper bound on the exponential part.
    pub max_delay: Duration,
    /// Upper bound on the uniformly random extra delay.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(200),
            jitter: Duration::from_millis(5),
        }
    }
}

impl RetryPolicy {
    /// Deterministic part of the delay after `attempt` (1-based) failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Full delay including jitter.
    pub fn backoff<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rng.gen_range(0..=jitter_ms)
        };
        self.delay_for(attempt) + Duration::from_millis(extra)
    }
}

/// Configuration for the Register Engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Office namespace for every key (letters, digits, `-`, `_`).
    pub office_id: String,
    /// Counter pool policy for PPAT deeds.
    pub land_registry_pool: LandRegistryPool,
    /// Retry policy for transient conflicts.
    pub retry: RetryPolicy,
    /// Time-to-live of cached `stats(year)` results; zero disables caching.
    pub stats_cache_ttl: Duration,
    /// Number of years kept in the stats cache.
    pub stats_cache_capacity: usize,
    /// Upper clamp on query `limit`.
    pub max_page_size: usize,
    /// Upper bound on each free-text field, in characters.
    pub max_text_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            office_id: "main".to_string(),
            land_registry_pool: LandRegistryPool::Shared,
            retry: RetryPolicy::default(),
            stats_cache_ttl: Duration::from_secs(2),
            stats_cache_capacity: 16,
            max_page_size: 500,
            max_text_len: 2_000,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay environment variables on the defaults.
    ///
    /// - `REGISTER_OFFICE_ID`
    /// - `REGISTER_LAND_REGISTRY_POOL` (`shared` | `separate`)
    /// - `REGISTER_MAX_ATTEMPTS`
    /// - `REGISTER_RETRY_BASE_MS`, `REGISTER_RETRY_MAX_MS`, `REGISTER_RETRY_JITTER_MS`
    /// - `REGISTER_STATS_CACHE_TTL_MS`
    /// - `REGISTER_MAX_PAGE_SIZE`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let millis = |name: &str, fallback: Duration| {
            env::var(name)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(fallback)
        };

        Self {
            office_id: env::var("REGISTER_OFFICE_ID").unwrap_or(defaults.office_id),
            land_registry_pool: env::var("REGISTER_LAND_REGISTRY_POOL")
                .ok()
                .and_then(|v| LandRegistryPool::parse(&v))
                .unwrap_or(defaults.land_registry_pool),
            retry: RetryPolicy {
                max_attempts: env::var("REGISTER_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.retry.max_attempts),
                base_delay: millis("REGISTER_RETRY_BASE_MS", defaults.retry.base_delay),
                max_delay: millis("REGISTER_RETRY_MAX_MS", defaults.retry.max_delay),
                jitter: millis("REGISTER_RETRY_JITTER_MS", defaults.retry.jitter),
            },
            stats_cache_ttl: millis("REGISTER_STATS_CACHE_TTL_MS", defaults.stats_cache_ttl),
            stats_cache_capacity: defaults.stats_cache_capacity,
            max_page_size: env::var("REGISTER_MAX_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_page_size),
            max_text_len: defaults.max_text_len,
        }
    }

    /// Set the office namespace.
    pub fn with_office(mut self, office_id: impl Into<String>) -> Self {
        self.office_id = office_id.into();
        self
    }

    /// Set the PPAT pool policy.
    pub fn with_land_registry_pool(mut self, pool: LandRegistryPool) -> Self {
        self.land_registry_pool = pool;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the stats cache TTL (zero disables the cache).
    pub fn with_stats_cache_ttl(mut self, ttl: Duration) -> Self {
        self.stats_cache_ttl = ttl;
        self
    }

    /// Set the maximum page size.
    pub fn with_max_page_size(mut self, size: usize) -> Self {
        self.max_page_size = size;
        self
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.office_id.is_empty() {
            return Err("office_id must not be empty".to_string());
        }
        if !self
            .office_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!(
                "office_id {:?} may only contain letters, digits, '-' and '_'",
                self.office_id
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err("retry.max_attempts must be at least 1".to_string());
        }
        if self.max_page_size == 0 {
            return Err("max_page_size must be at least 1".to_string());
        }
        Ok(())
    }

    /// Counter scopes an entry executed on `executed_at` allocates from.
    ///
    /// The year and month come from the deed's execution date, never from
    /// the wall clock.
    pub fn scope_keys_for(&self, executed_at: NaiveDate, is_land_registry_act: bool) -> ScopePair {
        let pool = self.land_registry_pool.pool_for(is_land_registry_act);
        ScopePair {
            yearly: ScopeKey::yearly(pool, executed_at.year()),
            monthly: ScopeKey::monthly(pool, executed_at.year(), executed_at.month()),
        }
    }
}
