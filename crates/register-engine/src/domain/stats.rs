//! # Register Statistics
//!
//! Informational aggregate over one year. Never consulted by allocation, so
//! it may be served from a short-lived cache.

use crate::domain::entities::RegisterEntry;
use crate::domain::value_objects::NumberingPool;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Aggregate view of one register year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterStats {
    /// Year the aggregate covers.
    pub year: i32,
    /// Number of committed entries in the year, across pools.
    pub total_for_year: u64,
    /// Highest notarial `yearly_seq`; 0 for an empty year.
    pub last_yearly_seq: u64,
    /// Entry count per month (1-12). Every month is present, NIHIL months as 0.
    pub per_month_counts: BTreeMap<u32, u64>,
    /// Highest notarial `monthly_seq` per month with entries.
    pub last_monthly_seq: BTreeMap<u32, u64>,
    /// Highest land-registry `yearly_seq`, only when PPAT deeds have their own pool.
    pub last_land_registry_seq: Option<u64>,
}

impl RegisterStats {
    /// Stats of a year without entries.
    pub fn empty(year: i32, separate_land_registry: bool) -> Self {
        Self {
            year,
            total_for_year: 0,
            last_yearly_seq: 0,
            per_month_counts: (1..=12).map(|m| (m, 0)).collect(),
            last_monthly_seq: BTreeMap::new(),
            last_land_registry_seq: separate_land_registry.then_some(0),
        }
    }

    /// Aggregate committed entries. Entries of other years are ignored.
    pub fn from_entries<'a, I>(year: i32, entries: I, separate_land_registry: bool) -> Self
    where
        I: IntoIterator<Item = &'a RegisterEntry>,
    {
        let mut stats = Self::empty(year, separate_land_registry);
        for entry in entries.into_iter().filter(|e| e.year() == year) {
            stats.total_for_year += 1;
            *stats.per_month_counts.entry(entry.month()).or_insert(0) += 1;

            match entry.pool {
                NumberingPool::Notarial => {
                    stats.last_yearly_seq = stats.last_yearly_seq.max(entry.yearly_seq);
                    let last = stats.last_monthly_seq.entry(entry.month()).or_insert(0);
                    *last = (*last).max(entry.monthly_seq);
                }
                NumberingPool::LandRegistry => {
                    let last = stats.last_land_registry_seq.get_or_insert(0);
                    *last = (*last).max(entry.yearly_seq);
                }
            }
        }
        stats
    }

    /// Count for one month, 0 when the month has no entries.
    pub fn count_for_month(&self, month: u32) -> u64 {
        self.per_month_counts.get(&month).copied().unwrap_or(0)
    }

    /// Months of the year with no entries (printed as NIHIL).
    pub fn nihil_months(&self) -> Vec<u32> {
        self.per_month_counts
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(month, _)| *month)
            .collect()
    }
}

/// Year-keyed LRU cache of [`RegisterStats`] with a time-to-live.
///
/// Writers call [`StatsCache::invalidate`] after every commit, so a caller
/// always reads its own writes; the TTL only bounds staleness from other
/// processes sharing the store.
///
/// Every invalidation bumps the year's generation. A reader takes the
/// generation before scanning and hands it back to [`StatsCache::put`];
/// if a commit landed in between, the scan may predate it and is not cached.
pub struct StatsCache {
    ttl: Duration,
    state: Option<Mutex<CacheState>>,
}

struct CacheState {
    entries: LruCache<i32, (Instant, RegisterStats)>,
    generations: HashMap<i32, u64>,
}

impl StatsCache {
    /// A zero `ttl` or `capacity` disables caching.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let state = match NonZeroUsize::new(capacity) {
            Some(capacity) if !ttl.is_zero() => Some(Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                generations: HashMap::new(),
            })),
            _ => None,
        };
        Self { ttl, state }
    }

    /// Fresh cached stats for a year.
    pub fn get(&self, year: i32) -> Option<RegisterStats> {
        let mut state = self.state.as_ref()?.lock();
        let (stored_at, stats) = state.entries.get(&year)?;
        if stored_at.elapsed() < self.ttl {
            return Some(stats.clone());
        }
        state.entries.pop(&year);
        None
    }

    /// Current generation of a year; read it before computing stats.
    pub fn generation(&self, year: i32) -> u64 {
        self.state
            .as_ref()
            .and_then(|state| state.lock().generations.get(&year).copied())
            .unwrap_or(0)
    }

    /// Store stats computed from a scan that started at `generation`.
    ///
    /// Returns whether the value was cached.
    pub fn put(&self, stats: RegisterStats, generation: u64) -> bool {
        let Some(state) = &self.state else {
            return false;
        };
        let mut state = state.lock();
        let current = state.generations.get(&stats.year).copied().unwrap_or(0);
        if current != generation {
            return false;
        }
        state.entries.put(stats.year, (Instant::now(), stats));
        true
    }

    /// Drop the cached value for a year and fence off scans already running.
    pub fn invalidate(&self, year: i32) {
        if let Some(state) = &self.state {
            let mut state = state.lock();
            state.entries.pop(&year);
            *state.generations.entry(year).or_insert(0) += 1;
        }
    }

    /// Whether caching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }
}
