//! # Register Reader
//!
//! Committed-only views: every read goes through the store's non
//! transactional API, so in-flight allocations are never visible and
//! readers never take counter locks.

use super::*;
use crate::domain::config::LandRegistryPool;
use crate::domain::entities::{IndexEntry, RegisterEntry};
use crate::domain::errors::StorageError;
use crate::domain::query::{IndexFilter, Page, RegisterFilter};
use crate::domain::stats::RegisterStats;
use crate::domain::value_objects::{EntryId, KeyPrefix, NumberingPool};
use register_telemetry::QueryTimer;

impl<ST, TS, IG, PJ, RS> RegisterService<ST, TS, IG, PJ, RS>
where
    ST: TransactionalStore,
    TS: TimeSource,
    IG: IdGenerator,
    PJ: IndexProjector,
    RS: RecordSerializer,
{
    pub(crate) fn find_entries(
        &self,
        filter: &RegisterFilter,
    ) -> Result<Page<RegisterEntry>, RegisterError> {
        filter.validate()?;
        let _timer = QueryTimer::start("entries");
        let office = self.config.office_id.as_str();

        let prefix = match filter.year {
            Some(year) => KeyPrefix::entry_year_prefix(office, year),
            None => KeyPrefix::entry_office_prefix(office),
        };
        let mut entries: Vec<RegisterEntry> = self
            .load_entries(&prefix)?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        entries.sort_by(|a, b| filter.compare(a, b));

        let limit = filter.limit.min(self.config.max_page_size);
        let page = Page::from_sorted(entries, filter.offset, limit);
        tracing::debug!(
            office,
            year = ?filter.year,
            month = ?filter.month,
            total = page.total,
            returned = page.items.len(),
            "[register] entries queried"
        );
        Ok(page)
    }

    pub(crate) fn find_index_rows(
        &self,
        filter: &IndexFilter,
    ) -> Result<Page<IndexEntry>, RegisterError> {
        filter.validate()?;
        let _timer = QueryTimer::start("index");
        let office = self.config.office_id.as_str();

        let prefix = match filter.year {
            Some(year) => KeyPrefix::index_year_prefix(office, year),
            None => KeyPrefix::index_office_prefix(office),
        };
        let mut rows = Vec::new();
        for (_, value) in self.store.prefix_scan(&prefix)? {
            let row = self.serializer.deserialize_index(&value)?;
            if filter.matches(&row) {
                rows.push(row);
            }
        }
        rows.sort_by(|a, b| filter.compare(a, b));

        let limit = filter.limit.min(self.config.max_page_size);
        let page = Page::from_sorted(rows, filter.offset, limit);
        tracing::debug!(
            office,
            letter = ?filter.first_letter,
            total = page.total,
            returned = page.items.len(),
            "[register] index queried"
        );
        Ok(page)
    }

    pub(crate) fn compute_stats(&self, year: i32) -> Result<RegisterStats, RegisterError> {
        if let Some(stats) = self.stats_cache.get(year) {
            return Ok(stats);
        }
        let _timer = QueryTimer::start("stats");
        let generation = self.stats_cache.generation(year);

        let prefix = KeyPrefix::entry_year_prefix(&self.config.office_id, year);
        let entries = self.load_entries(&prefix)?;
        let separate = self.config.land_registry_pool == LandRegistryPool::Separate;
        let stats = RegisterStats::from_entries(year, &entries, separate);

        if !self.stats_cache.put(stats.clone(), generation) && self.stats_cache.is_enabled() {
            tracing::debug!(year, "[register] stats raced a commit, not cached");
        }
        Ok(stats)
    }

    pub(crate) fn load_by_id(&self, id: EntryId) -> Result<RegisterEntry, RegisterError> {
        let office = self.config.office_id.as_str();
        let entry_key = self
            .store
            .get(&KeyPrefix::id_key(office, &id))?
            .ok_or_else(|| RegisterError::not_found(id))?;
        let data = self
            .store
            .get(&entry_key)?
            .ok_or_else(|| StorageError::Corruption {
                message: format!("id pointer {id} refers to a missing entry"),
            })?;
        Ok(self.serializer.deserialize_entry(&data)?)
    }

    pub(crate) fn load_by_number(
        &self,
        year: i32,
        pool: NumberingPool,
        yearly_seq: u64,
    ) -> Result<RegisterEntry, RegisterError> {
        let key = KeyPrefix::entry_key(&self.config.office_id, year, pool, yearly_seq);
        let data = self
            .store
            .get(&key)?
            .ok_or_else(|| RegisterError::NotFound {
                id: format!("{year}/{}/{yearly_seq}", pool.tag()),
            })?;
        Ok(self.serializer.deserialize_entry(&data)?)
    }

    fn load_entries(&self, prefix: &[u8]) -> Result<Vec<RegisterEntry>, RegisterError> {
        self.store
            .prefix_scan(prefix)?
            .into_iter()
            .map(|(_, value)| {
                self.serializer
                    .deserialize_entry(&value)
                    .map_err(RegisterError::from)
            })
            .collect()
    }
}
