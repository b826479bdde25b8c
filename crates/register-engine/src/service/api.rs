//! # Register API Implementation

use super::*;
use crate::domain::entities::{AdministrativePatch, IndexEntry, NewRegisterEntry, RegisterEntry};
use crate::domain::query::{IndexFilter, Page, RegisterFilter};
use crate::domain::stats::RegisterStats;
use crate::domain::value_objects::{ActorId, EntryId, NumberingPool};
use crate::ports::inbound::RegisterApi;

impl<ST, TS, IG, PJ, RS> RegisterApi for RegisterService<ST, TS, IG, PJ, RS>
where
    ST: TransactionalStore,
    TS: TimeSource,
    IG: IdGenerator,
    PJ: IndexProjector,
    RS: RecordSerializer,
{
    fn create_entry(&self, input: NewRegisterEntry) -> Result<RegisterEntry, RegisterError> {
        self.create(input)
    }

    fn query_entries(&self, filter: &RegisterFilter) -> Result<Page<RegisterEntry>, RegisterError> {
        self.find_entries(filter)
    }

    fn query_index(&self, filter: &IndexFilter) -> Result<Page<IndexEntry>, RegisterError> {
        self.find_index_rows(filter)
    }

    fn stats(&self, year: i32) -> Result<RegisterStats, RegisterError> {
        self.compute_stats(year)
    }

    fn get_entry(&self, id: EntryId) -> Result<RegisterEntry, RegisterError> {
        self.load_by_id(id)
    }

    fn get_entry_by_number(
        &self,
        year: i32,
        pool: NumberingPool,
        yearly_seq: u64,
    ) -> Result<RegisterEntry, RegisterError> {
        self.load_by_number(year, pool, yearly_seq)
    }

    fn amend_administrative_fields(
        &self,
        id: EntryId,
        patch: AdministrativePatch,
        actor: ActorId,
    ) -> Result<RegisterEntry, RegisterError> {
        self.amend(id, patch, actor)
    }
}
