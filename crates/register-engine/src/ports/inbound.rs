//! # Inbound Ports (Driving Ports)
//!
//! The API the surrounding application (HTTP layer, export formatter,
//! document workflow) drives the register through.

use crate::domain::entities::{AdministrativePatch, IndexEntry, NewRegisterEntry, RegisterEntry};
use crate::domain::errors::RegisterError;
use crate::domain::query::{IndexFilter, Page, RegisterFilter};
use crate::domain::stats::RegisterStats;
use crate::domain::value_objects::{ActorId, EntryId, NumberingPool};

/// Primary API of the Register Engine.
///
/// Every method takes `&self`: one engine is shared by all request threads,
/// and serialization happens on counter rows inside the store.
pub trait RegisterApi: Send + Sync {
    /// Validate, number and persist a new entry together with its index rows.
    ///
    /// ## Atomicity
    ///
    /// Counter increments, the entry and every index row commit in one
    /// transaction. On any error nothing is persisted and no number is
    /// consumed.
    ///
    /// ## Errors
    ///
    /// - `Validation`: input rejected before any transaction was opened
    /// - `Contention`: retry budget exhausted on a counter row; resubmit
    /// - `Storage`: persistence or projection failure
    fn create_entry(&self, input: NewRegisterEntry) -> Result<RegisterEntry, RegisterError>;

    /// Filtered, sorted, paginated register entries.
    ///
    /// ## Errors
    ///
    /// - `Validation`: malformed filter (month outside 1-12, zero limit)
    fn query_entries(&self, filter: &RegisterFilter) -> Result<Page<RegisterEntry>, RegisterError>;

    /// Filtered, sorted, paginated name-index rows.
    fn query_index(&self, filter: &IndexFilter) -> Result<Page<IndexEntry>, RegisterError>;

    /// Aggregate of one year, possibly served from a short-lived cache.
    fn stats(&self, year: i32) -> Result<RegisterStats, RegisterError>;

    /// Point lookup by opaque id.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no entry with this id
    fn get_entry(&self, id: EntryId) -> Result<RegisterEntry, RegisterError>;

    /// Point lookup by legal identity `(year, pool, yearly_seq)`.
    fn get_entry_by_number(
        &self,
        year: i32,
        pool: NumberingPool,
        yearly_seq: u64,
    ) -> Result<RegisterEntry, RegisterError>;

    /// Correct `notes` or `linked_document_id` of an existing entry.
    ///
    /// Numbering fields, the execution date and index rows are never touched.
    ///
    /// ## Errors
    ///
    /// - `Validation`: empty patch or overlong notes
    /// - `NotFound`: no entry with this id
    fn amend_administrative_fields(
        &self,
        id: EntryId,
        patch: AdministrativePatch,
        actor: ActorId,
    ) -> Result<RegisterEntry, RegisterError>;
}
