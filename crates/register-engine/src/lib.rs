//! # Register Engine
//!
//! Numbering and cross-indexing core of a notary office's deed register
//! (repertorium) and its alphabetical name index (klapper).
//!
//! Every executed deed gets a year-scoped number (`yearly_seq`) and a
//! month-scoped number (`monthly_seq`), both derived from the deed's
//! execution date. Numbers are gapless, unique and never change.
//!
//! ## Write Path
//!
//! ```text
//! create_entry(input)
//!   └─ validate ───────────────── reject: nothing consumed
//!   └─ BEGIN
//!        lock counter yearly/{pool}/{year}        (row lock, +1)
//!        lock counter monthly/{pool}/{year}-{mm}  (row lock, +1)
//!        build RegisterEntry, project IndexEntry rows
//!        put entry, id pointer, index rows
//!      COMMIT ─────────────────── any failure rolls back both counters
//!   └─ transient conflict → retry with backoff, bounded
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Gapless | Committed numbers of a scope are exactly `1..=N` |
//! | Unique | No two committed entries share `(year, pool, yearly_seq)` |
//! | Immutable numbering | Numbers and execution date never change after commit |
//! | Atomic projection | An entry and its index rows commit together or not at all |
//! | Scope independence | Counters of different years never contend |
//! | Committed reads | Queries never see in-flight allocations |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure domain logic (entities, scopes, validation, queries, stats)
//! - `ports/` - Port traits (inbound API, outbound store/clock/ids/codec/projector)
//! - `adapters/` - In-memory and RocksDB stores, codec, clocks, projector, lock
//! - `service/` - Application service implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use register_engine::{EngineConfig, InMemoryRegisterService, NewRegisterEntry, RegisterApi};
//!
//! let register = InMemoryRegisterService::in_memory(EngineConfig::from_env())?;
//! let entry = register.create_entry(NewRegisterEntry::new(
//!     executed_at,
//!     "Deed of Sale",
//!     ["Siti Rahma", "Budi Santoso"],
//!     ActorId::new("staff-7"),
//! ))?;
//! println!("No. {}/{}", entry.yearly_seq, entry.year());
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use domain::config::{EngineConfig, LandRegistryPool, RetryPolicy};
pub use domain::entities::{AdministrativePatch, IndexEntry, NewRegisterEntry, RegisterEntry};
pub use domain::errors::{
    KVStoreError, ProjectionError, RegisterError, SerializationError, StorageError,
    ValidationError,
};
pub use domain::query::{
    IndexFilter, IndexSortKey, Page, RegisterFilter, SortDirection, SortKey, DEFAULT_PAGE_SIZE,
};
pub use domain::stats::RegisterStats;
pub use domain::validation::parse_executed_at;
pub use domain::value_objects::{
    ActorId, DocumentId, EntryId, IndexEntryId, KeyPrefix, NumberingPool, ScopeKey, ScopeKind,
    ScopePair,
};
pub use ports::inbound::RegisterApi;
pub use ports::outbound::{
    IdGenerator, IndexProjector, RecordSerializer, ScanResult, StoreTransaction, TimeSource,
    TransactionalStore,
};
pub use service::{InMemoryRegisterService, RegisterDependencies, RegisterService};

#[cfg(feature = "rocksdb")]
pub use service::RocksDbRegisterService;
