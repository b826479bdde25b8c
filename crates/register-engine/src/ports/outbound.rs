//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the register service.
//!
//! Production: `RocksDbStore` (feature `rocksdb`).
//! Testing: `InMemoryStore`, `FixedClock`, `SequentialIdGenerator`.

use crate::domain::entities::{IndexEntry, RegisterEntry};
use crate::domain::errors::{KVStoreError, ProjectionError, SerializationError};
use crate::domain::value_objects::EntryId;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Result of a prefix scan, in ascending key order.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// One read-write transaction.
///
/// Dropping a transaction without calling [`StoreTransaction::commit`]
/// rolls it back and releases every row lock it holds.
pub trait StoreTransaction {
    /// Read a key, seeing this transaction's own writes.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Read a key and take an exclusive row lock on it until commit or
    /// rollback, even when the key does not exist yet.
    ///
    /// ## Errors
    ///
    /// - `Conflict`: the lock could not be acquired within the store's lock timeout
    fn get_for_update(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Buffer a write; invisible to other readers until commit.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Apply all buffered writes atomically.
    ///
    /// ## Atomicity
    ///
    /// Either every write of the transaction becomes visible, or none does.
    fn commit(self) -> Result<(), KVStoreError>;
}

/// Key-value store with row-locking transactions.
///
/// Reads outside a transaction only ever see committed data.
pub trait TransactionalStore: Send + Sync {
    /// Transaction handle borrowing the store.
    type Transaction<'a>: StoreTransaction
    where
        Self: 'a;

    /// Open a transaction.
    fn begin(&self) -> Result<Self::Transaction<'_>, KVStoreError>;

    /// Committed value of a key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Committed key-value pairs under a prefix, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;
}

/// A shared store; lets several engine instances (e.g. one per office)
/// work on the same database.
impl<S: TransactionalStore> TransactionalStore for Arc<S> {
    type Transaction<'a>
        = S::Transaction<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<Self::Transaction<'_>, KVStoreError> {
        S::begin(self)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        S::get(self, key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        S::prefix_scan(self, prefix)
    }
}

/// Clock used for `created_at` and `amended_at` (for testability).
pub trait TimeSource: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Generator of opaque register entry ids.
pub trait IdGenerator: Send + Sync {
    /// A fresh, never reused id.
    fn next_id(&self) -> EntryId;
}

/// Codec for persisted records.
pub trait RecordSerializer: Send + Sync {
    /// Encode a register entry.
    fn serialize_entry(&self, entry: &RegisterEntry) -> Result<Vec<u8>, SerializationError>;

    /// Decode a register entry.
    fn deserialize_entry(&self, data: &[u8]) -> Result<RegisterEntry, SerializationError>;

    /// Encode an index row.
    fn serialize_index(&self, row: &IndexEntry) -> Result<Vec<u8>, SerializationError>;

    /// Decode an index row.
    fn deserialize_index(&self, data: &[u8]) -> Result<IndexEntry, SerializationError>;
}

/// Derives name-index rows from a register entry.
///
/// Runs inside the writer's transaction: an error aborts the whole
/// creation, counters included.
pub trait IndexProjector: Send + Sync {
    /// Index rows for an entry whose numbers are already assigned.
    fn project(&self, entry: &RegisterEntry) -> Result<Vec<IndexEntry>, ProjectionError>;
}
