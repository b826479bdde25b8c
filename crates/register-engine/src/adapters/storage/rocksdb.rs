//! # RocksDB Storage Adapter
//!
//! Durable `TransactionalStore` backed by a RocksDB `TransactionDB`.
//!
//! - Pessimistic transactions: `get_for_update` takes an exclusive row lock
//! - Lock wait timeout, busy and expired transactions surface as `Conflict`
//! - Snappy compression, bloom filters, optional fsync on commit
//! - Exclusive data-directory lock so two processes never share one database

use crate::adapters::lock::DatabaseLock;
use crate::domain::errors::{KVStoreError, StorageError};
use crate::ports::outbound::{ScanResult, StoreTransaction, TransactionalStore};
use rocksdb::{
    Direction, ErrorKind, IteratorMode, Options, Transaction, TransactionDB,
    TransactionDBOptions, TransactionOptions, WriteOptions,
};
use std::path::PathBuf;
use std::time::Duration;

/// RocksDB configuration.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory.
    pub path: PathBuf,
    /// Row lock wait before a transaction reports a conflict.
    pub lock_timeout: Duration,
    /// Block cache size in bytes (default: 64MB).
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB).
    pub write_buffer_size: usize,
    /// fsync the WAL on every commit (default: true).
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/register"),
            lock_timeout: Duration::from_millis(1_000),
            block_cache_size: 64 * 1024 * 1024,
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Small buffers and no fsync.
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: Duration::from_millis(200),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed transactional store.
pub struct RocksDbStore {
    db: TransactionDB,
    config: RocksDbConfig,
    _lock: DatabaseLock,
}

impl RocksDbStore {
    /// Open or create the database, holding the data-directory lock until drop.
    ///
    /// ## Errors
    ///
    /// - `Locked`: another process holds the data directory
    /// - `Database`: the directory or database could not be opened
    pub fn open(config: RocksDbConfig) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&config.path).map_err(|e| StorageError::Database {
            message: format!("Failed to create {}: {}", config.path.display(), e),
        })?;
        let lock = DatabaseLock::acquire(&config.path).map_err(|e| StorageError::Locked {
            message: e.to_string(),
        })?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let mut txn_db_opts = TransactionDBOptions::default();
        txn_db_opts.set_txn_lock_timeout(config.lock_timeout.as_millis() as i64);

        let db = TransactionDB::open(&opts, &txn_db_opts, &config.path).map_err(|e| {
            StorageError::Database {
                message: format!("Failed to open RocksDB: {}", e),
            }
        })?;

        tracing::info!(
            path = %config.path.display(),
            lock_timeout_ms = config.lock_timeout.as_millis() as u64,
            "[register] opened RocksDB store"
        );

        Ok(Self {
            db,
            config,
            _lock: lock,
        })
    }

    /// Configuration the store was opened with.
    pub fn config(&self) -> &RocksDbConfig {
        &self.config
    }
}

fn map_error(e: rocksdb::Error) -> KVStoreError {
    match e.kind() {
        ErrorKind::Busy | ErrorKind::TimedOut | ErrorKind::TryAgain | ErrorKind::Expired => {
            KVStoreError::Conflict {
                message: e.to_string(),
            }
        }
        ErrorKind::Corruption => KVStoreError::CorruptionError {
            message: e.to_string(),
        },
        _ => KVStoreError::IOError {
            message: e.to_string(),
        },
    }
}

impl TransactionalStore for RocksDbStore {
    type Transaction<'a> = RocksDbTransaction<'a>;

    fn begin(&self) -> Result<Self::Transaction<'_>, KVStoreError> {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        let txn = self
            .db
            .transaction_opt(&write_opts, &TransactionOptions::default());
        Ok(RocksDbTransaction { txn })
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.db.get(key).map_err(map_error)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        let mut results = Vec::new();
        for item in self
            .db
            .iterator(IteratorMode::From(prefix, Direction::Forward))
        {
            let (key, value) = item.map_err(map_error)?;
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }
        Ok(results)
    }
}

/// Pessimistic RocksDB transaction; dropping it rolls back.
pub struct RocksDbTransaction<'a> {
    txn: Transaction<'a, TransactionDB>,
}

impl StoreTransaction for RocksDbTransaction<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.txn.get(key).map_err(map_error)
    }

    fn get_for_update(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.txn.get_for_update(key, true).map_err(map_error)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.txn.put(key, value).map_err(map_error)
    }

    fn commit(self) -> Result<(), KVStoreError> {
        self.txn.commit().map_err(map_error)
    }
}
