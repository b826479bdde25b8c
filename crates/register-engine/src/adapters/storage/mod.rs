//! Storage Adapters
//!
//! Implementations of the `TransactionalStore` trait.

mod memory;
#[cfg(feature = "rocksdb")]
mod rocksdb;

pub use memory::{InMemoryStore, InMemoryStoreConfig, InMemoryTransaction};
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::{RocksDbConfig, RocksDbStore, RocksDbTransaction};
