//! # Adapters Module
//!
//! Implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `storage`: in-memory and RocksDB transactional stores
//! - `serializer`: bincode record codec
//! - `infra`: clocks and id generators
//! - `projector`: name-index projection
//! - `lock`: data directory locking (feature `locking`)

pub mod infra;
#[cfg(feature = "locking")]
pub mod lock;
pub mod projector;
pub mod serializer;
pub mod storage;

pub use infra::{FixedClock, SequentialIdGenerator, SystemClock, UuidGenerator};
#[cfg(feature = "locking")]
pub use lock::{DatabaseLock, LockError};
pub use projector::NameIndexProjector;
pub use serializer::BincodeSerializer;
pub use storage::{InMemoryStore, InMemoryStoreConfig};
#[cfg(feature = "rocksdb")]
pub use storage::{RocksDbConfig, RocksDbStore};
