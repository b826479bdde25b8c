//! # Register Service
//!
//! The main service implementing the Register API.
//!
//! ## Architecture
//!
//! This service:
//! 1. Validates input before any transaction is opened
//! 2. Allocates yearly and monthly numbers under row locks (`counter.rs`)
//! 3. Persists the entry and its index rows in the same transaction (`writer.rs`)
//! 4. Serves committed-only queries and stats (`reader.rs`)
//! 5. Applies administrative corrections (`admin.rs`)
//!
//! All external dependencies are injected, so tests can swap the store,
//! clock, id generator and projector.

mod admin;
mod api;
mod counter;
mod reader;
mod writer;

use crate::adapters::{
    BincodeSerializer, InMemoryStore, InMemoryStoreConfig, NameIndexProjector, SystemClock,
    UuidGenerator,
};
use crate::domain::config::EngineConfig;
use crate::domain::errors::RegisterError;
use crate::domain::stats::StatsCache;
use crate::ports::outbound::{
    IdGenerator, IndexProjector, RecordSerializer, TimeSource, TransactionalStore,
};

/// The Register Service.
///
/// Shared by reference across request threads; every operation takes `&self`.
pub struct RegisterService<ST, TS, IG, PJ, RS>
where
    ST: TransactionalStore,
    TS: TimeSource,
    IG: IdGenerator,
    PJ: IndexProjector,
    RS: RecordSerializer,
{
    /// Transactional store holding counters, entries and index rows.
    pub(crate) store: ST,
    /// Clock for `created_at` / `amended_at`.
    pub(crate) time_source: TS,
    /// Entry id generator.
    pub(crate) id_generator: IG,
    /// Index projector run inside the creation transaction.
    pub(crate) projector: PJ,
    /// Record codec.
    pub(crate) serializer: RS,
    /// Service configuration.
    pub(crate) config: EngineConfig,
    /// Advisory cache for `stats(year)`.
    pub(crate) stats_cache: StatsCache,
}

/// Dependencies for RegisterService
pub struct RegisterDependencies<ST, TS, IG, PJ, RS> {
    pub store: ST,
    pub time_source: TS,
    pub id_generator: IG,
    pub projector: PJ,
    pub serializer: RS,
}

impl<ST, TS, IG, PJ, RS> RegisterService<ST, TS, IG, PJ, RS>
where
    ST: TransactionalStore,
    TS: TimeSource,
    IG: IdGenerator,
    PJ: IndexProjector,
    RS: RecordSerializer,
{
    /// Create a service with the given dependencies.
    ///
    /// ## Errors
    ///
    /// - `Config`: the configuration fails [`EngineConfig::validate`]
    pub fn new(
        deps: RegisterDependencies<ST, TS, IG, PJ, RS>,
        config: EngineConfig,
    ) -> Result<Self, RegisterError> {
        config.validate().map_err(RegisterError::Config)?;

        tracing::info!(
            office = %config.office_id,
            land_registry_pool = ?config.land_registry_pool,
            max_attempts = config.retry.max_attempts,
            "[register] service initialized"
        );

        Ok(Self {
            store: deps.store,
            time_source: deps.time_source,
            id_generator: deps.id_generator,
            projector: deps.projector,
            serializer: deps.serializer,
            stats_cache: StatsCache::new(config.stats_cache_ttl, config.stats_cache_capacity),
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &ST {
        &self.store
    }
}

/// Service over the in-memory store with production clock, ids and projector.
pub type InMemoryRegisterService = RegisterService<
    InMemoryStore,
    SystemClock,
    UuidGenerator,
    NameIndexProjector,
    BincodeSerializer,
>;

impl InMemoryRegisterService {
    /// Fresh in-memory register.
    pub fn in_memory(config: EngineConfig) -> Result<Self, RegisterError> {
        Self::in_memory_with_store(config, InMemoryStoreConfig::default())
    }

    /// Fresh in-memory register with a custom lock timeout.
    pub fn in_memory_with_store(
        config: EngineConfig,
        store_config: InMemoryStoreConfig,
    ) -> Result<Self, RegisterError> {
        let deps = RegisterDependencies {
            store: InMemoryStore::with_config(store_config),
            time_source: SystemClock,
            id_generator: UuidGenerator,
            projector: NameIndexProjector,
            serializer: BincodeSerializer,
        };
        Self::new(deps, config)
    }
}

/// Service over the durable RocksDB store.
#[cfg(feature = "rocksdb")]
pub type RocksDbRegisterService = RegisterService<
    crate::adapters::RocksDbStore,
    SystemClock,
    UuidGenerator,
    NameIndexProjector,
    BincodeSerializer,
>;

#[cfg(feature = "rocksdb")]
impl RocksDbRegisterService {
    /// Open (or create) a durable register.
    ///
    /// ## Errors
    ///
    /// - `Storage(Locked)`: another process holds the data directory
    pub fn open(
        store_config: crate::adapters::RocksDbConfig,
        config: EngineConfig,
    ) -> Result<Self, RegisterError> {
        let deps = RegisterDependencies {
            store: crate::adapters::RocksDbStore::open(store_config)?,
            time_source: SystemClock,
            id_generator: UuidGenerator,
            projector: NameIndexProjector,
            serializer: BincodeSerializer,
        };
        Self::new(deps, config)
    }
}
