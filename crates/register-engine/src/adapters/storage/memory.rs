use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{ScanResult, StoreTransaction, TransactionalStore};
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Configuration for [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryStoreConfig {
    /// How long `get_for_update` waits for a row lock before reporting a conflict.
    pub lock_timeout: Duration,
}

impl Default for InMemoryStoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_millis(1_000),
        }
    }
}

/// In-memory transactional store for tests and embedded use.
///
/// Row locks are exclusive and held until commit or rollback. Committed
/// data lives in an ordered map so prefix scans return keys in order.
pub struct InMemoryStore {
    config: InMemoryStoreConfig,
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    row_locks: Mutex<HashSet<Vec<u8>>>,
    released: Condvar,
    unavailable: AtomicBool,
    injected_conflicts: AtomicU32,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_config(InMemoryStoreConfig::default())
    }
}

impl InMemoryStore {
    /// Empty store with default lock timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store with the given configuration.
    pub fn with_config(config: InMemoryStoreConfig) -> Self {
        Self {
            config,
            data: RwLock::new(BTreeMap::new()),
            row_locks: Mutex::new(HashSet::new()),
            released: Condvar::new(),
            unavailable: AtomicBool::new(false),
            injected_conflicts: AtomicU32::new(0),
        }
    }

    /// Simulate a database outage: every operation fails with an I/O error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make the next `count` commits fail with a transient conflict.
    pub fn inject_commit_conflicts(&self, count: u32) {
        self.injected_conflicts.store(count, Ordering::SeqCst);
    }

    /// Number of committed keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether nothing was ever committed.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn check_available(&self) -> Result<(), KVStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(KVStoreError::IOError {
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn take_injected_conflict(&self) -> bool {
        self.injected_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn lock_row(&self, key: &[u8]) -> Result<(), KVStoreError> {
        let deadline = Instant::now() + self.config.lock_timeout;
        let mut held = self.row_locks.lock();
        while held.contains(key) {
            if self.released.wait_until(&mut held, deadline).timed_out() && held.contains(key) {
                return Err(KVStoreError::Conflict {
                    message: format!(
                        "lock wait timeout after {:?} on {}",
                        self.config.lock_timeout,
                        String::from_utf8_lossy(key)
                    ),
                });
            }
        }
        held.insert(key.to_vec());
        Ok(())
    }

    fn unlock_rows(&self, keys: &[Vec<u8>]) {
        if keys.is_empty() {
            return;
        }
        let mut held = self.row_locks.lock();
        for key in keys {
            held.remove(key);
        }
        self.released.notify_all();
    }
}

impl TransactionalStore for InMemoryStore {
    type Transaction<'a> = InMemoryTransaction<'a>;

    fn begin(&self) -> Result<Self::Transaction<'_>, KVStoreError> {
        self.check_available()?;
        Ok(InMemoryTransaction {
            store: self,
            writes: BTreeMap::new(),
            locked: Vec::new(),
        })
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.check_available()?;
        Ok(self.data.read().get(key).cloned())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        self.check_available()?;
        let data = self.data.read();
        Ok(data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// Transaction over an [`InMemoryStore`]; writes are buffered until commit.
pub struct InMemoryTransaction<'a> {
    store: &'a InMemoryStore,
    writes: BTreeMap<Vec<u8>, Vec<u8>>,
    locked: Vec<Vec<u8>>,
}

impl StoreTransaction for InMemoryTransaction<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        if let Some(value) = self.writes.get(key) {
            return Ok(Some(value.clone()));
        }
        self.store.get(key)
    }

    fn get_for_update(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.store.check_available()?;
        if !self.locked.iter().any(|k| k.as_slice() == key) {
            self.store.lock_row(key)?;
            self.locked.push(key.to_vec());
        }
        self.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.writes.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn commit(mut self) -> Result<(), KVStoreError> {
        self.store.check_available()?;
        if self.store.take_injected_conflict() {
            return Err(KVStoreError::Conflict {
                message: "injected commit conflict".to_string(),
            });
        }
        let writes = std::mem::take(&mut self.writes);
        self.store.data.write().extend(writes);
        Ok(())
    }
}

impl Drop for InMemoryTransaction<'_> {
    fn drop(&mut self) {
        self.store.unlock_rows(&self.locked);
    }
}
