//! # Counter Store
//!
//! One row per scope key holding the last assigned number as a big-endian
//! `u64`. A missing row means 0. Rows are only ever read-locked-written
//! inside the caller's transaction, so a rolled-back creation never moves a
//! counter.

use super::*;
use crate::domain::errors::StorageError;
use crate::domain::value_objects::{KeyPrefix, ScopeKey};
use crate::ports::outbound::StoreTransaction;

/// Lock the scope's counter row, advance it by one and return the new value.
///
/// Blocks while a concurrent transaction holds the same row; different
/// scopes never contend. The lock is held until `tx` commits or drops.
pub(crate) fn allocate_next<T: StoreTransaction>(
    tx: &mut T,
    office: &str,
    scope: &ScopeKey,
) -> Result<u64, RegisterError> {
    let key = KeyPrefix::counter_key(office, scope);
    let current = match tx.get_for_update(&key)? {
        Some(bytes) => decode_counter(scope, &bytes)?,
        None => 0,
    };
    let next = current.checked_add(1).ok_or_else(|| StorageError::Corruption {
        message: format!("counter {scope} overflowed"),
    })?;
    tx.put(&key, &next.to_be_bytes())?;
    Ok(next)
}

fn decode_counter(scope: &ScopeKey, bytes: &[u8]) -> Result<u64, StorageError> {
    <[u8; 8]>::try_from(bytes)
        .map(u64::from_be_bytes)
        .map_err(|_| StorageError::Corruption {
            message: format!("counter {scope} holds {} bytes, expected 8", bytes.len()),
        })
}

impl<ST, TS, IG, PJ, RS> RegisterService<ST, TS, IG, PJ, RS>
where
    ST: TransactionalStore,
    TS: TimeSource,
    IG: IdGenerator,
    PJ: IndexProjector,
    RS: RecordSerializer,
{
    /// Last committed number of a scope, 0 if nothing was allocated yet.
    pub fn counter_value(&self, scope: &ScopeKey) -> Result<u64, RegisterError> {
        let key = KeyPrefix::counter_key(&self.config.office_id, scope);
        match self.store.get(&key)? {
            Some(bytes) => Ok(decode_counter(scope, &bytes)?),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::NumberingPool;

    #[test]
    fn test_allocate_starts_at_one_and_is_rolled_back_on_drop() {
        let store = InMemoryStore::new();
        let scope = ScopeKey::yearly(NumberingPool::Notarial, 2025);

        {
            let mut tx = store.begin().unwrap();
            assert_eq!(allocate_next(&mut tx, "main", &scope).unwrap(), 1);
        }
        let mut tx = store.begin().unwrap();
        assert_eq!(allocate_next(&mut tx, "main", &scope).unwrap(), 1);
        tx.commit().unwrap();

        let mut tx = store.begin().unwrap();
        assert_eq!(allocate_next(&mut tx, "main", &scope).unwrap(), 2);
    }

    #[test]
    fn test_malformed_counter_is_corruption() {
        let store = InMemoryStore::new();
        let scope = ScopeKey::monthly(NumberingPool::Notarial, 2025, 3);
        let mut tx = store.begin().unwrap();
        tx.put(&KeyPrefix::counter_key("main", &scope), b"abc").unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin().unwrap();
        let err = allocate_next(&mut tx, "main", &scope).unwrap_err();
        assert!(matches!(
            err,
            RegisterError::Storage(StorageError::Corruption { .. })
        ));
    }

    #[test]
    fn test_overflow_is_reported() {
        let store = InMemoryStore::new();
        let scope = ScopeKey::yearly(NumberingPool::Notarial, 2025);
        let mut tx = store.begin().unwrap();
        tx.put(&KeyPrefix::counter_key("main", &scope), &u64::MAX.to_be_bytes())
            .unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin().unwrap();
        assert!(allocate_next(&mut tx, "main", &scope).is_err());
    }
}
