use crate::domain::value_objects::EntryId;
use crate::ports::outbound::IdGenerator;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Random (v4) UUIDs.
#[derive(Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> EntryId {
        EntryId::from_uuid(Uuid::new_v4())
    }
}

/// Predictable ids `1, 2, 3, ...` encoded as UUIDs, for tests.
#[derive(Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Generator whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> EntryId {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        EntryId::from_uuid(Uuid::from_u128(u128::from(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(*ids.next_id().as_uuid(), Uuid::from_u128(1));
        assert_eq!(*ids.next_id().as_uuid(), Uuid::from_u128(2));
    }

    #[test]
    fn test_uuid_ids_are_distinct() {
        let ids = UuidGenerator;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
