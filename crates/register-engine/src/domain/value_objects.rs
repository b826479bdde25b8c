//! # Value Objects
//!
//! Identifiers, numbering scopes and the persisted key layout.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of a register entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an index row: the owning entry plus the appearer position.
///
/// Derived, never allocated, so projection stays a pure function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexEntryId {
    /// Owning register entry.
    pub entry: EntryId,
    /// Zero-based position of the name in `appearer_names`.
    pub position: u16,
}

impl fmt::Display for IndexEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entry, self.position)
    }
}

macro_rules! opaque_string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wrap a caller-supplied reference.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_string_id!(
    /// Opaque reference to the acting user, kept for audit attribution only.
    ActorId
);

opaque_string_id!(
    /// Opaque reference to a document record owned by the workflow module.
    DocumentId
);

/// Counter pool an entry draws its numbers from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NumberingPool {
    /// The notarial repertorium.
    Notarial,
    /// Land-registry (PPAT) deeds kept on their own counters.
    LandRegistry,
}

impl NumberingPool {
    /// Single-letter tag used in keys and scope names.
    pub fn tag(&self) -> &'static str {
        match self {
            NumberingPool::Notarial => "N",
            NumberingPool::LandRegistry => "P",
        }
    }
}

/// Whether a counter is year- or month-scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// One counter per (pool, year).
    Yearly,
    /// One counter per (pool, year, month).
    Monthly,
}

/// Identifies exactly one counter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    /// Yearly or monthly.
    pub kind: ScopeKind,
    /// Counter pool.
    pub pool: NumberingPool,
    /// Calendar year of the deed's execution date.
    pub year: i32,
    /// Calendar month (1-12), monthly scopes only.
    pub month: Option<u32>,
}

impl ScopeKey {
    /// Year-scoped counter.
    pub fn yearly(pool: NumberingPool, year: i32) -> Self {
        Self {
            kind: ScopeKind::Yearly,
            pool,
            year,
            month: None,
        }
    }

    /// Month-scoped counter.
    pub fn monthly(pool: NumberingPool, year: i32, month: u32) -> Self {
        Self {
            kind: ScopeKind::Monthly,
            pool,
            year,
            month: Some(month),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.month) {
            (ScopeKind::Monthly, Some(month)) => write!(
                f,
                "monthly/{}/{:04}-{:02}",
                self.pool.tag(),
                self.year,
                month
            ),
            _ => write!(f, "yearly/{}/{:04}", self.pool.tag(), self.year),
        }
    }
}

/// The two counters one creation allocates from, always locked yearly first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopePair {
    /// Year-scoped counter.
    pub yearly: ScopeKey,
    /// Month-scoped counter.
    pub monthly: ScopeKey,
}

/// Key prefixes for the key-value store.
///
/// All keys are namespaced by office. Integers are zero padded so that
/// lexicographic key order equals numeric order.
#[derive(Debug, Clone, Copy)]
pub enum KeyPrefix {
    /// Counter rows: `c:{office}:y:{pool}:{year}` / `c:{office}:m:{pool}:{year}:{month}`
    Counter,
    /// Register entries: `e:{office}:{year}:{pool}:{yearly_seq}`
    Entry,
    /// Id pointers: `i:{office}:{uuid}` -> entry key
    EntryId,
    /// Index rows: `x:{office}:{year}:{pool}:{yearly_seq}:{position}`
    Index,
}

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Counter => b"c:",
            KeyPrefix::Entry => b"e:",
            KeyPrefix::EntryId => b"i:",
            KeyPrefix::Index => b"x:",
        }
    }

    /// Build a full key with the given suffix.
    pub fn key(&self, suffix: &str) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix.as_bytes());
        key
    }

    /// Counter row for a scope.
    pub fn counter_key(office: &str, scope: &ScopeKey) -> Vec<u8> {
        let suffix = match (scope.kind, scope.month) {
            (ScopeKind::Monthly, Some(month)) => format!(
                "{office}:m:{}:{:04}:{:02}",
                scope.pool.tag(),
                scope.year,
                month
            ),
            _ => format!("{office}:y:{}:{:04}", scope.pool.tag(), scope.year),
        };
        KeyPrefix::Counter.key(&suffix)
    }

    /// Primary key of a register entry.
    pub fn entry_key(office: &str, year: i32, pool: NumberingPool, yearly_seq: u64) -> Vec<u8> {
        KeyPrefix::Entry.key(&format!(
            "{office}:{year:04}:{}:{yearly_seq:020}",
            pool.tag()
        ))
    }

    /// All entries of an office.
    pub fn entry_office_prefix(office: &str) -> Vec<u8> {
        KeyPrefix::Entry.key(&format!("{office}:"))
    }

    /// All entries of one year.
    pub fn entry_year_prefix(office: &str, year: i32) -> Vec<u8> {
        KeyPrefix::Entry.key(&format!("{office}:{year:04}:"))
    }

    /// Id pointer for an entry.
    pub fn id_key(office: &str, id: &EntryId) -> Vec<u8> {
        KeyPrefix::EntryId.key(&format!("{office}:{id}"))
    }

    /// Index row key.
    pub fn index_key(
        office: &str,
        year: i32,
        pool: NumberingPool,
        yearly_seq: u64,
        position: u16,
    ) -> Vec<u8> {
        KeyPrefix::Index.key(&format!(
            "{office}:{year:04}:{}:{yearly_seq:020}:{position:04}",
            pool.tag()
        ))
    }

    /// All index rows of an office.
    pub fn index_office_prefix(office: &str) -> Vec<u8> {
        KeyPrefix::Index.key(&format!("{office}:"))
    }

    /// All index rows of one year.
    pub fn index_year_prefix(office: &str, year: i32) -> Vec<u8> {
        KeyPrefix::Index.key(&format!("{office}:{year:04}:"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        assert_eq!(
            ScopeKey::yearly(NumberingPool::Notarial, 2025).to_string(),
            "yearly/N/2025"
        );
        assert_eq!(
            ScopeKey::monthly(NumberingPool::LandRegistry, 2025, 3).to_string(),
            "monthly/P/2025-03"
        );
    }

    #[test]
    fn test_counter_keys_are_distinct_per_scope() {
        let yearly = KeyPrefix::counter_key("main", &ScopeKey::yearly(NumberingPool::Notarial, 2025));
        let monthly =
            KeyPrefix::counter_key("main", &ScopeKey::monthly(NumberingPool::Notarial, 2025, 3));
        let other_year =
            KeyPrefix::counter_key("main", &ScopeKey::yearly(NumberingPool::Notarial, 2024));
        let other_office =
            KeyPrefix::counter_key("branch", &ScopeKey::yearly(NumberingPool::Notarial, 2025));

        assert_ne!(yearly, monthly);
        assert_ne!(yearly, other_year);
        assert_ne!(yearly, other_office);
    }

    #[test]
    fn test_entry_keys_sort_numerically() {
        let k9 = KeyPrefix::entry_key("main", 2025, NumberingPool::Notarial, 9);
        let k10 = KeyPrefix::entry_key("main", 2025, NumberingPool::Notarial, 10);
        assert!(k9 < k10);
        assert!(k10.starts_with(&KeyPrefix::entry_year_prefix("main", 2025)));
        assert!(k10.starts_with(&KeyPrefix::entry_office_prefix("main")));
    }

    #[test]
    fn test_index_id_display() {
        let entry = EntryId::from_uuid(Uuid::nil());
        let id = IndexEntryId { entry, position: 1 };
        assert!(id.to_string().ends_with("#1"));
    }
}
