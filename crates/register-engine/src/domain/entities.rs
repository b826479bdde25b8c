//! # Register Entities
//!
//! - `RegisterEntry` - one numbered ledger record per executed deed (repertorium)
//! - `IndexEntry` - one name-index row per appearer (klapper)
//! - `NewRegisterEntry` - creation input
//! - `AdministrativePatch` - the only post-creation correction
//!
//! Index rows duplicate `nature_of_deed`, `executed_at` and `yearly_seq` from
//! their parent for join-free name lookup. They are derived and can always be
//! recomputed from the register entry, which stays authoritative.

use crate::domain::value_objects::{ActorId, DocumentId, EntryId, IndexEntryId, NumberingPool};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The permanent, numbered ledger record of an executed deed.
///
/// `(year, pool, yearly_seq)` is the legal identity. No operation of the
/// engine ever rewrites `yearly_seq`, `monthly_seq` or `executed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterEntry {
    /// Opaque id generated at creation.
    pub id: EntryId,
    /// Year-scoped register number (nomor urut).
    pub yearly_seq: u64,
    /// Month-scoped register number (nomor bulanan).
    pub monthly_seq: u64,
    /// Counter pool both numbers were drawn from.
    pub pool: NumberingPool,
    /// Execution date of the deed; determines the numbering scope.
    pub executed_at: NaiveDate,
    /// Classification of the deed (sifat akta).
    pub nature_of_deed: String,
    /// Appearers, in submission order.
    pub appearer_names: Vec<String>,
    /// Administrative notes.
    pub notes: Option<String>,
    /// Land-registry (PPAT) deed flag.
    pub is_land_registry_act: bool,
    /// Link to a document record owned elsewhere; not validated.
    pub linked_document_id: Option<DocumentId>,
    /// Acting user at creation.
    pub created_by_actor_id: ActorId,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last administrative amendment.
    pub amended_at: Option<DateTime<Utc>>,
    /// Acting user of the last administrative amendment.
    pub amended_by_actor_id: Option<ActorId>,
}

impl RegisterEntry {
    /// Year of the numbering scope.
    pub fn year(&self) -> i32 {
        self.executed_at.year()
    }

    /// Month of the numbering scope (1-12).
    pub fn month(&self) -> u32 {
        self.executed_at.month()
    }

    /// `(year, pool, yearly_seq)`.
    pub fn legal_identity(&self) -> (i32, NumberingPool, u64) {
        (self.year(), self.pool, self.yearly_seq)
    }
}

/// Name-index row derived from a register entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// `(entry id, position)`.
    pub id: IndexEntryId,
    /// Owning register entry.
    pub register_entry_id: EntryId,
    /// Trimmed appearer name.
    pub appearer_name: String,
    /// Upper-cased first letter of the name, `#` when there is none.
    pub first_letter: char,
    /// Copied from the parent.
    pub nature_of_deed: String,
    /// Copied from the parent.
    pub executed_at: NaiveDate,
    /// Copied from the parent.
    pub yearly_seq: u64,
    /// Copied from the parent.
    pub pool: NumberingPool,
}

impl IndexEntry {
    /// Year of the parent's numbering scope.
    pub fn year(&self) -> i32 {
        self.executed_at.year()
    }

    /// Month of the parent's numbering scope.
    pub fn month(&self) -> u32 {
        self.executed_at.month()
    }
}

/// Input of `create_entry`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRegisterEntry {
    /// Execution date (required).
    pub executed_at: Option<NaiveDate>,
    /// Classification (required, non-empty).
    pub nature_of_deed: String,
    /// At least one non-empty name.
    pub appearer_names: Vec<String>,
    /// Optional notes.
    pub notes: Option<String>,
    /// PPAT flag, default `false`.
    pub is_land_registry_act: bool,
    /// Optional document link.
    pub linked_document_id: Option<DocumentId>,
    /// Acting user (required).
    pub created_by_actor_id: Option<ActorId>,
}

impl NewRegisterEntry {
    /// Input carrying every required field.
    pub fn new<I, S>(
        executed_at: NaiveDate,
        nature_of_deed: impl Into<String>,
        appearer_names: I,
        created_by: ActorId,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            executed_at: Some(executed_at),
            nature_of_deed: nature_of_deed.into(),
            appearer_names: appearer_names.into_iter().map(Into::into).collect(),
            created_by_actor_id: Some(created_by),
            ..Default::default()
        }
    }

    /// Attach notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Mark as a land-registry (PPAT) deed.
    pub fn land_registry_act(mut self) -> Self {
        self.is_land_registry_act = true;
        self
    }

    /// Link to an external document record.
    pub fn with_linked_document(mut self, document: DocumentId) -> Self {
        self.linked_document_id = Some(document);
        self
    }
}

/// Correction of administrative fields.
///
/// The outer `Option` means "leave unchanged"; `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdministrativePatch {
    /// New notes.
    pub notes: Option<Option<String>>,
    /// New document link.
    pub linked_document_id: Option<Option<DocumentId>>,
}

impl AdministrativePatch {
    /// Replace the notes.
    pub fn set_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(Some(notes.into()));
        self
    }

    /// Remove the notes.
    pub fn clear_notes(mut self) -> Self {
        self.notes = Some(None);
        self
    }

    /// Replace the document link.
    pub fn link_document(mut self, document: DocumentId) -> Self {
        self.linked_document_id = Some(Some(document));
        self
    }

    /// Remove the document link.
    pub fn unlink_document(mut self) -> Self {
        self.linked_document_id = Some(None);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.notes.is_none() && self.linked_document_id.is_none()
    }

    /// Apply to an entry. Numbering fields are not reachable from here.
    pub fn apply(&self, entry: &mut RegisterEntry, actor: ActorId, now: DateTime<Utc>) {
        if let Some(notes) = &self.notes {
            entry.notes = notes.clone();
        }
        if let Some(document) = &self.linked_document_id {
            entry.linked_document_id = document.clone();
        }
        entry.amended_at = Some(now);
        entry.amended_by_actor_id = Some(actor);
    }
}
