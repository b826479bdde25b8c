//! # Index Projection
//!
//! Derives klapper rows from a register entry. Pure: the output depends only
//! on the entry, including its already-allocated `yearly_seq`.

use crate::domain::entities::{IndexEntry, RegisterEntry};
use crate::domain::errors::ProjectionError;
use crate::domain::value_objects::IndexEntryId;

/// First-letter bucket for names without any letter.
pub const NO_LETTER: char = '#';

/// Upper-cased first Unicode letter of the trimmed name, skipping any
/// leading non-letters.
pub fn first_letter(name: &str) -> char {
    name.trim()
        .chars()
        .find(|c| c.is_alphabetic())
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or(NO_LETTER)
}

/// One index row per appearer name, in submission order.
pub fn project_entry(entry: &RegisterEntry) -> Result<Vec<IndexEntry>, ProjectionError> {
    if entry.appearer_names.is_empty() {
        return Err(ProjectionError::NoAppearers);
    }

    entry
        .appearer_names
        .iter()
        .enumerate()
        .map(|(position, name)| {
            let position = u16::try_from(position).map_err(|_| {
                ProjectionError::Rejected(format!("too many appearers ({position})"))
            })?;
            let name = name.trim();
            Ok(IndexEntry {
                id: IndexEntryId {
                    entry: entry.id,
                    position,
                },
                register_entry_id: entry.id,
                appearer_name: name.to_string(),
                first_letter: first_letter(name),
                nature_of_deed: entry.nature_of_deed.clone(),
                executed_at: entry.executed_at,
                yearly_seq: entry.yearly_seq,
                pool: entry.pool,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ActorId, EntryId, NumberingPool};
    use chrono::{DateTime, NaiveDate, Utc};
    use uuid::Uuid;

    fn entry_with(names: &[&str]) -> RegisterEntry {
        RegisterEntry {
            id: EntryId::from_uuid(Uuid::from_u128(42)),
            yearly_seq: 17,
            monthly_seq: 4,
            pool: NumberingPool::Notarial,
            executed_at: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            nature_of_deed: "Power of Attorney".to_string(),
            appearer_names: names.iter().map(|n| n.to_string()).collect(),
            notes: None,
            is_land_registry_act: false,
            linked_document_id: None,
            created_by_actor_id: ActorId::new("staff-1"),
            created_at: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
            amended_at: None,
            amended_by_actor_id: None,
        }
    }

    #[test]
    fn test_first_letter() {
        assert_eq!(first_letter("budi"), 'B');
        assert_eq!(first_letter("  ani"), 'A');
        assert_eq!(first_letter("'s-Gravesande"), 'S');
        assert_eq!(first_letter("3M Indonesia"), 'M');
        assert_eq!(first_letter("élodie"), 'É');
        assert_eq!(first_letter("123"), NO_LETTER);
        assert_eq!(first_letter(""), NO_LETTER);
    }

    #[test]
    fn test_one_row_per_name_with_parent_copies() {
        let entry = entry_with(&["Siti", " dewi "]);
        let rows = project_entry(&entry).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].appearer_name, "dewi");
        assert_eq!(rows[1].first_letter, 'D');
        assert_eq!(rows[1].id.position, 1);
        for row in &rows {
            assert_eq!(row.register_entry_id, entry.id);
            assert_eq!(row.yearly_seq, 17);
            assert_eq!(row.nature_of_deed, entry.nature_of_deed);
            assert_eq!(row.executed_at, entry.executed_at);
        }
    }

    #[test]
    fn test_projection_is_deterministic() {
        let entry = entry_with(&["Siti", "Budi"]);
        assert_eq!(project_entry(&entry), project_entry(&entry));
    }

    #[test]
    fn test_no_names_is_rejected() {
        let entry = entry_with(&[]);
        assert_eq!(project_entry(&entry), Err(ProjectionError::NoAppearers));
    }
}
