//! # Input Validation
//!
//! Runs before any transaction is opened, so a rejected request never
//! touches a counter.

use crate::domain::entities::{AdministrativePatch, NewRegisterEntry};
use crate::domain::errors::ValidationError;
use crate::domain::value_objects::{ActorId, DocumentId};
use chrono::{Datelike, NaiveDate};

/// Earliest and latest year the key layout can represent.
pub const MIN_YEAR: i32 = 1;
/// See [`MIN_YEAR`].
pub const MAX_YEAR: i32 = 9999;

/// Creation input after normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEntry {
    /// Execution date.
    pub executed_at: NaiveDate,
    /// Trimmed classification.
    pub nature_of_deed: String,
    /// Trimmed names, submission order.
    pub appearer_names: Vec<String>,
    /// Trimmed notes, `None` when blank.
    pub notes: Option<String>,
    /// PPAT flag.
    pub is_land_registry_act: bool,
    /// Document link.
    pub linked_document_id: Option<DocumentId>,
    /// Acting user.
    pub created_by_actor_id: ActorId,
}

/// Parse a `YYYY-MM-DD` execution date.
pub fn parse_executed_at(value: &str) -> Result<NaiveDate, ValidationError> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| ValidationError::InvalidDate(format!("{value:?}: {e}")))?;
    check_year(date)?;
    Ok(date)
}

fn check_year(date: NaiveDate) -> Result<(), ValidationError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(ValidationError::InvalidDate(format!(
            "year {} outside {MIN_YEAR}..={MAX_YEAR}",
            date.year()
        )));
    }
    Ok(())
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

fn normalise_optional(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validate and normalise a creation request.
pub fn validate_new_entry(
    input: &NewRegisterEntry,
    max_text_len: usize,
) -> Result<ValidatedEntry, ValidationError> {
    let executed_at = input
        .executed_at
        .ok_or(ValidationError::MissingField("executed_at"))?;
    check_year(executed_at)?;

    let actor = input
        .created_by_actor_id
        .clone()
        .ok_or(ValidationError::MissingField("created_by_actor_id"))?;
    if actor.as_str().trim().is_empty() {
        return Err(ValidationError::EmptyField("created_by_actor_id"));
    }

    let nature_of_deed = input.nature_of_deed.trim();
    if nature_of_deed.is_empty() {
        return Err(ValidationError::EmptyField("nature_of_deed"));
    }
    check_len("nature_of_deed", nature_of_deed, max_text_len)?;

    if input.appearer_names.is_empty() {
        return Err(ValidationError::NoAppearers);
    }
    if input.appearer_names.len() > usize::from(u16::MAX) {
        return Err(ValidationError::TooLong {
            field: "appearer_names",
            max: usize::from(u16::MAX),
        });
    }
    let mut appearer_names = Vec::with_capacity(input.appearer_names.len());
    for (position, name) in input.appearer_names.iter().enumerate() {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyAppearerName { position });
        }
        check_len("appearer_names", name, max_text_len)?;
        appearer_names.push(name.to_string());
    }

    let notes = normalise_optional(input.notes.as_ref());
    if let Some(notes) = &notes {
        check_len("notes", notes, max_text_len)?;
    }

    Ok(ValidatedEntry {
        executed_at,
        nature_of_deed: nature_of_deed.to_string(),
        appearer_names,
        notes,
        is_land_registry_act: input.is_land_registry_act,
        linked_document_id: input.linked_document_id.clone(),
        created_by_actor_id: actor,
    })
}

/// Validate and normalise an administrative patch.
pub fn validate_patch(
    patch: &AdministrativePatch,
    max_text_len: usize,
) -> Result<AdministrativePatch, ValidationError> {
    if patch.is_empty() {
        return Err(ValidationError::EmptyPatch);
    }
    let notes = match &patch.notes {
        Some(notes) => {
            let notes = normalise_optional(notes.as_ref());
            if let Some(n) = &notes {
                check_len("notes", n, max_text_len)?;
            }
            Some(notes)
        }
        None => None,
    };
    Ok(AdministrativePatch {
        notes,
        linked_document_id: patch.linked_document_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn valid_input() -> NewRegisterEntry {
        NewRegisterEntry::new(
            date(2025, 3, 5),
            "  Deed of Establishment ",
            ["  Siti Rahma ", "Budi"],
            ActorId::new("staff-1"),
        )
    }

    #[test]
    fn test_valid_input_is_trimmed() {
        let v = validate_new_entry(&valid_input().with_notes("   "), 100).unwrap();
        assert_eq!(v.nature_of_deed, "Deed of Establishment");
        assert_eq!(v.appearer_names, vec!["Siti Rahma", "Budi"]);
        assert_eq!(v.notes, None);
    }

    #[test]
    fn test_missing_date() {
        let mut input = valid_input();
        input.executed_at = None;
        assert_eq!(
            validate_new_entry(&input, 100),
            Err(ValidationError::MissingField("executed_at"))
        );
    }

    #[test]
    fn test_missing_actor() {
        let mut input = valid_input();
        input.created_by_actor_id = None;
        assert_eq!(
            validate_new_entry(&input, 100),
            Err(ValidationError::MissingField("created_by_actor_id"))
        );
    }

    #[test]
    fn test_empty_nature() {
        let mut input = valid_input();
        input.nature_of_deed = "   ".to_string();
        assert_eq!(
            validate_new_entry(&input, 100),
            Err(ValidationError::EmptyField("nature_of_deed"))
        );
    }

    #[test]
    fn test_no_appearers() {
        let mut input = valid_input();
        input.appearer_names.clear();
        assert_eq!(
            validate_new_entry(&input, 100),
            Err(ValidationError::NoAppearers)
        );
    }

    #[test]
    fn test_blank_appearer() {
        let mut input = valid_input();
        input.appearer_names.push(" ".to_string());
        assert_eq!(
            validate_new_entry(&input, 100),
            Err(ValidationError::EmptyAppearerName { position: 2 })
        );
    }

    #[test]
    fn test_too_long() {
        let mut input = valid_input();
        input.nature_of_deed = "x".repeat(11);
        assert_eq!(
            validate_new_entry(&input, 10),
            Err(ValidationError::TooLong {
                field: "nature_of_deed",
                max: 10
            })
        );
    }

    #[test]
    fn test_parse_executed_at() {
        assert_eq!(parse_executed_at("2025-03-05").unwrap(), date(2025, 3, 5));
        assert!(matches!(
            parse_executed_at("2025-02-30"),
            Err(ValidationError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_executed_at("yesterday"),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_year_out_of_range() {
        let mut input = valid_input();
        input.executed_at = Some(date(10_000, 1, 1));
        assert!(matches!(
            validate_new_entry(&input, 100),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_patch_validation() {
        assert_eq!(
            validate_patch(&AdministrativePatch::default(), 100),
            Err(ValidationError::EmptyPatch)
        );
        let patch = validate_patch(&AdministrativePatch::default().set_notes("  "), 100).unwrap();
        assert_eq!(patch.notes, Some(None));
    }
}
