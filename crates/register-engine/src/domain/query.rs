//! # Register Queries
//!
//! Filter, sort and pagination semantics for register and index reads.
//! Filters combine with AND; every sort ends with a ledger-order tie-break
//! (year, then `yearly_seq`, both ascending) so that pages are deterministic.

use crate::domain::entities::{IndexEntry, RegisterEntry};
use crate::domain::errors::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default page size.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Sort key for register queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// Register number.
    #[default]
    YearlySeq,
    /// Execution date.
    ExecutedAt,
    /// Classification, case-insensitive.
    NatureOfDeed,
}

/// Sort key for index queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexSortKey {
    /// Alphabetical klapper order.
    #[default]
    AppearerName,
    /// Register number.
    YearlySeq,
    /// Execution date.
    ExecutedAt,
    /// Classification, case-insensitive.
    NatureOfDeed,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Filter over register entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterFilter {
    /// Year of execution.
    pub year: Option<i32>,
    /// Month of execution (1-12).
    pub month: Option<u32>,
    /// PPAT flag.
    pub is_land_registry_act: Option<bool>,
    /// Case-insensitive substring of the classification or any appearer.
    pub search: Option<String>,
    /// Inclusive lower bound on the execution date.
    pub executed_from: Option<NaiveDate>,
    /// Inclusive upper bound on the execution date.
    pub executed_to: Option<NaiveDate>,
    /// Sort key.
    pub sort: SortKey,
    /// Sort direction.
    pub direction: SortDirection,
    /// Rows to skip.
    pub offset: usize,
    /// Page size.
    pub limit: usize,
}

impl Default for RegisterFilter {
    fn default() -> Self {
        Self {
            year: None,
            month: None,
            is_land_registry_act: None,
            search: None,
            executed_from: None,
            executed_to: None,
            sort: SortKey::default(),
            direction: SortDirection::default(),
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RegisterFilter {
    /// Entries of one calendar month.
    pub fn for_month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            ..Default::default()
        }
    }

    /// Entries of one year.
    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Default::default()
        }
    }

    /// Set the sort order.
    pub fn sorted_by(mut self, sort: SortKey, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }

    /// Set the free-text search.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Set offset and limit.
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Reject malformed filters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_common(self.month, self.executed_from, self.executed_to, self.limit)
    }

    /// Whether an entry passes every filter.
    pub fn matches(&self, entry: &RegisterEntry) -> bool {
        if self.year.is_some_and(|y| entry.year() != y) {
            return false;
        }
        if self.month.is_some_and(|m| entry.month() != m) {
            return false;
        }
        if self
            .is_land_registry_act
            .is_some_and(|flag| entry.is_land_registry_act != flag)
        {
            return false;
        }
        if !within(entry.executed_at, self.executed_from, self.executed_to) {
            return false;
        }
        match normalised_needle(self.search.as_deref()) {
            Some(needle) => {
                contains_ci(&entry.nature_of_deed, &needle)
                    || entry
                        .appearer_names
                        .iter()
                        .any(|name| contains_ci(name, &needle))
            }
            None => true,
        }
    }

    /// Order two entries by the configured sort.
    pub fn compare(&self, a: &RegisterEntry, b: &RegisterEntry) -> Ordering {
        let primary = match self.sort {
            SortKey::YearlySeq => ledger_order(a.year(), a.yearly_seq, b.year(), b.yearly_seq),
            SortKey::ExecutedAt => a.executed_at.cmp(&b.executed_at),
            SortKey::NatureOfDeed => cmp_ci(&a.nature_of_deed, &b.nature_of_deed),
        };
        self.direction
            .apply(primary)
            .then_with(|| ledger_order(a.year(), a.yearly_seq, b.year(), b.yearly_seq))
            .then_with(|| a.pool.cmp(&b.pool))
    }
}

/// Filter over index rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFilter {
    /// Year of execution.
    pub year: Option<i32>,
    /// Month of execution (1-12).
    pub month: Option<u32>,
    /// First-letter bucket (case-insensitive; `#` for names without letters).
    pub first_letter: Option<char>,
    /// Case-insensitive substring of the name or classification.
    pub search: Option<String>,
    /// Inclusive lower bound on the execution date.
    pub executed_from: Option<NaiveDate>,
    /// Inclusive upper bound on the execution date.
    pub executed_to: Option<NaiveDate>,
    /// Sort key.
    pub sort: IndexSortKey,
    /// Sort direction.
    pub direction: SortDirection,
    /// Rows to skip.
    pub offset: usize,
    /// Page size.
    pub limit: usize,
}

impl Default for IndexFilter {
    fn default() -> Self {
        Self {
            year: None,
            month: None,
            first_letter: None,
            search: None,
            executed_from: None,
            executed_to: None,
            sort: IndexSortKey::default(),
            direction: SortDirection::default(),
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl IndexFilter {
    /// Rows under one first-letter bucket.
    pub fn for_letter(letter: char) -> Self {
        Self {
            first_letter: Some(letter),
            ..Default::default()
        }
    }

    /// Restrict to one year.
    pub fn in_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Set the free-text search.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Set the sort order.
    pub fn sorted_by(mut self, sort: IndexSortKey, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }

    /// Set offset and limit.
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Reject malformed filters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_common(self.month, self.executed_from, self.executed_to, self.limit)
    }

    /// Whether a row passes every filter.
    pub fn matches(&self, row: &IndexEntry) -> bool {
        if self.year.is_some_and(|y| row.year() != y) {
            return false;
        }
        if self.month.is_some_and(|m| row.month() != m) {
            return false;
        }
        if let Some(letter) = self.first_letter {
            let wanted = letter.to_uppercase().next().unwrap_or(letter);
            if row.first_letter != wanted {
                return false;
            }
        }
        if !within(row.executed_at, self.executed_from, self.executed_to) {
            return false;
        }
        match normalised_needle(self.search.as_deref()) {
            Some(needle) => {
                contains_ci(&row.appearer_name, &needle) || contains_ci(&row.nature_of_deed, &needle)
            }
            None => true,
        }
    }

    /// Order two rows by the configured sort.
    pub fn compare(&self, a: &IndexEntry, b: &IndexEntry) -> Ordering {
        let primary = match self.sort {
            IndexSortKey::AppearerName => cmp_ci(&a.appearer_name, &b.appearer_name),
            IndexSortKey::YearlySeq => {
                ledger_order(a.year(), a.yearly_seq, b.year(), b.yearly_seq)
            }
            IndexSortKey::ExecutedAt => a.executed_at.cmp(&b.executed_at),
            IndexSortKey::NatureOfDeed => cmp_ci(&a.nature_of_deed, &b.nature_of_deed),
        };
        self.direction
            .apply(primary)
            .then_with(|| ledger_order(a.year(), a.yearly_seq, b.year(), b.yearly_seq))
            .then_with(|| a.pool.cmp(&b.pool))
            .then_with(|| a.id.position.cmp(&b.id.position))
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows of this page.
    pub items: Vec<T>,
    /// Number of rows matching the filter across all pages.
    pub total: usize,
    /// Offset this page starts at.
    pub offset: usize,
    /// Effective page size.
    pub limit: usize,
}

impl<T> Page<T> {
    /// Cut a page out of a fully sorted result set.
    pub fn from_sorted(rows: Vec<T>, offset: usize, limit: usize) -> Self {
        let total = rows.len();
        let items = rows.into_iter().skip(offset).take(limit).collect();
        Self {
            items,
            total,
            offset,
            limit,
        }
    }

    /// Whether this page has no rows (e.g. a NIHIL month).
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether more rows follow this page.
    pub fn has_more(&self) -> bool {
        self.offset.saturating_add(self.items.len()) < self.total
    }
}

fn check_common(
    month: Option<u32>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    limit: usize,
) -> Result<(), ValidationError> {
    if let Some(m) = month {
        if !(1..=12).contains(&m) {
            return Err(ValidationError::InvalidFilter {
                reason: format!("month {m} outside 1..=12"),
            });
        }
    }
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ValidationError::InvalidFilter {
                reason: format!("date range {from}..{to} is inverted"),
            });
        }
    }
    if limit == 0 {
        return Err(ValidationError::InvalidFilter {
            reason: "limit must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Register order: year first, then number within the year.
fn ledger_order(a_year: i32, a_seq: u64, b_year: i32, b_seq: u64) -> Ordering {
    a_year.cmp(&b_year).then(a_seq.cmp(&b_seq))
}

fn within(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
}

fn normalised_needle(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn cmp_ci(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
