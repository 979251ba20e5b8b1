//! Filter state and the filter/sort predicate.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::browse::collate::CollationKey;
use crate::browse::date_key::date_sort_key;
use crate::catalog::record::{Category, TestRecord};

/// Category selection: one concrete category or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Chip order.
    pub const CHOICES: [Self; 5] = [
        Self::All,
        Self::Only(Category::Reading),
        Self::Only(Category::Listening),
        Self::Only(Category::Writing),
        Self::Only(Category::Other),
    ];

    #[must_use]
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }

    fn position(self) -> usize {
        Self::CHOICES
            .iter()
            .position(|choice| *choice == self)
            .unwrap_or(0)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::CHOICES[(self.position() + 1) % Self::CHOICES.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let len = Self::CHOICES.len();
        Self::CHOICES[(self.position() + len - 1) % len]
    }

    /// Chip by index (`0` = all).
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::CHOICES.get(index).copied()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(category) => write!(f, "{category}"),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Category>().map(Self::Only)
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortMode {
    #[default]
    #[serde(rename = "az")]
    TitleAsc,
    #[serde(rename = "za")]
    TitleDesc,
    #[serde(rename = "date-desc")]
    DateDesc,
}

impl SortMode {
    pub const ALL: [Self; 3] = [Self::TitleAsc, Self::TitleDesc, Self::DateDesc];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TitleAsc => "az",
            Self::TitleDesc => "za",
            Self::DateDesc => "date-desc",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TitleAsc => "Title A → Z",
            Self::TitleDesc => "Title Z → A",
            Self::DateDesc => "Newest date",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::TitleAsc => Self::TitleDesc,
            Self::TitleDesc => Self::DateDesc,
            Self::DateDesc => Self::TitleAsc,
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "az" => Ok(Self::TitleAsc),
            "za" => Ok(Self::TitleDesc),
            "date-desc" => Ok(Self::DateDesc),
            other => Err(format!("unknown sort mode: {other}")),
        }
    }
}

/// The user's current selection. Default: all categories, empty query, A → Z.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub category: CategoryFilter,
    pub query: String,
    pub sort: SortMode,
}

impl FilterState {
    /// True when `record` passes both the category and the text condition.
    #[must_use]
    pub fn admits(&self, record: &TestRecord) -> bool {
        self.category.matches(record.category) && title_matches(&record.title, &self.query)
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Case-insensitive substring test. An empty query matches everything.
#[must_use]
pub fn title_matches(title: &str, query: &str) -> bool {
    query.is_empty() || title.to_lowercase().contains(&query.to_lowercase())
}

/// Indices into `records` of the visible subset, in display order.
///
/// Sorting is stable, so records that compare equal keep catalog order.
#[must_use]
pub fn filter_indices(records: &[TestRecord], state: &FilterState, fallback_year: i32) -> Vec<usize> {
    let mut indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| state.admits(record))
        .map(|(index, _)| index)
        .collect();

    match state.sort {
        SortMode::TitleAsc => {
            indices.sort_by_cached_key(|&i| CollationKey::new(&records[i].title));
        }
        SortMode::TitleDesc => {
            indices.sort_by_cached_key(|&i| Reverse(CollationKey::new(&records[i].title)));
        }
        SortMode::DateDesc => {
            indices.sort_by_cached_key(|&i| Reverse(date_sort_key(&records[i].title, fallback_year)));
        }
    }
    indices
}

/// Owned convenience over [`filter_indices`].
#[must_use]
pub fn apply_filters(records: &[TestRecord], state: &FilterState, fallback_year: i32) -> Vec<TestRecord> {
    filter_indices(records, state, fallback_year)
        .into_iter()
        .map(|i| records[i].clone())
        .collect()
}
