//! Aggregate counts and duplicate summaries for display.

use serde::Serialize;

use crate::browse::filter::CategoryFilter;
use crate::catalog::record::{Category, DuplicateGroup, TestRecord};

/// Leading hash characters shown for a duplicate group.
pub const HASH_PREFIX_LEN: usize = 12;

/// Shown instead of the group list when there are no duplicates.
pub const NO_DUPLICATES: &str = "No duplicate files found.";

/// Per-category record counts plus the synthetic `all` total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    pub all: usize,
    pub reading: usize,
    pub listening: usize,
    pub writing: usize,
    pub other: usize,
}

impl CategoryTotals {
    /// Single pass over the catalog.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a TestRecord>) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals.all += 1;
            match record.category {
                Category::Reading => totals.reading += 1,
                Category::Listening => totals.listening += 1,
                Category::Writing => totals.writing += 1,
                Category::Other => totals.other += 1,
            }
        }
        totals
    }

    #[must_use]
    pub const fn get(&self, filter: CategoryFilter) -> usize {
        match filter {
            CategoryFilter::All => self.all,
            CategoryFilter::Only(Category::Reading) => self.reading,
            CategoryFilter::Only(Category::Listening) => self.listening,
            CategoryFilter::Only(Category::Writing) => self.writing,
            CategoryFilter::Only(Category::Other) => self.other,
        }
    }

    /// Label for a category chip. Concrete categories carry their count,
    /// `All` does not.
    #[must_use]
    pub fn chip_label(&self, filter: CategoryFilter) -> String {
        match filter {
            CategoryFilter::All => "All".to_string(),
            CategoryFilter::Only(category) => {
                format!("{} ({})", category.title(), self.get(filter))
            }
        }
    }

    /// Stats cards in display order.
    #[must_use]
    pub fn cards(&self) -> [(&'static str, usize); 4] {
        [
            ("Total", self.all),
            ("Listening", self.listening),
            ("Reading", self.reading),
            ("Writing", self.writing),
        ]
    }
}

/// Display form of one duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSummary {
    pub hash_prefix: String,
    pub files: Vec<String>,
}

/// First [`HASH_PREFIX_LEN`] characters of a hash.
#[must_use]
pub fn hash_prefix(hash: &str) -> String {
    hash.chars().take(HASH_PREFIX_LEN).collect()
}

/// Groups rendered as-is, in input order.
#[must_use]
pub fn summarize_duplicates(groups: &[DuplicateGroup]) -> Vec<DuplicateSummary> {
    groups
        .iter()
        .map(|group| DuplicateSummary {
            hash_prefix: hash_prefix(&group.hash),
            files: group.files.clone(),
        })
        .collect()
}

/// Text lines for the duplicates panel.
#[must_use]
pub fn duplicate_lines(groups: &[DuplicateGroup]) -> Vec<String> {
    if groups.is_empty() {
        return vec![NO_DUPLICATES.to_string()];
    }
    let mut lines = Vec::new();
    for summary in summarize_duplicates(groups) {
        lines.push(format!("Hash: {}…", summary.hash_prefix));
        lines.extend(summary.files.into_iter().map(|file| format!("  {file}")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(category: Category) -> TestRecord {
        TestRecord::new("f.html", "t", category)
    }

    #[test]
    fn totals_count_every_category_once() {
        let records = vec![
            rec(Category::Reading),
            rec(Category::Reading),
            rec(Category::Listening),
            rec(Category::Other),
        ];
        let totals = CategoryTotals::from_records(&records);
        assert_eq!(totals.all, 4);
        assert_eq!(totals.reading, 2);
        assert_eq!(totals.listening, 1);
        assert_eq!(totals.writing, 0);
        assert_eq!(totals.other, 1);
    }

    #[test]
    fn empty_catalog_totals_are_zero() {
        assert_eq!(CategoryTotals::from_records(&[]), CategoryTotals::default());
    }

    #[test]
    fn chip_labels() {
        let totals = CategoryTotals::from_records(&[rec(Category::Writing)]);
        assert_eq!(totals.chip_label(CategoryFilter::All), "All");
        assert_eq!(
            totals.chip_label(CategoryFilter::Only(Category::Writing)),
            "Writing (1)"
        );
    }

    #[test]
    fn empty_duplicates_are_labelled() {
        assert_eq!(duplicate_lines(&[]), vec![NO_DUPLICATES.to_string()]);
    }

    #[test]
    fn duplicate_lines_show_prefix_and_files() {
        let groups = vec![DuplicateGroup {
            hash: "0123456789abcdef0123".to_string(),
            files: vec!["a.html".to_string(), "b/a.html".to_string()],
        }];
        let lines = duplicate_lines(&groups);
        assert_eq!(lines[0], "Hash: 0123456789ab…");
        assert_eq!(lines[1], "  a.html");
        assert_eq!(lines[2], "  b/a.html");
    }

    #[test]
    fn short_hash_prefix_is_whole_hash() {
        assert_eq!(hash_prefix("abc"), "abc");
    }
}
