//! Persisted filter selection with safe atomic writes.
//!
//! The last category, query and sort survive across sessions as a small JSON
//! blob. Persistence failures never block browsing: a broken or unreadable
//! file means defaults, and a failed save is reported to the caller to log.
//!
//! # Merge Order
//!
//! ```text
//! compiled defaults → persisted filters → CLI/session overrides
//! ```
//!
//! The persisted layer is merged field by field: a field that is missing or
//! holds a value this build does not understand keeps its default while the
//! valid fields still apply.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::browse::filter::{CategoryFilter, FilterState, SortMode};
use crate::core::errors::{CatalogError, Result};

// ──────────────────── validation ────────────────────

/// Issues found while merging a stored blob over defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
    pub applied_defaults: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.applied_defaults.is_empty()
    }
}

/// Merge a decoded JSON value over [`FilterState::default`].
#[must_use]
pub fn merge_stored(value: &Value) -> (FilterState, ValidationReport) {
    let mut state = FilterState::default();
    let mut report = ValidationReport::default();

    let Some(object) = value.as_object() else {
        report
            .warnings
            .push("stored filters are not a JSON object; using defaults".to_string());
        report.applied_defaults.extend(
            ["category", "query", "sort"]
                .iter()
                .map(|field| (*field).to_string()),
        );
        return (state, report);
    };

    match object.get("category") {
        None | Some(Value::Null) => {}
        Some(Value::String(raw)) => match raw.parse::<CategoryFilter>() {
            Ok(category) => state.category = category,
            Err(err) => {
                report.warnings.push(err);
                report.applied_defaults.push("category".to_string());
            }
        },
        Some(other) => {
            report.warnings.push(format!("category must be a string, got {other}"));
            report.applied_defaults.push("category".to_string());
        }
    }

    match object.get("query") {
        None | Some(Value::Null) => {}
        Some(Value::String(raw)) => state.query.clone_from(raw),
        Some(other) => {
            report.warnings.push(format!("query must be a string, got {other}"));
            report.applied_defaults.push("query".to_string());
        }
    }

    match object.get("sort") {
        None | Some(Value::Null) => {}
        Some(Value::String(raw)) => match raw.parse::<SortMode>() {
            Ok(sort) => state.sort = sort,
            Err(err) => {
                report.warnings.push(err);
                report.applied_defaults.push("sort".to_string());
            }
        },
        Some(other) => {
            report.warnings.push(format!("sort must be a string, got {other}"));
            report.applied_defaults.push("sort".to_string());
        }
    }

    (state, report)
}

// ──────────────────── persistence ────────────────────

/// Load outcome from the persistence layer.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Parsed and merged over defaults.
    Loaded {
        filters: FilterState,
        report: ValidationReport,
    },
    /// No file yet (first launch) or an empty one.
    Missing,
    /// File exists but is not JSON.
    Corrupt { details: String },
    /// File could not be read.
    IoError { details: String },
}

impl LoadOutcome {
    /// Effective filters regardless of load status.
    #[must_use]
    pub fn into_filters(self) -> FilterState {
        match self {
            Self::Loaded { filters, .. } => filters,
            Self::Missing | Self::Corrupt { .. } | Self::IoError { .. } => FilterState::default(),
        }
    }

    /// Whether the load was successful (loaded or first-launch missing).
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Loaded { .. } | Self::Missing)
    }

    /// Human-readable reason when the stored filters were not used.
    #[must_use]
    pub fn problem(&self) -> Option<String> {
        match self {
            Self::Loaded { report, .. } if !report.is_clean() => Some(report.warnings.join("; ")),
            Self::Corrupt { details } => Some(format!("corrupt preferences: {details}")),
            Self::IoError { details } => Some(format!("unreadable preferences: {details}")),
            _ => None,
        }
    }
}

/// Load filters from a file path. Never fails; see [`LoadOutcome`].
pub fn load(path: &Path) -> LoadOutcome {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return LoadOutcome::Missing,
        // Binary garbage / invalid UTF-8 is corrupt content, not an I/O error.
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return LoadOutcome::Corrupt {
                details: e.to_string(),
            };
        }
        Err(e) => {
            return LoadOutcome::IoError {
                details: e.to_string(),
            };
        }
    };

    if content.trim().is_empty() {
        return LoadOutcome::Missing;
    }

    match serde_json::from_str::<Value>(&content) {
        Ok(value) => {
            let (filters, report) = merge_stored(&value);
            LoadOutcome::Loaded { filters, report }
        }
        Err(e) => LoadOutcome::Corrupt {
            details: e.to_string(),
        },
    }
}

/// Atomic save: serialize → temp file → fsync → rename.
///
/// Creates parent directories as needed. Returns the path written.
pub fn save(filters: &FilterState, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| CatalogError::io(parent, source))?;
    }

    let json = serde_json::to_string(filters)?;

    // Same directory keeps the rename on one filesystem.
    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path).map_err(|e| CatalogError::io(&tmp_path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| CatalogError::io(&tmp_path, e))?;
        file.sync_all().map_err(|e| CatalogError::io(&tmp_path, e))?;
    }

    fs::rename(&tmp_path, path).map_err(|e| CatalogError::io(path, e))?;
    Ok(path.to_path_buf())
}

/// Remove the stored filters. Returns whether a file was deleted.
pub fn clear(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CatalogError::io(path, e)),
    }
}

// ──────────────────── merge ────────────────────

/// Per-invocation overrides from CLI flags. `None` keeps the persisted value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOverrides {
    pub category: Option<CategoryFilter>,
    pub query: Option<String>,
    pub sort: Option<SortMode>,
}

impl SessionOverrides {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none() && self.query.is_none() && self.sort.is_none()
    }
}

/// Apply session overrides on top of persisted filters.
#[must_use]
pub fn merge(persisted: &FilterState, overrides: &SessionOverrides) -> FilterState {
    FilterState {
        category: overrides.category.unwrap_or(persisted.category),
        query: overrides
            .query
            .clone()
            .unwrap_or_else(|| persisted.query.clone()),
        sort: overrides.sort.unwrap_or(persisted.sort),
    }
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record::Category;

    #[test]
    fn missing_file_is_first_launch() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = load(&dir.path().join("filters.json"));
        assert!(matches!(outcome, LoadOutcome::Missing));
        assert!(outcome.is_ok());
        assert_eq!(outcome.into_filters(), FilterState::default());
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        fs::write(&path, "{category: reading").unwrap();
        let outcome = load(&path);
        assert!(matches!(outcome, LoadOutcome::Corrupt { .. }));
        assert!(outcome.problem().is_some());
        let filters = outcome.into_filters();
        assert_eq!(filters.category, CategoryFilter::All);
        assert_eq!(filters.query, "");
        assert_eq!(filters.sort, SortMode::TitleAsc);
    }

    #[test]
    fn binary_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        assert!(matches!(load(&path), LoadOutcome::Corrupt { .. }));
    }

    #[test]
    fn partial_blob_merges_over_defaults() {
        let (filters, report) = merge_stored(&serde_json::json!({ "sort": "date-desc" }));
        assert!(report.is_clean());
        assert_eq!(filters.sort, SortMode::DateDesc);
        assert_eq!(filters.category, CategoryFilter::All);
    }

    #[test]
    fn invalid_field_keeps_its_default_only() {
        let (filters, report) = merge_stored(&serde_json::json!({
            "category": "speaking",
            "query": "cam 18",
            "sort": 7,
        }));
        assert_eq!(filters.category, CategoryFilter::All);
        assert_eq!(filters.query, "cam 18");
        assert_eq!(filters.sort, SortMode::TitleAsc);
        assert_eq!(report.applied_defaults, vec!["category", "sort"]);
    }

    #[test]
    fn non_object_blob_is_all_defaults() {
        let (filters, report) = merge_stored(&serde_json::json!([1, 2, 3]));
        assert_eq!(filters, FilterState::default());
        assert_eq!(report.applied_defaults.len(), 3);
    }

    #[test]
    fn save_then_load_restores_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("filters.json");
        let filters = FilterState {
            category: CategoryFilter::Only(Category::Writing),
            query: "task 2".to_string(),
            sort: SortMode::TitleDesc,
        };
        save(&filters, &path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load(&path).into_filters(), filters);
    }

    #[test]
    fn clear_reports_whether_file_existed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        assert!(!clear(&path).unwrap());
        save(&FilterState::default(), &path).unwrap();
        assert!(clear(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn overrides_win_over_persisted() {
        let persisted = FilterState {
            category: CategoryFilter::Only(Category::Reading),
            query: "cam".to_string(),
            sort: SortMode::DateDesc,
        };
        let overrides = SessionOverrides {
            query: Some("test 4".to_string()),
            ..SessionOverrides::default()
        };
        let merged = merge(&persisted, &overrides);
        assert_eq!(merged.category, CategoryFilter::Only(Category::Reading));
        assert_eq!(merged.query, "test 4");
        assert_eq!(merged.sort, SortMode::DateDesc);
        assert_eq!(merge(&persisted, &SessionOverrides::default()), persisted);
    }
}
