//! Reads the static catalog files from the site root.
//!
//! Nothing is cached: every call goes to the filesystem, so a reload after
//! `iecat build` always sees the fresh files.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;

use crate::catalog::record::{DuplicateGroup, TestRecord};
use crate::core::config::CatalogConfig;
use crate::core::errors::{CatalogError, Result};

/// Read and decode one JSON file.
///
/// When the file cannot be read, `fallback` is returned if one was given;
/// otherwise the read failure surfaces as [`CatalogError::LoadFailed`].
/// Content that is not valid JSON for `T` is always an error.
pub fn load_json<T: DeserializeOwned>(path: &Path, fallback: Option<T>) -> Result<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            return fallback.ok_or_else(|| CatalogError::LoadFailed {
                path: path.to_path_buf(),
                details: err.to_string(),
            });
        }
    };
    serde_json::from_slice(&bytes).map_err(|err| CatalogError::CatalogDecode {
        path: path.to_path_buf(),
        details: err.to_string(),
    })
}

/// Load a resource the caller cannot work without.
pub fn load_required<T: DeserializeOwned>(path: &Path) -> Result<T> {
    load_json(path, None)
}

/// Load a list that may be absent. Any failure yields an empty list plus the
/// error so the caller can log it.
pub fn load_optional<T: DeserializeOwned>(path: &Path) -> (Vec<T>, Option<CatalogError>) {
    match load_json(path, Some(Vec::new())) {
        Ok(items) => (items, None),
        Err(err) => (Vec::new(), Some(err)),
    }
}

/// Everything the browser needs from the site root.
#[derive(Debug)]
pub struct SiteData {
    pub tests_path: PathBuf,
    pub records: Vec<TestRecord>,
    pub duplicates: Vec<DuplicateGroup>,
    /// Why the duplicate list came back empty, when it did not load cleanly.
    pub duplicates_warning: Option<CatalogError>,
    pub elapsed: Duration,
}

/// Load the test list and the duplicate list concurrently.
///
/// The test list is required: its failure fails the whole load and no partial
/// catalog is returned. The duplicate list degrades to empty.
pub fn load_site(config: &CatalogConfig) -> Result<SiteData> {
    let started = Instant::now();
    let tests_path = config.tests_path();
    let duplicates_path = config.duplicates_path();

    let (records, (duplicates, duplicates_warning)) = thread::scope(|scope| {
        let duplicates = scope.spawn(|| load_optional::<DuplicateGroup>(&duplicates_path));
        let records = load_required::<Vec<TestRecord>>(&tests_path);
        let duplicates = duplicates.join().unwrap_or_else(|_| {
            (
                Vec::new(),
                Some(CatalogError::Runtime {
                    details: "duplicate loader thread panicked".to_string(),
                }),
            )
        });
        (records, duplicates)
    });

    Ok(SiteData {
        tests_path,
        records: records?,
        duplicates,
        duplicates_warning,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record::Category;

    fn site_with(tests: Option<&str>, duplicates: Option<&str>) -> (tempfile::TempDir, CatalogConfig) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        if let Some(body) = tests {
            fs::write(dir.path().join("data/tests.json"), body).unwrap();
        }
        if let Some(body) = duplicates {
            fs::write(dir.path().join("data/duplicates.json"), body).unwrap();
        }
        let config = CatalogConfig {
            root: dir.path().to_path_buf(),
            ..CatalogConfig::default()
        };
        (dir, config)
    }

    #[test]
    fn missing_file_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let value: Vec<DuplicateGroup> =
            load_json(&dir.path().join("nope.json"), Some(Vec::new())).unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn missing_file_without_fallback_is_load_failed() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_required::<Vec<TestRecord>>(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.code(), "IEC-2001");
    }

    #[test]
    fn malformed_json_is_decode_error_even_with_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = load_json::<Vec<DuplicateGroup>>(&path, Some(Vec::new())).unwrap_err();
        assert_eq!(err.code(), "IEC-2002");
    }

    #[test]
    fn optional_load_reports_warning_and_empties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[{\"hash\": 1}]").unwrap();
        let (items, warning) = load_optional::<DuplicateGroup>(&path);
        assert!(items.is_empty());
        assert!(warning.is_some());
    }

    #[test]
    fn site_without_duplicates_still_loads_catalog() {
        let (_dir, config) = site_with(
            Some(r#"[{"file":"a.html","title":"Reading 1","category":"reading"}]"#),
            None,
        );
        let site = load_site(&config).unwrap();
        assert_eq!(site.records.len(), 1);
        assert_eq!(site.records[0].category, Category::Reading);
        assert!(site.duplicates.is_empty());
        assert!(site.duplicates_warning.is_none());
    }

    #[test]
    fn record_without_category_loads_as_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tests.json");
        fs::write(
            &path,
            r#"[{"file":"a.html","title":"Reading 1","category":"reading"},{"file":"b.html","title":"Loose doc"}]"#,
        )
        .unwrap();
        let records = load_required::<Vec<TestRecord>>(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, Category::Reading);
        assert_eq!(records[1].category, Category::Other);
        assert_eq!(records[1].category.label(), "📄 Other document");
    }

    #[test]
    fn site_with_missing_catalog_fails_whole_load() {
        let (_dir, config) = site_with(None, Some(r#"[{"hash":"x","files":["a","b"]}]"#));
        let err = load_site(&config).unwrap_err();
        assert_eq!(err.code(), "IEC-2001");
    }

    #[test]
    fn site_loads_both_files() {
        let (_dir, config) = site_with(
            Some("[]"),
            Some(r#"[{"hash":"abc","files":["a.html","b.html"]}]"#),
        );
        let site = load_site(&config).unwrap();
        assert!(site.records.is_empty());
        assert_eq!(site.duplicates.len(), 1);
        assert_eq!(site.duplicates[0].files, vec!["a.html", "b.html"]);
    }
}
