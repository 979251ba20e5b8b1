//! Catalog builder: scan the site for test documents and write the two data
//! files the browser reads.

pub mod hasher;
pub mod walker;

use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use crossbeam_channel as channel;
use serde::Serialize;

use crate::catalog::record::{Category, DuplicateGroup, TestRecord};
use crate::catalog::stats::CategoryTotals;
use crate::core::config::{BuilderConfig, CatalogConfig};
use crate::core::errors::{CatalogError, Result};
use crate::core::paths::site_relative;

use self::hasher::hash_file;
use self::walker::{SourceFile, SourceWalker, WalkerConfig};

/// A document that was found but could not be catalogued.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error_code: &'static str,
    pub reason: String,
}

/// Outcome of one build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub root: PathBuf,
    pub tests_path: PathBuf,
    pub duplicates_path: PathBuf,
    pub records: usize,
    pub totals: CategoryTotals,
    pub duplicate_groups: usize,
    /// Files that belong to some duplicate group.
    pub duplicate_files: usize,
    pub skipped: Vec<SkippedFile>,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Scan `catalog.root`, then write the test list and duplicate list under it.
pub fn build_catalog(catalog: &CatalogConfig, builder: &BuilderConfig) -> Result<BuildReport> {
    let started = Instant::now();
    let root = catalog.root.as_path();

    let sources = SourceWalker::new(WalkerConfig::from_builder(root, builder)).walk()?;
    if sources.is_empty() {
        return Err(CatalogError::NoSourceFiles {
            root: root.to_path_buf(),
        });
    }

    let (hashed, skipped) = hash_all(sources, builder.parallelism)?;
    let records = to_records(root, hashed);
    let duplicates = find_duplicates(&records);

    let tests_path = catalog.tests_path();
    let duplicates_path = catalog.duplicates_path();
    write_json_atomic(&tests_path, &records)?;
    write_json_atomic(&duplicates_path, &duplicates)?;

    Ok(BuildReport {
        root: root.to_path_buf(),
        tests_path,
        duplicates_path,
        records: records.len(),
        totals: CategoryTotals::from_records(&records),
        duplicate_groups: duplicates.len(),
        duplicate_files: duplicates.iter().map(|g| g.files.len()).sum(),
        skipped,
        elapsed: started.elapsed(),
    })
}

/// Hash every file on a small worker pool.
fn hash_all(
    sources: Vec<SourceFile>,
    parallelism: usize,
) -> Result<(Vec<(SourceFile, String)>, Vec<SkippedFile>)> {
    let workers = parallelism.max(1).min(sources.len().max(1));
    let (job_tx, job_rx) = channel::unbounded::<SourceFile>();
    let (done_tx, done_rx) = channel::unbounded::<(SourceFile, Result<String>)>();

    for source in sources {
        job_tx.send(source).map_err(|_| CatalogError::ChannelClosed {
            component: "builder hasher",
        })?;
    }
    drop(job_tx);

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let done_tx = done_tx.clone();
            scope.spawn(move || {
                for source in job_rx {
                    let digest = hash_file(&source.path);
                    if done_tx.send((source, digest)).is_err() {
                        return;
                    }
                }
            });
        }
    });
    drop(done_tx);

    let mut hashed = Vec::new();
    let mut skipped = Vec::new();
    for (source, digest) in done_rx {
        match digest {
            Ok(hash) => hashed.push((source, hash)),
            Err(err) => skipped.push(SkippedFile {
                path: source.path,
                error_code: err.code(),
                reason: err.to_string(),
            }),
        }
    }
    Ok((hashed, skipped))
}

fn to_records(root: &Path, hashed: Vec<(SourceFile, String)>) -> Vec<TestRecord> {
    let mut records: Vec<TestRecord> = hashed
        .into_iter()
        .filter_map(|(source, hash)| {
            let file = site_relative(root, &source.path)?;
            let title = source.path.file_stem()?.to_string_lossy().into_owned();
            let file_name = source.path.file_name()?.to_string_lossy().into_owned();
            Some(TestRecord {
                file,
                title,
                category: Category::detect(&file_name),
                hash: Some(hash),
                size: Some(source.size),
                modified: Some(epoch_seconds(source.modified)),
            })
        })
        .collect();

    records.sort_by_cached_key(|r| (r.title.to_lowercase(), r.file.clone()));
    records
}

/// Groups of two or more files with identical content. Files sorted within a
/// group; groups ordered by their first file.
#[must_use]
pub fn find_duplicates(records: &[TestRecord]) -> Vec<DuplicateGroup> {
    let mut by_hash: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for record in records {
        if let Some(hash) = record.hash.as_deref() {
            by_hash.entry(hash).or_default().push(record.file.clone());
        }
    }

    let mut groups: Vec<DuplicateGroup> = by_hash
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(hash, mut files)| {
            files.sort();
            DuplicateGroup {
                hash: hash.to_string(),
                files,
            }
        })
        .collect();
    groups.sort_by(|a, b| a.files.first().cmp(&b.files.first()));
    groups
}

fn epoch_seconds(time: SystemTime) -> f64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

/// Pretty JSON through a temp file and rename, so the browser never reads a
/// half-written catalog.
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
    }
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path).map_err(|e| CatalogError::io(&tmp_path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| CatalogError::io(&tmp_path, e))?;
        file.sync_all().map_err(|e| CatalogError::io(&tmp_path, e))?;
    }
    fs::rename(&tmp_path, path).map_err(|e| CatalogError::io(path, e))
}
