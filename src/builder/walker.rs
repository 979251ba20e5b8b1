//! Parallel discovery of source documents under the site root.
//!
//! Workers share one unbounded queue of directories. An in-flight counter
//! tracks queued plus in-progress directories; a worker exits once the queue
//! stays empty and the counter reaches zero.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, SystemTime};

use crossbeam_channel as channel;
use parking_lot::Mutex;

use crate::core::config::BuilderConfig;
use crate::core::errors::{CatalogError, Result};

/// Walker configuration derived from `BuilderConfig`.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    pub root: PathBuf,
    /// Lowercase, without leading dot.
    pub extensions: Vec<String>,
    pub ignore_files: HashSet<String>,
    pub skip_dirs: HashSet<String>,
    pub max_depth: usize,
    pub follow_symlinks: bool,
    pub parallelism: usize,
}

impl WalkerConfig {
    #[must_use]
    pub fn from_builder(root: &Path, config: &BuilderConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            ignore_files: config.ignore_files.iter().cloned().collect(),
            skip_dirs: config.skip_dirs.iter().cloned().collect(),
            max_depth: config.max_depth,
            follow_symlinks: config.follow_symlinks,
            parallelism: config.parallelism,
        }
    }

    fn wants(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        if self.ignore_files.contains(name.as_ref()) {
            return false;
        }
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| *wanted == ext))
    }
}

/// A document found during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

type WorkItem = (PathBuf, usize);

pub struct SourceWalker {
    config: WalkerConfig,
}

impl SourceWalker {
    #[must_use]
    pub const fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// Walk the root and return every matching document, in no fixed order.
    pub fn walk(&self) -> Result<Vec<SourceFile>> {
        let meta = fs::metadata(&self.config.root)
            .map_err(|e| CatalogError::io(&self.config.root, e))?;
        if !meta.is_dir() {
            return Err(CatalogError::InvalidConfig {
                details: format!("site root {} is not a directory", self.config.root.display()),
            });
        }

        let parallelism = self.config.parallelism.max(1);
        let (work_tx, work_rx) = channel::unbounded::<WorkItem>();
        let (result_tx, result_rx) = channel::unbounded::<SourceFile>();
        let in_flight = Arc::new(AtomicUsize::new(0));
        // Canonical directories already queued; guards symlink cycles.
        let visited = Arc::new(Mutex::new(HashSet::new()));

        if let Ok(canonical) = fs::canonicalize(&self.config.root) {
            visited.lock().insert(canonical);
        }
        in_flight.fetch_add(1, Ordering::Release);
        work_tx
            .send((self.config.root.clone(), 0))
            .map_err(|_| CatalogError::ChannelClosed {
                component: "builder walker",
            })?;

        let mut handles = Vec::with_capacity(parallelism);
        for _ in 0..parallelism {
            let work_rx = work_rx.clone();
            let work_tx = work_tx.clone();
            let result_tx = result_tx.clone();
            let in_flight = Arc::clone(&in_flight);
            let visited = Arc::clone(&visited);
            let config = self.config.clone();

            handles.push(thread::spawn(move || {
                walker_thread(&work_rx, &work_tx, &result_tx, &in_flight, &visited, &config);
            }));
        }
        drop(result_tx);

        let files: Vec<SourceFile> = result_rx.iter().collect();
        for handle in handles {
            handle.join().map_err(|_| CatalogError::Runtime {
                details: "builder walker thread panicked".to_string(),
            })?;
        }
        Ok(files)
    }
}

fn walker_thread(
    work_rx: &channel::Receiver<WorkItem>,
    work_tx: &channel::Sender<WorkItem>,
    result_tx: &channel::Sender<SourceFile>,
    in_flight: &AtomicUsize,
    visited: &Mutex<HashSet<PathBuf>>,
    config: &WalkerConfig,
) {
    loop {
        match work_rx.recv_timeout(Duration::from_millis(50)) {
            Ok((dir_path, depth)) => {
                process_directory(&dir_path, depth, work_tx, result_tx, in_flight, visited, config);
                in_flight.fetch_sub(1, Ordering::AcqRel);
            }
            Err(channel::RecvTimeoutError::Timeout) => {
                if in_flight.load(Ordering::Acquire) == 0 {
                    return;
                }
            }
            Err(channel::RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Read one directory: emit matching files, queue subdirectories.
fn process_directory(
    dir_path: &Path,
    depth: usize,
    work_tx: &channel::Sender<WorkItem>,
    result_tx: &channel::Sender<SourceFile>,
    in_flight: &AtomicUsize,
    visited: &Mutex<HashSet<PathBuf>>,
    config: &WalkerConfig,
) {
    // Unreadable directories (permissions, races with deletion) are skipped.
    let Ok(entries) = fs::read_dir(dir_path) else {
        return;
    };

    for entry in entries.flatten() {
        let child_path = entry.path();
        let Ok(ft) = entry.file_type() else {
            continue;
        };
        if ft.is_symlink() && !config.follow_symlinks {
            continue;
        }

        let Ok(meta) = (if ft.is_symlink() {
            fs::metadata(&child_path)
        } else {
            entry.metadata()
        }) else {
            continue;
        };

        if meta.is_dir() {
            let skipped = child_path
                .file_name()
                .is_some_and(|name| config.skip_dirs.contains(name.to_string_lossy().as_ref()));
            if skipped || depth >= config.max_depth {
                continue;
            }
            if config.follow_symlinks {
                let Ok(canonical) = fs::canonicalize(&child_path) else {
                    continue;
                };
                if !visited.lock().insert(canonical) {
                    continue;
                }
            }
            in_flight.fetch_add(1, Ordering::Release);
            if work_tx.send((child_path, depth + 1)).is_err() {
                in_flight.fetch_sub(1, Ordering::Release);
            }
        } else if meta.is_file() && config.wants(&child_path) {
            let _ = result_tx.send(SourceFile {
                path: child_path,
                size: meta.len(),
                modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }
    }
}
