//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{CatalogError, Result};

/// Upper bound for the search debounce; anything longer feels broken.
const MAX_SEARCH_DEBOUNCE_MS: u64 = 10_000;

/// Full catalog configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub browse: BrowseConfig,
    pub builder: BuilderConfig,
    pub paths: PathsConfig,
}

/// Where the static site and its two data files live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Site root. Record `file` paths are relative to it.
    pub root: PathBuf,
    /// Test list, relative to `root` unless absolute.
    pub tests_file: PathBuf,
    /// Duplicate-group list, relative to `root` unless absolute.
    pub duplicates_file: PathBuf,
}

/// Browsing pipeline knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BrowseConfig {
    /// Rows appended per load-more trigger.
    pub batch_size: usize,
    /// Quiet period after the last keystroke before the query is applied.
    pub search_debounce_ms: u64,
    /// How many rows before the sentinel the load-more watcher fires.
    pub prefetch_rows: usize,
}

/// Catalog builder scan settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuilderConfig {
    /// File extensions (without dot, case-insensitive) treated as test documents.
    pub extensions: Vec<String>,
    /// Exact file names never catalogued.
    pub ignore_files: Vec<String>,
    /// Directory names whose subtrees are skipped.
    pub skip_dirs: Vec<String>,
    pub max_depth: usize,
    pub parallelism: usize,
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub preferences_file: PathBuf,
    pub activity_log: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            tests_file: PathBuf::from("data").join("tests.json"),
            duplicates_file: PathBuf::from("data").join("duplicates.json"),
        }
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            search_debounce_ms: 300,
            prefetch_rows: 5,
        }
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["html".to_string()],
            ignore_files: vec!["index.html".to_string()],
            skip_dirs: vec!["node_modules".to_string()],
            max_depth: 32,
            parallelism: 4,
            follow_symlinks: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[IEC-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir.join(".config").join("iecat");
        let data = home_dir.join(".local").join("share").join("iecat");
        Self {
            config_file: cfg.join("config.toml"),
            preferences_file: cfg.join("filters.json"),
            activity_log: data.join("activity.jsonl"),
        }
    }
}

impl CatalogConfig {
    /// Absolute-or-root-relative path of the test list.
    #[must_use]
    pub fn tests_path(&self) -> PathBuf {
        self.root.join(&self.tests_file)
    }

    /// Absolute-or-root-relative path of the duplicate list.
    #[must_use]
    pub fn duplicates_path(&self) -> PathBuf {
        self.root.join(&self.duplicates_file)
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| CatalogError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(CatalogError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.normalize_paths();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for logging.
    ///
    /// FNV-1a over the canonical JSON, so the value is stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("IECAT_CATALOG_ROOT") {
            self.catalog.root = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("IECAT_BATCH_SIZE") {
            self.browse.batch_size = parse_env("IECAT_BATCH_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("IECAT_SEARCH_DEBOUNCE_MS") {
            self.browse.search_debounce_ms = parse_env("IECAT_SEARCH_DEBOUNCE_MS", &raw)?;
        }
        if let Some(raw) = lookup("IECAT_PREFETCH_ROWS") {
            self.browse.prefetch_rows = parse_env("IECAT_PREFETCH_ROWS", &raw)?;
        }
        if let Some(raw) = lookup("IECAT_BUILDER_PARALLELISM") {
            self.builder.parallelism = parse_env("IECAT_BUILDER_PARALLELISM", &raw)?;
        }
        if let Some(raw) = lookup("IECAT_PREFERENCES_FILE") {
            self.paths.preferences_file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("IECAT_ACTIVITY_LOG") {
            self.paths.activity_log = PathBuf::from(raw);
        }
        Ok(())
    }

    /// Normalize user-supplied lists for consistent matching.
    fn normalize_paths(&mut self) {
        for ext in &mut self.builder.extensions {
            *ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        }
        self.builder.extensions.retain(|ext| !ext.is_empty());

        let s = self.catalog.root.to_string_lossy();
        if s.len() > 1
            && let Some(stripped) = s.strip_suffix('/')
        {
            self.catalog.root = PathBuf::from(stripped);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.browse.batch_size == 0 {
            return Err(CatalogError::InvalidConfig {
                details: "browse.batch_size must be >= 1".to_string(),
            });
        }
        if self.browse.search_debounce_ms > MAX_SEARCH_DEBOUNCE_MS {
            return Err(CatalogError::InvalidConfig {
                details: format!(
                    "browse.search_debounce_ms must be <= {MAX_SEARCH_DEBOUNCE_MS}, got {}",
                    self.browse.search_debounce_ms
                ),
            });
        }
        if self.builder.parallelism == 0 {
            return Err(CatalogError::InvalidConfig {
                details: "builder.parallelism must be >= 1".to_string(),
            });
        }
        if self.builder.extensions.is_empty() {
            return Err(CatalogError::InvalidConfig {
                details: "builder.extensions must name at least one extension".to_string(),
            });
        }
        if self.catalog.tests_file.as_os_str().is_empty() {
            return Err(CatalogError::InvalidConfig {
                details: "catalog.tests_file must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|error| CatalogError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
