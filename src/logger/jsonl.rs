//! JSONL activity log: append-only line-delimited JSON.
//!
//! Each line is a self-contained JSON object, assembled in memory and written
//! with a single `write_all` so a concurrent `tail -f` never sees half a line.
//!
//! Four-level fallback chain:
//! 1. Primary file path
//! 2. Fallback path (temp dir by default)
//! 3. stderr with `[IEC-JSONL]` prefix
//! 4. Silent discard (browsing must never fail because logging did)

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions, rename};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::browse::filter::FilterState;
use crate::core::errors::{CatalogError, Result};

/// Severity level for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Activity event types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SessionStart,
    SessionStop,
    CatalogLoaded,
    CatalogLoadFailed,
    DuplicatesLoaded,
    FiltersApplied,
    PreferencesLoaded,
    PreferencesSaved,
    PreferencesFailed,
    RecordOpened,
    CatalogBuilt,
}

/// A single JSONL log entry. Only `ts`, `event` and `severity` are always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    /// File involved (data file, preference file, opened record).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Items produced by the action (visible rows, loaded records, groups).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Size of the population the count was taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    /// IEC error code if the action failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Freeform details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: format_utc_now(),
            event,
            severity,
            path: None,
            count: None,
            total: None,
            category: None,
            query: None,
            sort: None,
            duration_ms: None,
            ok: None,
            error_code: None,
            error_message: None,
            details: None,
        }
    }

    /// Failure entry carrying the error's stable code and message.
    pub fn failure(event: EventType, err: &CatalogError) -> Self {
        let mut entry = Self::new(event, Severity::Warning);
        entry.ok = Some(false);
        entry.error_code = Some(err.code().to_string());
        entry.error_message = Some(err.to_string());
        entry
    }

    #[must_use]
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_string_lossy().into_owned());
        self
    }

    #[must_use]
    pub fn with_counts(mut self, count: usize, total: usize) -> Self {
        self.count = Some(count as u64);
        self.total = Some(total as u64);
        self
    }

    /// Record the selection that produced this entry.
    #[must_use]
    pub fn with_filters(mut self, filters: &FilterState) -> Self {
        self.category = Some(filters.category.to_string());
        self.query = (!filters.query.is_empty()).then(|| filters.query.clone());
        self.sort = Some(filters.sort.as_str().to_string());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    #[must_use]
    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration_ms = Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Normal,
    Fallback,
    Stderr,
    Discard,
}

/// Configuration for the JSONL writer.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    pub path: PathBuf,
    pub fallback_path: Option<PathBuf>,
    /// Maximum file size before rotation (bytes). Default: 10 MiB.
    pub max_size_bytes: u64,
    /// Number of rotated files to keep. Default: 3.
    pub max_rotated_files: u32,
    /// Seconds between forced fsync calls. Default: 10.
    pub fsync_interval_secs: u64,
}

impl JsonlConfig {
    /// Config for a primary path with the temp-dir fallback.
    pub fn for_path(path: PathBuf) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }
}

impl Default for JsonlConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("activity.jsonl"),
            fallback_path: Some(std::env::temp_dir().join("iecat-activity.jsonl")),
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
            fsync_interval_secs: 10,
        }
    }
}

/// Append-only JSONL log writer with rotation and multi-level fallback.
pub struct JsonlWriter {
    config: JsonlConfig,
    writer: Option<BufWriter<File>>,
    state: WriterState,
    bytes_written: u64,
    last_fsync: SystemTime,
}

impl JsonlWriter {
    /// Open the JSONL log file. Falls through the degradation chain on failure.
    pub fn open(config: JsonlConfig) -> Self {
        let mut w = Self {
            config,
            writer: None,
            state: WriterState::Discard,
            bytes_written: 0,
            last_fsync: SystemTime::now(),
        };
        w.try_open_primary();
        w
    }

    /// A writer that drops everything. Used when logging is switched off.
    pub fn disabled() -> Self {
        Self {
            config: JsonlConfig {
                fallback_path: None,
                ..JsonlConfig::default()
            },
            writer: None,
            state: WriterState::Discard,
            bytes_written: 0,
            last_fsync: SystemTime::now(),
        }
    }

    /// Write a single log entry as one atomic JSONL line.
    pub fn write_entry(&mut self, entry: &LogEntry) {
        let line = match serde_json::to_string(entry) {
            Ok(json) => format!("{json}\n"),
            Err(e) => {
                let _ = writeln!(io::stderr(), "[IEC-JSONL] serialize error: {e}");
                return;
            }
        };

        self.write_line(&line);
    }

    pub fn flush(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
        }
    }

    pub fn fsync(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
            let _ = w.get_ref().sync_data();
            self.last_fsync = SystemTime::now();
        }
    }

    /// Current degradation state.
    pub fn state(&self) -> &str {
        match self.state {
            WriterState::Normal => "normal",
            WriterState::Fallback => "fallback",
            WriterState::Stderr => "stderr",
            WriterState::Discard => "discard",
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn write_line(&mut self, line: &str) {
        if self.bytes_written + line.len() as u64 > self.config.max_size_bytes
            && matches!(self.state, WriterState::Normal | WriterState::Fallback)
        {
            self.rotate();
        }

        match self.state {
            WriterState::Normal | WriterState::Fallback => {
                if let Some(w) = self.writer.as_mut() {
                    if w.write_all(line.as_bytes()).is_err() {
                        self.degrade();
                        self.write_line(line);
                        return;
                    }
                    self.bytes_written += line.len() as u64;
                    self.maybe_fsync();
                } else {
                    self.degrade();
                    self.write_line(line);
                }
            }
            WriterState::Stderr => {
                let _ = write!(io::stderr(), "[IEC-JSONL] {line}");
            }
            WriterState::Discard => {}
        }
    }

    fn maybe_fsync(&mut self) {
        let elapsed = SystemTime::now()
            .duration_since(self.last_fsync)
            .unwrap_or(Duration::ZERO);
        if elapsed.as_secs() >= self.config.fsync_interval_secs {
            self.fsync();
        }
    }

    fn try_open_primary(&mut self) {
        match open_append(&self.config.path) {
            Ok((file, size)) => {
                self.writer = Some(BufWriter::with_capacity(16 * 1024, file));
                self.state = WriterState::Normal;
                self.bytes_written = size;
            }
            Err(_) => self.try_open_fallback(),
        }
    }

    fn try_open_fallback(&mut self) {
        let Some(fb) = &self.config.fallback_path else {
            self.state = WriterState::Stderr;
            return;
        };
        match open_append(fb) {
            Ok((file, size)) => {
                self.writer = Some(BufWriter::with_capacity(16 * 1024, file));
                self.state = WriterState::Fallback;
                self.bytes_written = size;
            }
            Err(_) => {
                self.state = WriterState::Stderr;
            }
        }
    }

    fn degrade(&mut self) {
        self.writer = None;
        match self.state {
            WriterState::Normal => self.try_open_fallback(),
            WriterState::Fallback => self.state = WriterState::Stderr,
            WriterState::Stderr => self.state = WriterState::Discard,
            WriterState::Discard => {}
        }
    }

    fn rotate(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
        }
        self.writer = None;

        let base = match self.state {
            WriterState::Normal => self.config.path.clone(),
            WriterState::Fallback => match &self.config.fallback_path {
                Some(p) => p.clone(),
                None => return,
            },
            _ => return,
        };

        // .2 -> .3, .1 -> .2, current -> .1
        for i in (1..self.config.max_rotated_files).rev() {
            let _ = rename(rotated_name(&base, i), rotated_name(&base, i + 1));
        }
        let _ = rename(&base, rotated_name(&base, 1));

        match open_append(&base) {
            Ok((file, _)) => {
                self.writer = Some(BufWriter::with_capacity(16 * 1024, file));
                self.bytes_written = 0;
            }
            Err(_) => self.degrade(),
        }
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Open or create a file for appending. Returns `(File, current_size)`.
fn open_append(path: &Path) -> Result<(File, u64)> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| CatalogError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| CatalogError::io(path, source))?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((file, size))
}

/// `foo.jsonl` → `foo.jsonl.3`.
fn rotated_name(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_at(path: PathBuf) -> JsonlConfig {
        JsonlConfig {
            path,
            fallback_path: None,
            max_size_bytes: 1024 * 1024,
            max_rotated_files: 3,
            fsync_interval_secs: 60,
        }
    }

    #[test]
    fn write_entry_produces_valid_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        let mut writer = JsonlWriter::open(config_at(path.clone()));

        writer.write_entry(&LogEntry::new(EventType::SessionStart, Severity::Info));
        writer.flush();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["event"], "session_start");
        assert_eq!(parsed["severity"], "info");
    }

    #[test]
    fn builder_helpers_fill_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        let mut writer = JsonlWriter::open(config_at(path.clone()));

        let entry = LogEntry::new(EventType::CatalogLoaded, Severity::Info)
            .with_path("data/tests.json")
            .with_counts(12, 12)
            .with_duration(Duration::from_millis(7));
        writer.write_entry(&entry);
        writer.flush();

        let parsed: serde_json::Value =
            serde_json::from_str(fs::read_to_string(&path).unwrap().trim()).unwrap();
        assert_eq!(parsed["path"], "data/tests.json");
        assert_eq!(parsed["count"], 12);
        assert_eq!(parsed["total"], 12);
        assert_eq!(parsed["duration_ms"], 7);
    }

    #[test]
    fn failure_entry_carries_error_code() {
        let err = CatalogError::LoadFailed {
            path: PathBuf::from("data/tests.json"),
            details: "missing".to_string(),
        };
        let entry = LogEntry::failure(EventType::CatalogLoadFailed, &err);
        assert_eq!(entry.error_code.as_deref(), Some("IEC-2001"));
        assert_eq!(entry.ok, Some(false));
        assert_eq!(entry.severity, Severity::Warning);
    }

    #[test]
    fn rotation_shifts_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rot.jsonl");
        let mut config = config_at(path.clone());
        config.max_size_bytes = 100;
        let mut writer = JsonlWriter::open(config);

        for _ in 0..10 {
            writer.write_entry(&LogEntry::new(EventType::FiltersApplied, Severity::Info));
        }
        writer.flush();

        assert!(path.exists());
        assert!(rotated_name(&path, 1).exists());
    }

    #[test]
    fn fallback_when_primary_dir_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();
        let fallback = dir.path().join("fallback.jsonl");
        let config = JsonlConfig {
            path: blocker.join("activity.jsonl"),
            fallback_path: Some(fallback.clone()),
            max_size_bytes: 1024 * 1024,
            max_rotated_files: 3,
            fsync_interval_secs: 60,
        };
        let mut writer = JsonlWriter::open(config);

        assert_eq!(writer.state(), "fallback");
        writer.write_entry(&LogEntry::new(EventType::PreferencesFailed, Severity::Warning));
        writer.flush();

        assert!(!fs::read_to_string(&fallback).unwrap().is_empty());
    }

    #[test]
    fn event_names_are_snake_case() {
        let names: Vec<String> = [
            EventType::SessionStart,
            EventType::CatalogLoadFailed,
            EventType::PreferencesFailed,
            EventType::RecordOpened,
            EventType::CatalogBuilt,
        ]
        .iter()
        .map(|event| serde_json::to_string(event).unwrap())
        .collect();
        assert_eq!(
            names,
            [
                "\"session_start\"",
                "\"catalog_load_failed\"",
                "\"preferences_failed\"",
                "\"record_opened\"",
                "\"catalog_built\"",
            ]
        );
        assert!(serde_json::from_str::<EventType>("\"error\"").is_err());
    }

    #[test]
    fn disabled_writer_discards() {
        let mut writer = JsonlWriter::disabled();
        assert_eq!(writer.state(), "discard");
        writer.write_entry(&LogEntry::new(EventType::SessionStop, Severity::Info));
        assert_eq!(writer.bytes_written(), 0);
    }

    #[test]
    fn entry_optional_fields_omitted_when_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparse.jsonl");
        let mut writer = JsonlWriter::open(config_at(path.clone()));

        writer.write_entry(&LogEntry::new(EventType::SessionStart, Severity::Info));
        writer.flush();

        let line = fs::read_to_string(&path).unwrap();
        assert!(!line.contains("\"path\""));
        assert!(!line.contains("\"count\""));
        assert!(!line.contains("\"query\""));
    }
}
