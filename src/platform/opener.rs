//! Hand a document to the system viewer.

#![allow(missing_docs)]

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use parking_lot::Mutex;

use crate::core::errors::{CatalogError, Result};

/// Environment variable naming a program to use instead of the platform default.
pub const OPENER_ENV: &str = "IECAT_OPENER";

/// Opens a file outside the browser process.
pub trait Opener: Send + Sync {
    fn open(&self, path: &Path) -> Result<()>;
    fn name(&self) -> &str;
}

/// Runs `<program> [args..] <path>` without waiting for it to exit.
#[derive(Debug, Clone)]
pub struct CommandOpener {
    program: String,
    args: Vec<String>,
}

impl CommandOpener {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Platform default viewer launcher.
    #[must_use]
    pub fn system() -> Self {
        #[cfg(target_os = "macos")]
        {
            Self::new("open", Vec::new())
        }
        #[cfg(target_os = "windows")]
        {
            Self::new(
                "cmd",
                vec!["/C".to_string(), "start".to_string(), String::new()],
            )
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            Self::new("xdg-open", Vec::new())
        }
    }
}

impl Opener for CommandOpener {
    fn open(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(CatalogError::OpenFailed {
                path: path.to_path_buf(),
                details: "file does not exist".to_string(),
            });
        }
        Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|e| CatalogError::OpenFailed {
                path: path.to_path_buf(),
                details: format!("{}: {e}", self.program),
            })
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Records requests instead of launching anything. For tests.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<PathBuf>>,
}

impl RecordingOpener {
    #[must_use]
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().clone()
    }
}

impl Opener for RecordingOpener {
    fn open(&self, path: &Path) -> Result<()> {
        self.opened.lock().push(path.to_path_buf());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// `IECAT_OPENER` if set and non-empty, else the platform launcher.
#[must_use]
pub fn detect_opener() -> Box<dyn Opener> {
    match env::var(OPENER_ENV) {
        Ok(program) if !program.trim().is_empty() => {
            Box::new(CommandOpener::new(program.trim(), Vec::new()))
        }
        _ => Box::new(CommandOpener::system()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_fails_before_spawning() {
        let tmp = tempfile::tempdir().unwrap();
        let opener = CommandOpener::new("definitely-not-a-real-program", Vec::new());
        let err = opener.open(&tmp.path().join("gone.html")).unwrap_err();
        assert_eq!(err.code(), "IEC-3004");
    }

    #[test]
    fn unknown_program_is_open_failed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Reading 1.html");
        std::fs::write(&path, "x").unwrap();
        let opener = CommandOpener::new("definitely-not-a-real-program-iecat", Vec::new());
        let err = opener.open(&path).unwrap_err();
        assert_eq!(err.code(), "IEC-3004");
    }

    #[test]
    fn recording_opener_keeps_history() {
        let opener = RecordingOpener::default();
        opener.open(Path::new("a.html")).unwrap();
        opener.open(Path::new("b.html")).unwrap();
        assert_eq!(
            opener.opened(),
            vec![PathBuf::from("a.html"), PathBuf::from("b.html")]
        );
    }
}
