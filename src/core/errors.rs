//! IEC-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Top-level error type for the catalog library.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("[IEC-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[IEC-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[IEC-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[IEC-2001] failed to load {path}: {details}")]
    LoadFailed { path: PathBuf, details: String },

    #[error("[IEC-2002] malformed catalog data in {path}: {details}")]
    CatalogDecode { path: PathBuf, details: String },

    #[error("[IEC-2003] no source documents found under {root}")]
    NoSourceFiles { root: PathBuf },

    #[error("[IEC-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[IEC-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[IEC-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[IEC-3004] could not open {path} in the system viewer: {details}")]
    OpenFailed { path: PathBuf, details: String },

    #[error("[IEC-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl CatalogError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "IEC-1001",
            Self::MissingConfig { .. } => "IEC-1002",
            Self::ConfigParse { .. } => "IEC-1003",
            Self::LoadFailed { .. } => "IEC-2001",
            Self::CatalogDecode { .. } => "IEC-2002",
            Self::NoSourceFiles { .. } => "IEC-2003",
            Self::Serialization { .. } => "IEC-2101",
            Self::Io { .. } => "IEC-3002",
            Self::ChannelClosed { .. } => "IEC-3003",
            Self::OpenFailed { .. } => "IEC-3004",
            Self::Runtime { .. } => "IEC-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// Nothing retries automatically; the browser uses this to decide whether
    /// to advertise the manual reload key.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LoadFailed { .. }
                | Self::Io { .. }
                | Self::ChannelClosed { .. }
                | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
