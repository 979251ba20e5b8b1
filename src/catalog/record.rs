//! Catalog data model: test records, categories, duplicate groups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Exam skill a test document belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Reading,
    Listening,
    Writing,
    /// Anything else, including missing or unknown category strings.
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 4] = [Self::Reading, Self::Listening, Self::Writing, Self::Other];

    /// Wire name as stored in `tests.json`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::Listening => "listening",
            Self::Writing => "writing",
            Self::Other => "other",
        }
    }

    /// Row metadata label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Reading => "📘 Reading",
            Self::Listening => "🎧 Listening",
            Self::Writing => "✍️ Writing",
            Self::Other => "📄 Other document",
        }
    }

    /// Short capitalized name for chips and stats cards.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Reading => "Reading",
            Self::Listening => "Listening",
            Self::Writing => "Writing",
            Self::Other => "Other",
        }
    }

    /// Guess the category from a source file name.
    ///
    /// Listening wins over reading, which wins over writing, so a file called
    /// `listening-and-reading.html` counts as listening.
    #[must_use]
    pub fn detect(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.contains("listening") {
            Self::Listening
        } else if lower.contains("reading") {
            Self::Reading
        } else if lower.contains("writing") {
            Self::Writing
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reading" => Ok(Self::Reading),
            "listening" => Ok(Self::Listening),
            "writing" => Ok(Self::Writing),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// One test document in the catalog. Identity is `file`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Path relative to the site root, `/`-separated.
    pub file: String,
    pub title: String,
    #[serde(default)]
    pub category: Category,
    /// Content hash written by the builder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Modification time in seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<f64>,
}

impl TestRecord {
    /// Record with only the fields the browser needs.
    pub fn new(file: impl Into<String>, title: impl Into<String>, category: Category) -> Self {
        Self {
            file: file.into(),
            title: title.into(),
            category,
            hash: None,
            size: None,
            modified: None,
        }
    }
}

/// Files that share identical content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub hash: String,
    pub files: Vec<String>,
}
