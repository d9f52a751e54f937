//! Core types used throughout classpath-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Classpath category a manifest entry belongs to
///
/// Categories are acquired concurrently but concatenate deterministically:
/// every versions entry precedes every libraries entry in the final classpath.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Server version artifacts, positioned first on the classpath
    Versions,
    /// Library artifacts, positioned after all versions entries
    Libraries,
}

impl Category {
    /// Directory name for this category under the output root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Versions => "versions",
            Category::Libraries => "libraries",
        }
    }

    /// Conventional manifest file name for this category
    pub fn manifest_name(&self) -> &'static str {
        match self {
            Category::Versions => "versions.list",
            Category::Libraries => "libraries.list",
        }
    }

    /// Parse a category from its directory name
    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "versions" => Some(Category::Versions),
            "libraries" => Some(Category::Libraries),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Which source tier satisfied a manifest entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Materialized later by the external patch engine
    Patch,
    /// Destination file already present with a matching digest
    Cache,
    /// Copied from the running bundle's embedded resources
    Embedded,
    /// Copied from the mounted original base archive
    Archive,
    /// Downloaded from a remote repository
    Repository,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceKind::Patch => "patch",
            SourceKind::Cache => "cache",
            SourceKind::Embedded => "embedded",
            SourceKind::Archive => "archive",
            SourceKind::Repository => "repository",
        };
        f.write_str(name)
    }
}

/// Event emitted during classpath acquisition
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AcquireEvent {
    /// An entry's acquisition task has started
    EntryStarted {
        /// Category the entry belongs to
        category: Category,
        /// Destination-relative path
        path: String,
        /// Entry id (coordinate or version identifier)
        id: String,
    },

    /// An entry resolved to an on-disk location
    EntryResolved {
        /// Category the entry belongs to
        category: Category,
        /// Destination-relative path
        path: String,
        /// Which source tier satisfied the entry
        source: SourceKind,
        /// Resolved on-disk location
        file: PathBuf,
        /// Repository id when the source was a remote repository
        #[serde(skip_serializing_if = "Option::is_none")]
        repository: Option<String>,
    },

    /// An entry exhausted every source
    EntryFailed {
        /// Category the entry belongs to
        category: Category,
        /// Destination-relative path
        path: String,
        /// Entry id (coordinate or version identifier)
        id: String,
        /// Rendered failure message including all attempted sources
        error: String,
    },

    /// Every entry in a category has been resolved
    CategoryResolved {
        /// The completed category
        category: Category,
        /// Number of resolved entries
        resolved: usize,
    },

    /// The external patch engine finished applying all patch records
    PatchesApplied {
        /// Number of patch records applied
        applied: usize,
    },
}
