//! Error types for classpath-dl
//!
//! This module provides the error handling surface for the library, including:
//! - Domain-specific error types (manifest, coordinate, transfer, descriptor)
//! - Per-entry acquisition failures that aggregate every attempted source
//! - A crate-wide [`Result`] alias

use crate::types::Category;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for classpath-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for classpath-dl
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "repositories")
        key: Option<String>,
    },

    /// Manifest line does not have the expected tab-separated field count
    #[error("malformed manifest line {line}: expected {expected} tab-separated fields, found {fields} in {content:?}")]
    MalformedManifest {
        /// 1-based line number of the offending record
        line: usize,
        /// Number of fields the record format requires
        expected: usize,
        /// Number of fields actually present on the line
        fields: usize,
        /// The offending line content
        content: String,
    },

    /// Manifest hash field is not valid hex
    #[error("invalid content hash on manifest line {line}: {reason}")]
    InvalidHash {
        /// 1-based line number of the offending record
        line: usize,
        /// Why the hex decode was rejected (odd length, non-hex character)
        reason: String,
    },

    /// Coordinate string could not be parsed
    #[error("invalid coordinate {coordinate:?}: {reason}")]
    InvalidCoordinate {
        /// The coordinate string as given
        coordinate: String,
        /// Why parsing was rejected
        reason: String,
    },

    /// A declared patch output has no corresponding manifest entry
    #[error("patch output {path:?} in category {category} has no matching manifest entry")]
    PatchTargetMissing {
        /// Category the patch record targets
        category: Category,
        /// The declared output path that nothing in the manifest expects
        path: String,
    },

    /// Patch application failed
    #[error("patch error: {0}")]
    Patch(String),

    /// Remote descriptor could not be fetched or parsed
    #[error("descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// File transfer failed
    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// One or more manifest entries exhausted every source
    #[error("{0}")]
    Acquire(#[from] AcquireFailed),

    /// Every candidate repository failed for a standalone download
    #[error("{0}")]
    Resolution(#[from] ResolutionExhausted),

    /// Archived original artifact could not be read
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Operation not supported (no patch engine configured, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors fetching or parsing remote repository metadata
///
/// These are non-fatal during acquisition: the resolver logs them, records the
/// attempt, and proceeds with defaults (declared version, jar packaging).
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Metadata or descriptor endpoint returned a non-success status
    #[error("descriptor fetch from {url} returned HTTP {status}")]
    Status {
        /// The descriptor URL that was queried
        url: String,
        /// The HTTP status code received
        status: u16,
    },

    /// Request to the descriptor endpoint failed
    #[error("descriptor fetch from {url} failed: {source}")]
    Fetch {
        /// The descriptor URL that was queried
        url: String,
        /// The underlying request error
        #[source]
        source: reqwest::Error,
    },

    /// Descriptor body was not parseable XML
    #[error("descriptor parse failed: {0}")]
    Parse(String),
}

/// Errors moving bytes onto disk
#[derive(Debug, Error)]
pub enum TransferError {
    /// Remote endpoint returned a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        /// The URL that was requested
        url: String,
        /// The HTTP status code received
        status: u16,
    },

    /// The request itself failed (connect, timeout, body read)
    #[error("request to {url} failed: {source}")]
    Request {
        /// The URL that was requested
        url: String,
        /// The underlying request error
        #[source]
        source: reqwest::Error,
    },

    /// Writing the destination file failed
    #[error("writing {path:?} failed: {source}")]
    Write {
        /// The destination path being written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Downloaded content does not match the expected digest
    #[error("digest mismatch for {path:?}: expected {expected}, got {actual}")]
    DigestMismatch {
        /// The file whose content was verified
        path: PathBuf,
        /// Expected digest, hex-encoded
        expected: String,
        /// Computed digest, hex-encoded
        actual: String,
    },
}

/// One failed attempt against one source during acquisition
#[derive(Debug, Clone)]
pub struct SourceAttempt {
    /// Which source was attempted (e.g., "repository central (https://…)")
    pub source: String,
    /// The error that attempt produced
    pub error: String,
}

impl SourceAttempt {
    /// Record an attempt against a named source
    pub fn new(source: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            source: source.into(),
            error: error.to_string(),
        }
    }
}

impl std::fmt::Display for SourceAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// All sources exhausted for a single manifest entry
///
/// Carries the ordered list of every attempted source with its individual
/// error message, so a failed run is diagnosable without re-running.
#[derive(Debug, Clone, Error)]
#[error("all sources exhausted for {id}: {}", render_attempts(.attempts))]
pub struct EntryFailure {
    /// Category the entry belongs to
    pub category: Category,
    /// The entry id (coordinate or version identifier)
    pub id: String,
    /// The entry's destination-relative path
    pub path: String,
    /// Every attempted source, in attempt order, with its error
    pub attempts: Vec<SourceAttempt>,
}

/// The overall acquisition operation failed
///
/// Raised only after every in-flight task has been awaited, so it carries the
/// failure of every broken entry rather than just the first.
#[derive(Debug, Error)]
#[error("acquisition failed for {} entry(ies):{}", .failures.len(), render_failures(.failures))]
pub struct AcquireFailed {
    /// Per-entry failures, in task issue order
    pub failures: Vec<EntryFailure>,
}

/// Every candidate repository was attempted without success
///
/// Standalone downloads surface this directly; manifest-driven acquisition
/// folds the attempts into the owning entry's failure report instead.
#[derive(Debug, Clone, Error)]
#[error("no repository could provide {coordinate}: {}", render_attempts(.attempts))]
pub struct ResolutionExhausted {
    /// The coordinate being resolved
    pub coordinate: String,
    /// Every attempted repository, in attempt order, with its error
    pub attempts: Vec<SourceAttempt>,
}

fn render_attempts(attempts: &[SourceAttempt]) -> String {
    if attempts.is_empty() {
        return "no sources were available".to_string();
    }
    attempts
        .iter()
        .map(SourceAttempt::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn render_failures(failures: &[EntryFailure]) -> String {
    failures.iter().fold(String::new(), |mut out, failure| {
        out.push_str("\n  ");
        out.push_str(&failure.category.to_string());
        out.push('/');
        out.push_str(&failure.path);
        out.push_str(": ");
        out.push_str(&failure.to_string());
        out
    })
}
