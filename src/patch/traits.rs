//! Traits and types for external patch application

use crate::error::Result;
use crate::types::Category;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::list::PatchRecord;

/// One patch output materialized on disk
#[must_use]
#[derive(Debug, Clone)]
pub struct PatchedFile {
    /// Category the output belongs to
    pub category: Category,
    /// Destination-relative path below the category directory
    pub path: String,
    /// Absolute location of the materialized file
    pub file: PathBuf,
}

/// Trait for applying binary patch records
///
/// Patch application is delegated: the acquisition engine only reads records
/// to know which manifest entries a patch will produce (and therefore must
/// not be fetched), then invokes the configured engine once after every other
/// entry is in place. Implementations read original inputs (typically from
/// the base archive), apply their patch format, and report every materialized
/// output so the engine can map the results into the classpath.
#[async_trait]
pub trait PatchEngine: Send + Sync {
    /// Apply every record, materializing outputs under `output_root`
    ///
    /// Each record's output belongs at `output_root/<category>/<output
    /// path>`, the same layout acquired entries land in. `original` is the
    /// location of the base archive when one was provided; by the time this
    /// runs no acquisition task holds it open, so the implementation may
    /// reopen or even rewrite it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An original input or patch file cannot be read
    /// - Applying a patch fails or its output digest does not match
    /// - The operation is not supported (for the no-op implementation)
    async fn apply_all(
        &self,
        records: &[PatchRecord],
        original: Option<&Path>,
        output_root: &Path,
    ) -> Result<Vec<PatchedFile>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
