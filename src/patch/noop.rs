//! No-op patch engine for graceful degradation

use super::list::PatchRecord;
use super::traits::{PatchEngine, PatchedFile};
use async_trait::async_trait;
use std::path::Path;

/// Patch engine used when no patch tooling is configured
///
/// An empty record set is a successful no-op, so installations without
/// patches never need real patch tooling. Any declared record returns
/// `Error::NotSupported` instead of silently leaving manifest entries
/// unsatisfied.
///
/// # Examples
///
/// ```
/// use classpath_dl::patch::{NoOpPatchEngine, PatchEngine};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() {
/// let engine = NoOpPatchEngine;
///
/// // No records: nothing to do, nothing produced
/// let outputs = engine.apply_all(&[], None, Path::new("/srv")).await.unwrap();
/// assert!(outputs.is_empty());
/// # }
/// ```
pub struct NoOpPatchEngine;

#[async_trait]
impl PatchEngine for NoOpPatchEngine {
    async fn apply_all(
        &self,
        records: &[PatchRecord],
        _original: Option<&Path>,
        _output_root: &Path,
    ) -> crate::Result<Vec<PatchedFile>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        Err(crate::Error::NotSupported(format!(
            "{} patch record(s) declared but no patch engine is configured. \
             Provide a PatchEngine implementation to the downloader, or remove \
             the patch list.",
            records.len()
        )))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
