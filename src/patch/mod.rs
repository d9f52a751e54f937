//! Patch-produced artifact handling
//!
//! Some classpath entries are not downloaded at all: they are produced by
//! applying binary patches to files from the original base archive. This
//! module provides the record format declaring those outputs and a
//! trait-based seam for the external tool that actually applies them.
//!
//! ## Architecture
//!
//! The core abstraction is the [`PatchEngine`] trait. The acquisition engine
//! itself never applies a patch. It only reads [`PatchRecord`]s to know
//! which manifest entries will be produced (and therefore must not be
//! fetched), then hands the records to the configured engine once every
//! other entry is in place:
//!
//! - [`PatchEngine`]: applies records and reports materialized outputs
//! - [`NoOpPatchEngine`]: stands in when no patch tooling is configured,
//!   rejecting any non-empty record set

mod list;
mod noop;
mod traits;

pub use list::{parse_patch_list, produces, validate_against_manifests, PatchRecord};
pub use noop::NoOpPatchEngine;
pub use traits::{PatchEngine, PatchedFile};
