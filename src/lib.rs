//! # classpath-dl
//!
//! Manifest-driven classpath preparation and Maven artifact acquisition
//! library.
//!
//! Two manifests (versions and libraries) declare which files must exist,
//! with which SHA-256 digest, at which relative path. The engine acquires
//! every entry concurrently, trying sources in a fixed order - an existing
//! digest-valid file, an embedded resource bundle, the original
//! distribution archive, then remote Maven repositories - and returns the
//! resolved locations as an ordered classpath layout.
//!
//! ## Design Philosophy
//!
//! classpath-dl is designed to be:
//! - **Manifest-driven** - Declared hashes decide what is fetched; nothing
//!   is trusted until its digest matches
//! - **Sensible defaults** - Maven Central, bounded concurrency and snapshot
//!   resolution work out of the box with zero configuration
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use classpath_dl::{AcquireRequest, ClasspathDownloader, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ClasspathDownloader::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let versions = classpath_dl::parse_manifest(&std::fs::read_to_string("versions.list")?)?;
//!     let libraries = classpath_dl::parse_manifest(&std::fs::read_to_string("libraries.list")?)?;
//!
//!     let layout = downloader
//!         .acquire(AcquireRequest::new("classpath", versions, libraries))
//!         .await?;
//!
//!     for file in layout.classpath() {
//!         println!("{}", file.display());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Acquisition engine, per-entry tasks and the classpath layout
pub mod acquirer;
/// Base artifact download context
pub mod base;
/// Embedded resource bundles and the archived original
pub mod bundle;
/// Configuration types
pub mod config;
/// Maven coordinates, snapshot versions and file name derivation
pub mod coordinate;
/// Repository metadata and project descriptor parsing
pub mod descriptor;
/// Error types
pub mod error;
/// SHA-256 digests and file validation
pub mod integrity;
/// Manifest parsing and serialization
pub mod manifest;
/// Patch records and the patch engine seam
pub mod patch;
/// Remote repositories and candidate ordering
pub mod repository;
/// Coordinate resolution against the repository chain
pub mod resolver;
/// Streamed downloads and byte-exact writes
pub mod transfer;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use acquirer::{AcquireRequest, ClasspathDownloader, ClasspathLayout};
pub use base::BaseArtifact;
pub use bundle::{DirResourceBundle, OriginalArchive, ResourceBundle};
pub use config::{AcquireConfig, Config, HttpConfig, RepositoryConfig};
pub use coordinate::{Coordinate, ResolvedCoordinate, SnapshotVersion};
pub use error::{
    AcquireFailed, DescriptorError, EntryFailure, Error, ResolutionExhausted, Result,
    SourceAttempt, TransferError,
};
pub use manifest::{ManifestEntry, parse_manifest, serialize_manifest};
pub use patch::{NoOpPatchEngine, PatchEngine, PatchRecord, PatchedFile, parse_patch_list};
pub use resolver::{Download, RepositoryResolver, ResolverOptions};
pub use types::{AcquireEvent, Category, SourceKind};
