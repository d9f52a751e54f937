//! Embedded resource bundles and archived originals
//!
//! The two acquisition sources that serve artifact bytes without touching the
//! network. A resource bundle mirrors the destination layout under a
//! configurable prefix (`META-INF/libraries/com/example/...`); the original
//! distribution archive carries the same relative paths inside a zip. Both
//! are read synchronously and callers wrap access in `spawn_blocking`.

use crate::error::Result;
use crate::types::Category;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Read-only source of embedded resources addressed by bundle-relative path
///
/// Lookup misses are `Ok(None)`; only genuine read failures error. Paths use
/// forward slashes regardless of platform.
pub trait ResourceBundle: Send + Sync {
    /// Read the resource at `path`, or `None` when the bundle does not carry it
    fn read(&self, path: &str) -> std::io::Result<Option<Vec<u8>>>;
}

/// Bundle path for a manifest entry: `prefix/category-dir/entry-path`
///
/// An empty prefix collapses to `category-dir/entry-path`.
pub fn resource_path(prefix: &str, category: Category, path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let path = path.trim_start_matches('/');
    if prefix.is_empty() {
        format!("{}/{}", category.dir_name(), path)
    } else {
        format!("{}/{}/{}", prefix, category.dir_name(), path)
    }
}

/// Resource bundle backed by a plain directory tree
#[derive(Debug, Clone)]
pub struct DirResourceBundle {
    root: PathBuf,
}

impl DirResourceBundle {
    /// Serve resources from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceBundle for DirResourceBundle {
    fn read(&self, path: &str) -> std::io::Result<Option<Vec<u8>>> {
        // refuse traversal segments rather than resolving outside the root
        if Path::new(path)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Ok(None);
        }

        match std::fs::read(self.root.join(path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// The original distribution archive, opened once and read entry by entry
///
/// The zip central directory is parsed at open time; individual entries are
/// decompressed on demand under an interior lock, so one handle serves every
/// concurrent acquisition task. Dropping the final clone releases the file
/// handle, which must happen before a patch engine rewrites the archive's
/// own directory.
pub struct OriginalArchive {
    path: PathBuf,
    archive: Mutex<zip::ZipArchive<std::fs::File>>,
}

impl OriginalArchive {
    /// Open the archive at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let archive = zip::ZipArchive::new(file)?;
        Ok(Self {
            path: path.to_path_buf(),
            archive: Mutex::new(archive),
        })
    }

    /// Filesystem location this archive was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the entry at `path`, or `None` when the archive does not carry it
    pub fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let mut archive = match self.archive.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match archive.by_name(path) {
            Ok(mut entry) => {
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut bytes)?;
                Ok(Some(bytes))
            }
            Err(zip::result::ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for OriginalArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginalArchive")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
