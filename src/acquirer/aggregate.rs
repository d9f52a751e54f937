//! Order-preserving classpath aggregation
//!
//! Resolved locations land here as tasks finish, in whatever order the
//! network dictates, but iteration order is always the declared manifest
//! order. The layout is pre-sized from the manifests at construction and
//! shared behind a single lock; the orchestrator reads it only after every
//! task has been awaited.

use crate::manifest::ManifestEntry;
use crate::types::Category;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolved locations for one category, iterated in manifest order
#[derive(Debug, Clone, Default)]
struct CategoryLayout {
    order: Vec<String>,
    files: HashMap<String, PathBuf>,
}

impl CategoryLayout {
    fn for_manifest(entries: &[ManifestEntry]) -> Self {
        Self {
            order: entries.iter().map(|entry| entry.path.clone()).collect(),
            files: HashMap::with_capacity(entries.len()),
        }
    }
}

/// Resolved on-disk locations for both manifest categories
///
/// `classpath()` concatenates versions before libraries, each in manifest
/// order; task completion order never leaks into the result.
#[derive(Debug, Clone)]
pub struct ClasspathLayout {
    versions: CategoryLayout,
    libraries: CategoryLayout,
}

impl ClasspathLayout {
    /// Lay out the aggregate for two parsed manifests
    pub fn for_manifests(versions: &[ManifestEntry], libraries: &[ManifestEntry]) -> Self {
        Self {
            versions: CategoryLayout::for_manifest(versions),
            libraries: CategoryLayout::for_manifest(libraries),
        }
    }

    fn category(&self, category: Category) -> &CategoryLayout {
        match category {
            Category::Versions => &self.versions,
            Category::Libraries => &self.libraries,
        }
    }

    fn category_mut(&mut self, category: Category) -> &mut CategoryLayout {
        match category {
            Category::Versions => &mut self.versions,
            Category::Libraries => &mut self.libraries,
        }
    }

    /// Record the resolved location for one entry path
    pub fn insert(&mut self, category: Category, path: impl Into<String>, file: PathBuf) {
        self.category_mut(category).files.insert(path.into(), file);
    }

    /// Resolved location for an entry path, if any
    pub fn get(&self, category: Category, path: &str) -> Option<&Path> {
        self.category(category).files.get(path).map(PathBuf::as_path)
    }

    /// Number of entries resolved so far in a category
    pub fn resolved(&self, category: Category) -> usize {
        self.category(category).files.len()
    }

    /// Manifest paths with no resolved location, in manifest order
    pub fn missing(&self) -> Vec<(Category, String)> {
        let mut missing = Vec::new();
        for category in [Category::Versions, Category::Libraries] {
            let layout = self.category(category);
            for path in &layout.order {
                if !layout.files.contains_key(path) {
                    missing.push((category, path.clone()));
                }
            }
        }
        missing
    }

    /// The final ordered classpath: versions first, then libraries
    ///
    /// Unresolved entries are skipped, so callers wanting a guarantee of
    /// completeness check [`missing`](Self::missing) first.
    pub fn classpath(&self) -> Vec<PathBuf> {
        let mut classpath =
            Vec::with_capacity(self.versions.order.len() + self.libraries.order.len());
        for layout in [&self.versions, &self.libraries] {
            for path in &layout.order {
                if let Some(file) = layout.files.get(path) {
                    classpath.push(file.clone());
                }
            }
        }
        classpath
    }
}
