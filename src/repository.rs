//! Remote repository model and fallback-chain ordering

use crate::config::RepositoryConfig;
use crate::coordinate::Coordinate;
use crate::error::{Error, Result};
use url::Url;

/// A remote Maven-layout repository
///
/// Immutable after construction; the base URL is always trailing-slash
/// normalized so relative joins never clobber the final path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Repository id, used in preferred-repository ordering and diagnostics
    pub id: String,
    /// Normalized base URL, always ending in `/`
    pub base_url: Url,
    /// Whether release artifacts may be fetched here
    pub releases: bool,
    /// Whether snapshot artifacts may be fetched here
    pub snapshots: bool,
}

impl Repository {
    /// Construct a repository, normalizing the base URL
    pub fn new(id: impl Into<String>, base_url: &str) -> Result<Self> {
        Self::with_policy(id, base_url, true, true)
    }

    /// Construct a repository with explicit release/snapshot policy
    pub fn with_policy(
        id: impl Into<String>,
        base_url: &str,
        releases: bool,
        snapshots: bool,
    ) -> Result<Self> {
        let id = id.into();
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| Error::Config {
            message: format!("repository {id} has an invalid url: {e}"),
            key: Some("repositories".to_string()),
        })?;

        Ok(Self {
            id,
            base_url,
            releases,
            snapshots,
        })
    }

    /// Whether this repository serves the given version kind
    pub fn supports(&self, snapshot: bool) -> bool {
        if snapshot { self.snapshots } else { self.releases }
    }

    /// Absolute URL for a repository-relative path
    pub fn url_for(&self, relative_path: &str) -> Result<Url> {
        self.base_url
            .join(relative_path.trim_start_matches('/'))
            .map_err(|e| Error::Config {
                message: format!(
                    "repository {} cannot address {relative_path:?}: {e}",
                    self.id
                ),
                key: None,
            })
    }
}

impl TryFrom<&RepositoryConfig> for Repository {
    type Error = Error;

    fn try_from(config: &RepositoryConfig) -> Result<Self> {
        Repository::with_policy(&config.id, &config.url, config.releases, config.snapshots)
    }
}

/// Order repositories for one coordinate's fallback chain
///
/// Preferred ids come first (in preferred order), then the remaining
/// repositories in declared order; repositories that do not serve the
/// coordinate's version kind are filtered out. Unknown preferred ids are
/// ignored.
pub fn candidates<'a>(
    repositories: &'a [Repository],
    preferred: &[String],
    coordinate: &Coordinate,
) -> Vec<&'a Repository> {
    let snapshot = coordinate.is_snapshot();
    let mut ordered: Vec<&Repository> = Vec::with_capacity(repositories.len());

    for id in preferred {
        if let Some(repository) = repositories.iter().find(|r| &r.id == id) {
            if repository.supports(snapshot) && !ordered.iter().any(|r| r.id == repository.id) {
                ordered.push(repository);
            }
        }
    }

    for repository in repositories {
        if repository.supports(snapshot) && !ordered.iter().any(|r| r.id == repository.id) {
            ordered.push(repository);
        }
    }

    ordered
}
