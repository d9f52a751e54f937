//! Configuration types for classpath-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Remote repository declaration
///
/// Repositories form an ordered fallback chain: the first-listed repository is
/// tried first unless `preferred_repositories` reorders the chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositoryConfig {
    /// Repository id, referenced by `preferred_repositories`
    pub id: String,

    /// Base URL of the repository root
    pub url: String,

    /// Whether release artifacts may be fetched from this repository
    #[serde(default = "default_true")]
    pub releases: bool,

    /// Whether snapshot artifacts may be fetched from this repository
    #[serde(default = "default_true")]
    pub snapshots: bool,
}

impl RepositoryConfig {
    /// Maven Central, the out-of-the-box default repository
    pub fn maven_central() -> Self {
        Self {
            id: "central".to_string(),
            url: "https://repo.maven.apache.org/maven2/".to_string(),
            releases: true,
            snapshots: false,
        }
    }
}

/// Acquisition behavior settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcquireConfig {
    /// Maximum number of entries acquired concurrently (default: 8)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_fetches: usize,

    /// Overwrite an existing output file on standalone downloads (default: false)
    ///
    /// Manifest-driven acquisition ignores this: a destination that failed its
    /// digest check is always replaced.
    #[serde(default)]
    pub overwrite: bool,

    /// Keep trying later repositories after one fails (default: true)
    ///
    /// When false, the first failed repository attempt fails the entry.
    #[serde(default = "default_true")]
    pub try_all_repositories: bool,

    /// Repository ids to try before the declared order
    ///
    /// Ids not matching any configured repository are ignored.
    #[serde(default)]
    pub preferred_repositories: Vec<String>,

    /// Create missing parent directories for destination files (default: true)
    #[serde(default = "default_true")]
    pub create_directories: bool,

    /// Retry a failed download with a jar extension when the inferred
    /// packaging maps to something else (default: true)
    #[serde(default = "default_true")]
    pub fallback_to_jar: bool,

    /// Resource prefix for the embedded and archived source tiers
    /// (default: "META-INF"; entries are looked up at `prefix/category/path`)
    #[serde(default = "default_resource_prefix")]
    pub resource_prefix: String,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent(),
            overwrite: false,
            try_all_repositories: true,
            preferred_repositories: Vec::new(),
            create_directories: true,
            fallback_to_jar: true,
            resource_prefix: default_resource_prefix(),
        }
    }
}

/// Network settings for repository access
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    /// Connect timeout in seconds (default: 10)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Per-request timeout in seconds (default: 30)
    ///
    /// Applies to each individual metadata fetch or artifact transfer, never
    /// to the aggregate acquisition operation.
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Top-level configuration for a [`ClasspathDownloader`](crate::ClasspathDownloader)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Ordered remote repository fallback chain (default: Maven Central)
    #[serde(default = "default_repositories")]
    pub repositories: Vec<RepositoryConfig>,

    /// Acquisition behavior settings
    #[serde(flatten)]
    pub acquire: AcquireConfig,

    /// Network settings
    #[serde(flatten)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repositories: default_repositories(),
            acquire: AcquireConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Validate the configuration, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.acquire.max_concurrent_fetches == 0 {
            return Err(Error::Config {
                message: "max_concurrent_fetches must be at least 1".to_string(),
                key: Some("max_concurrent_fetches".to_string()),
            });
        }

        let mut seen = HashSet::new();
        for repository in &self.repositories {
            if repository.id.is_empty() {
                return Err(Error::Config {
                    message: format!("repository {} has an empty id", repository.url),
                    key: Some("repositories".to_string()),
                });
            }
            if !seen.insert(repository.id.as_str()) {
                return Err(Error::Config {
                    message: format!("duplicate repository id {:?}", repository.id),
                    key: Some("repositories".to_string()),
                });
            }
            if let Err(e) = url::Url::parse(&repository.url) {
                return Err(Error::Config {
                    message: format!("repository {} has an invalid url: {}", repository.id, e),
                    key: Some("repositories".to_string()),
                });
            }
        }

        Ok(())
    }
}

fn default_repositories() -> Vec<RepositoryConfig> {
    vec![RepositoryConfig::maven_central()]
}

fn default_max_concurrent() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_resource_prefix() -> String {
    "META-INF".to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("classpath-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

// Duration serialization helper: seconds as integers
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
