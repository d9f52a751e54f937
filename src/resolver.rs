//! Remote repository resolution and artifact download
//!
//! Walks the configured repository chain for one coordinate: resolve the
//! snapshot build from repository metadata, infer packaging and classifier
//! from the project descriptor when the coordinate declares none, download
//! the artifact, verify its digest. Every failed repository attempt is
//! recorded so an exhaustion report reads like a transcript of what was
//! tried.

use crate::config::Config;
use crate::coordinate::{Coordinate, ResolvedCoordinate, SnapshotVersion};
use crate::descriptor::{self, DescriptorInference};
use crate::error::{ResolutionExhausted, Result, SourceAttempt, TransferError};
use crate::integrity;
use crate::repository::{candidates, Repository};
use crate::transfer;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Per-download options
///
/// Destination precedence: `output_path` names the exact file; otherwise
/// `output_directory` (or the repository layout under the caller's root)
/// is combined with `file_name` (or the declared coordinate's file name).
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Exact destination file, overriding directory and file name
    pub output_path: Option<PathBuf>,
    /// Destination directory, replacing the repository layout
    pub output_directory: Option<PathBuf>,
    /// Destination file name, replacing the declared coordinate's file name
    pub file_name: Option<String>,
    /// Replace an existing destination instead of returning it untouched
    pub overwrite: bool,
    /// Expected SHA-256 digest, verified after every download
    pub expected_digest: Option<Vec<u8>>,
}

/// A successfully downloaded (or already present) artifact
#[derive(Debug, Clone)]
pub struct Download {
    /// Where the artifact landed
    pub file: PathBuf,
    /// Repository that served it; `None` when an existing file was reused
    pub repository: Option<String>,
    /// Effective packaging after inference and jar fallback
    pub packaging: String,
}

/// Resolves coordinates against an ordered repository fallback chain
pub struct RepositoryResolver {
    client: reqwest::Client,
    repositories: Vec<Repository>,
    preferred: Vec<String>,
    try_all: bool,
    fallback_to_jar: bool,
    create_directories: bool,
}

impl RepositoryResolver {
    /// Build a resolver from configuration
    pub fn new(client: reqwest::Client, config: &Config) -> Result<Self> {
        let repositories = config
            .repositories
            .iter()
            .map(Repository::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            client,
            repositories,
            preferred: config.acquire.preferred_repositories.clone(),
            try_all: config.acquire.try_all_repositories,
            fallback_to_jar: config.acquire.fallback_to_jar,
            create_directories: config.acquire.create_directories,
        })
    }

    /// Download one coordinate, trying each candidate repository in turn
    ///
    /// Repositories are ordered preferred-first, then as declared; ones not
    /// serving the coordinate's version kind are skipped outright. Snapshot
    /// metadata is consulted per repository, while a successful descriptor
    /// inference is kept for the rest of the chain. When the effective
    /// extension is not `jar`, a failed download is retried once against the
    /// same repository with a forced jar extension before moving on.
    ///
    /// The destination is fixed from the declared coordinate before any
    /// resolution, so snapshot timestamps and descriptor inference shape the
    /// remote request only, never the local file name. With overwrite off, an
    /// existing destination is reused as-is with zero network traffic.
    pub async fn download(
        &self,
        coordinate: &Coordinate,
        root: &Path,
        options: &ResolverOptions,
    ) -> std::result::Result<Download, ResolutionExhausted> {
        let dest = destination(coordinate, root, options);
        if !options.overwrite && dest.exists() {
            debug!(file = %dest.display(), "destination already present, reusing");
            return Ok(Download {
                file: dest,
                repository: None,
                packaging: coordinate.resolve().packaging().to_string(),
            });
        }

        let chain = candidates(&self.repositories, &self.preferred, coordinate);
        debug!(%coordinate, candidates = chain.len(), "resolving against repository chain");

        let mut attempts = Vec::new();
        let mut inference: Option<DescriptorInference> = None;

        for repository in chain {
            let mut resolved = coordinate.resolve();

            if coordinate.is_snapshot() {
                if let Some(snapshot) = self.resolve_snapshot(coordinate, repository).await {
                    resolved = resolved.with_snapshot(snapshot);
                }
            }

            // one successful inference serves the whole chain
            if coordinate.packaging.is_none() && inference.is_none() {
                inference = self.infer_from_descriptor(&resolved, repository).await;
            }
            if let Some(inferred) = &inference {
                resolved = resolved.with_packaging(&inferred.packaging);
                if coordinate.classifier.is_none() {
                    if let Some(classifier) = &inferred.classifier {
                        resolved = resolved.with_classifier(classifier);
                    }
                }
            }

            if let Some(download) = self
                .attempt(&resolved, repository, &dest, options, &mut attempts)
                .await
            {
                return Ok(download);
            }

            if self.fallback_to_jar && resolved.extension() != "jar" {
                let forced = resolved.clone().with_packaging("jar");
                debug!(
                    %coordinate,
                    repository = %repository.id,
                    "retrying with a forced jar extension"
                );
                if let Some(download) = self
                    .attempt(&forced, repository, &dest, options, &mut attempts)
                    .await
                {
                    return Ok(download);
                }
            }

            if !self.try_all {
                break;
            }
        }

        Err(ResolutionExhausted {
            coordinate: coordinate.to_string(),
            attempts,
        })
    }

    /// Resolve the snapshot build for `coordinate` at one repository
    ///
    /// Any fetch or parse problem falls back to the declared version; the
    /// artifact itself may still exist under its `-SNAPSHOT` name.
    async fn resolve_snapshot(
        &self,
        coordinate: &Coordinate,
        repository: &Repository,
    ) -> Option<SnapshotVersion> {
        let url = match repository.url_for(&coordinate.metadata_path()) {
            Ok(url) => url,
            Err(e) => {
                warn!(%coordinate, repository = %repository.id, error = %e, "snapshot metadata url invalid");
                return None;
            }
        };

        match transfer::fetch_text(&self.client, url.as_str()).await {
            Ok(xml) => match descriptor::parse_snapshot_metadata(&xml) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(
                        %coordinate,
                        repository = %repository.id,
                        error = %e,
                        "snapshot metadata unparseable, using declared version"
                    );
                    None
                }
            },
            Err(e) => {
                warn!(
                    %coordinate,
                    repository = %repository.id,
                    error = %e,
                    "snapshot metadata unavailable, using declared version"
                );
                None
            }
        }
    }

    /// Fetch and parse the project descriptor for packaging/classifier hints
    async fn infer_from_descriptor(
        &self,
        resolved: &ResolvedCoordinate,
        repository: &Repository,
    ) -> Option<DescriptorInference> {
        let declared = resolved.declared();
        let url = match repository.url_for(&resolved.descriptor_path()) {
            Ok(url) => url,
            Err(e) => {
                warn!(coordinate = %declared, repository = %repository.id, error = %e, "descriptor url invalid");
                return None;
            }
        };

        let xml = match transfer::fetch_text(&self.client, url.as_str()).await {
            Ok(xml) => xml,
            Err(e) => {
                warn!(
                    coordinate = %declared,
                    repository = %repository.id,
                    error = %e,
                    "project descriptor unavailable, assuming jar packaging"
                );
                return None;
            }
        };

        match descriptor::parse_project_descriptor(&xml, declared) {
            Ok(inference) => {
                debug!(
                    coordinate = %declared,
                    packaging = %inference.packaging,
                    classifier = ?inference.classifier,
                    "inferred from project descriptor"
                );
                Some(inference)
            }
            Err(e) => {
                warn!(
                    coordinate = %declared,
                    repository = %repository.id,
                    error = %e,
                    "project descriptor unparseable, assuming jar packaging"
                );
                None
            }
        }
    }

    /// One download attempt against one repository
    ///
    /// Failure pushes a [`SourceAttempt`] and returns `None`; the destination
    /// never keeps a file that failed its digest check.
    async fn attempt(
        &self,
        resolved: &ResolvedCoordinate,
        repository: &Repository,
        dest: &Path,
        options: &ResolverOptions,
        attempts: &mut Vec<SourceAttempt>,
    ) -> Option<Download> {
        let source = || format!("repository {} ({})", repository.id, repository.base_url);

        if self.create_directories {
            if let Some(parent) = dest.parent() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    attempts.push(SourceAttempt::new(
                        source(),
                        format!("creating {parent:?} failed: {e}"),
                    ));
                    return None;
                }
            }
        }

        let url = match repository.url_for(&resolved.remote_path()) {
            Ok(url) => url,
            Err(e) => {
                attempts.push(SourceAttempt::new(source(), e));
                return None;
            }
        };

        debug!(url = %url, file = %dest.display(), "downloading artifact");
        if let Err(e) = transfer::download_to_file(&self.client, url.as_str(), dest).await {
            warn!(url = %url, error = %e, "artifact download failed");
            attempts.push(SourceAttempt::new(source(), e));
            return None;
        }

        if let Some(expected) = &options.expected_digest {
            match integrity::digest_file_async(dest).await {
                Ok(actual) if actual == *expected => {}
                Ok(actual) => {
                    let mismatch = TransferError::DigestMismatch {
                        path: dest.to_path_buf(),
                        expected: hex::encode(expected),
                        actual: hex::encode(actual),
                    };
                    warn!(url = %url, error = %mismatch, "discarding artifact with wrong digest");
                    let _ = tokio::fs::remove_file(dest).await;
                    attempts.push(SourceAttempt::new(source(), mismatch));
                    return None;
                }
                Err(e) => {
                    let _ = tokio::fs::remove_file(dest).await;
                    attempts.push(SourceAttempt::new(
                        source(),
                        format!("digest check failed: {e}"),
                    ));
                    return None;
                }
            }
        }

        Some(Download {
            file: dest.to_path_buf(),
            repository: Some(repository.id.clone()),
            packaging: resolved.packaging().to_string(),
        })
    }
}

/// Destination for one coordinate, fixed before any resolution
///
/// The default file name comes from the declared coordinate: a snapshot keeps
/// its `-SNAPSHOT` version locally and an undeclared packaging lands as
/// `.jar`, whatever the remote request resolves to.
fn destination(coordinate: &Coordinate, root: &Path, options: &ResolverOptions) -> PathBuf {
    if let Some(path) = &options.output_path {
        return path.clone();
    }
    let file_name = options
        .file_name
        .clone()
        .unwrap_or_else(|| coordinate.resolve().file_name());
    match &options.output_directory {
        Some(directory) => directory.join(file_name),
        None => root.join(coordinate.repository_path()).join(file_name),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepositoryConfig;
    use crate::integrity::digest_bytes;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn single_repo_config(id: &str, url: &str) -> Config {
        let mut config = Config::default();
        config.repositories = vec![RepositoryConfig {
            id: id.to_string(),
            url: url.to_string(),
            releases: true,
            snapshots: true,
        }];
        config
    }

    fn resolver_for(config: &Config) -> RepositoryResolver {
        RepositoryResolver::new(reqwest::Client::new(), config).unwrap()
    }

    async fn mount_jar(server: &MockServer, path: &str, body: &[u8]) {
        Mock::given(method("GET"))
            .and(url_path(path))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn downloads_a_release_artifact() {
        let server = MockServer::start().await;
        mount_jar(&server, "/com/example/widget/1.0/widget-1.0.jar", b"bytes").await;

        let config = single_repo_config("main", &server.uri());
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("com.example:widget:1.0").unwrap();
        let download = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap();

        assert_eq!(download.repository.as_deref(), Some("main"));
        assert_eq!(
            download.file,
            root.path().join("com/example/widget/1.0/widget-1.0.jar")
        );
        assert_eq!(std::fs::read(&download.file).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn snapshot_metadata_picks_the_timestamped_remote_file() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(url_path("/g/a/1.0-SNAPSHOT/maven-metadata.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<metadata><versioning><snapshot>
                     <timestamp>20240720.200737</timestamp>
                     <buildNumber>2</buildNumber>
                   </snapshot></versioning></metadata>"#,
            ))
            .mount(&server)
            .await;
        mount_jar(
            &server,
            "/g/a/1.0-SNAPSHOT/a-1.0-20240720.200737-2.jar",
            b"snapshot build",
        )
        .await;
        // the declared-version name must not be requested once metadata resolves
        Mock::given(method("GET"))
            .and(url_path("/g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.jar"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = single_repo_config("snapshots", &server.uri());
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:1.0-SNAPSHOT").unwrap();
        let download = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap();

        // remote request is timestamped, the local file keeps the declared name
        assert_eq!(
            download.file,
            root.path().join("g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.jar")
        );
        assert_eq!(std::fs::read(&download.file).unwrap(), b"snapshot build");
    }

    #[tokio::test]
    async fn missing_snapshot_metadata_uses_the_declared_version() {
        let server = MockServer::start().await;
        mount_jar(&server, "/g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.jar", b"declared").await;

        let config = single_repo_config("snapshots", &server.uri());
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:1.0-SNAPSHOT").unwrap();
        let download = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap();

        assert!(download.file.ends_with("a-1.0-SNAPSHOT.jar"));
    }

    #[tokio::test]
    async fn descriptor_inference_shapes_the_remote_file_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/g/a/2.0/a-2.0.pom"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<project>
                     <packaging>war</packaging>
                     <build><plugins><plugin>
                       <artifactId>maven-jar-plugin</artifactId>
                       <configuration><classifier>slim</classifier></configuration>
                     </plugin></plugins></build>
                   </project>"#,
            ))
            .mount(&server)
            .await;
        mount_jar(&server, "/g/a/2.0/a-2.0-slim.war", b"war body").await;
        // inference rewrites the remote request, not the destination
        Mock::given(method("GET"))
            .and(url_path("/g/a/2.0/a-2.0.jar"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = single_repo_config("main", &server.uri());
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:2.0").unwrap();
        let download = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap();

        assert_eq!(download.packaging, "war");
        assert_eq!(download.file, root.path().join("g/a/2.0/a-2.0.jar"));
        assert_eq!(std::fs::read(&download.file).unwrap(), b"war body");
    }

    #[tokio::test]
    async fn declared_packaging_skips_the_descriptor_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/g/a/2.0/a-2.0.pom"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        mount_jar(&server, "/g/a/2.0/a-2.0.zip", b"zip body").await;

        let config = single_repo_config("main", &server.uri());
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:2.0:zip").unwrap();
        let download = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap();

        assert_eq!(download.packaging, "zip");
    }

    #[tokio::test]
    async fn failed_download_retries_with_a_jar_extension() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/g/a/3.0/a-3.0.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        mount_jar(&server, "/g/a/3.0/a-3.0.jar", b"jar after all").await;

        let config = single_repo_config("main", &server.uri());
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:3.0:zip").unwrap();
        let download = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap();

        // the fallback changes the remote extension only
        assert_eq!(download.packaging, "jar");
        assert_eq!(download.file, root.path().join("g/a/3.0/a-3.0.zip"));
        assert_eq!(std::fs::read(&download.file).unwrap(), b"jar after all");
    }

    #[tokio::test]
    async fn chain_falls_through_to_the_next_repository() {
        let first = MockServer::start().await;
        let second = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/g/a/1.0/a-1.0.jar"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&first)
            .await;
        mount_jar(&second, "/g/a/1.0/a-1.0.jar", b"from second").await;

        let mut config = single_repo_config("first", &first.uri());
        config.repositories.push(RepositoryConfig {
            id: "second".to_string(),
            url: second.uri(),
            releases: true,
            snapshots: true,
        });
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:1.0").unwrap();
        let download = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap();

        assert_eq!(download.repository.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn fail_fast_stops_after_the_first_repository() {
        let first = MockServer::start().await;
        let second = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/g/a/1.0/a-1.0.jar"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&first)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/g/a/1.0/a-1.0.jar"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&second)
            .await;

        let mut config = single_repo_config("first", &first.uri());
        config.repositories.push(RepositoryConfig {
            id: "second".to_string(),
            url: second.uri(),
            releases: true,
            snapshots: true,
        });
        config.acquire.try_all_repositories = false;
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:1.0").unwrap();
        let exhausted = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap_err();

        assert_eq!(exhausted.attempts.len(), 1);
        assert!(exhausted.attempts[0].source.contains("first"));
    }

    #[tokio::test]
    async fn exhaustion_records_every_attempt() {
        let first = MockServer::start().await;
        let second = MockServer::start().await;
        for server in [&first, &second] {
            Mock::given(method("GET"))
                .and(url_path("/g/a/1.0/a-1.0.jar"))
                .respond_with(ResponseTemplate::new(404))
                .mount(server)
                .await;
        }

        let mut config = single_repo_config("first", &first.uri());
        config.repositories.push(RepositoryConfig {
            id: "second".to_string(),
            url: second.uri(),
            releases: true,
            snapshots: true,
        });
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:1.0").unwrap();
        let exhausted = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap_err();

        assert_eq!(exhausted.attempts.len(), 2);
        let rendered = exhausted.to_string();
        assert!(rendered.contains("first"));
        assert!(rendered.contains("second"));
        assert!(rendered.contains("404"));
    }

    #[tokio::test]
    async fn wrong_digest_is_discarded_and_recorded() {
        let server = MockServer::start().await;
        mount_jar(&server, "/g/a/1.0/a-1.0.jar", b"evil bytes").await;

        let config = single_repo_config("main", &server.uri());
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:1.0").unwrap();
        let options = ResolverOptions {
            expected_digest: Some(digest_bytes(b"good bytes")),
            ..ResolverOptions::default()
        };
        let exhausted = resolver
            .download(&coordinate, root.path(), &options)
            .await
            .unwrap_err();

        assert_eq!(exhausted.attempts.len(), 1);
        assert!(exhausted.attempts[0].error.contains("digest mismatch"));
        assert!(!root.path().join("g/a/1.0/a-1.0.jar").exists());
    }

    #[tokio::test]
    async fn matching_digest_is_accepted() {
        let server = MockServer::start().await;
        mount_jar(&server, "/g/a/1.0/a-1.0.jar", b"good bytes").await;

        let config = single_repo_config("main", &server.uri());
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:1.0").unwrap();
        let options = ResolverOptions {
            expected_digest: Some(digest_bytes(b"good bytes")),
            ..ResolverOptions::default()
        };
        let download = resolver
            .download(&coordinate, root.path(), &options)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&download.file).unwrap(), b"good bytes");
    }

    #[tokio::test]
    async fn existing_destination_is_reused_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = single_repo_config("main", &server.uri());
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("already.jar");
        std::fs::write(&dest, b"cached").unwrap();

        let coordinate = Coordinate::parse("g:a:1.0").unwrap();
        let options = ResolverOptions {
            output_path: Some(dest.clone()),
            ..ResolverOptions::default()
        };
        let download = resolver
            .download(&coordinate, root.path(), &options)
            .await
            .unwrap();

        assert_eq!(download.repository, None);
        assert_eq!(std::fs::read(&download.file).unwrap(), b"cached");
    }

    #[tokio::test]
    async fn second_download_reuses_the_file_without_a_descriptor_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/g/a/2.0/a-2.0.pom"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<project><packaging>war</packaging></project>"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/g/a/2.0/a-2.0.war"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"war body"))
            .expect(1)
            .mount(&server)
            .await;

        let config = single_repo_config("main", &server.uri());
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:2.0").unwrap();
        let first = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap();
        let second = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap();

        assert_eq!(first.repository.as_deref(), Some("main"));
        assert_eq!(second.repository, None);
        assert_eq!(second.file, first.file);
    }

    #[tokio::test]
    async fn output_directory_and_file_name_override_the_layout() {
        let server = MockServer::start().await;
        mount_jar(&server, "/g/a/1.0/a-1.0.jar", b"bytes").await;

        let config = single_repo_config("main", &server.uri());
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:1.0").unwrap();
        let options = ResolverOptions {
            output_directory: Some(root.path().join("flat")),
            file_name: Some("renamed.jar".to_string()),
            ..ResolverOptions::default()
        };
        let download = resolver
            .download(&coordinate, root.path(), &options)
            .await
            .unwrap();

        assert_eq!(download.file, root.path().join("flat/renamed.jar"));
        assert_eq!(std::fs::read(&download.file).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn snapshot_coordinate_skips_release_only_repositories() {
        let mut config = single_repo_config("releases", "https://releases.invalid/");
        config.repositories[0].snapshots = false;
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:1.0-SNAPSHOT").unwrap();
        let exhausted = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap_err();

        assert!(exhausted.attempts.is_empty());
        assert!(exhausted.to_string().contains("no sources were available"));
    }

    #[tokio::test]
    async fn inference_from_one_repository_carries_to_the_next() {
        let first = MockServer::start().await;
        let second = MockServer::start().await;

        Mock::given(method("GET"))
            .and(url_path("/g/a/2.0/a-2.0.pom"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<project><packaging>war</packaging></project>"),
            )
            .expect(1)
            .mount(&first)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/g/a/2.0/a-2.0.war"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&first)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/g/a/2.0/a-2.0.jar"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&first)
            .await;

        Mock::given(method("GET"))
            .and(url_path("/g/a/2.0/a-2.0.pom"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&second)
            .await;
        mount_jar(&second, "/g/a/2.0/a-2.0.war", b"war from second").await;

        let mut config = single_repo_config("first", &first.uri());
        config.repositories.push(RepositoryConfig {
            id: "second".to_string(),
            url: second.uri(),
            releases: true,
            snapshots: true,
        });
        let resolver = resolver_for(&config);
        let root = tempfile::tempdir().unwrap();

        let coordinate = Coordinate::parse("g:a:2.0").unwrap();
        let download = resolver
            .download(&coordinate, root.path(), &ResolverOptions::default())
            .await
            .unwrap();

        assert_eq!(download.repository.as_deref(), Some("second"));
        assert_eq!(download.packaging, "war");
    }
}
