//! Single-entry acquisition task
//!
//! One task per manifest entry walks the source ladder: an existing
//! digest-valid file, the embedded resource bundle, the archived original,
//! then the remote repository chain. The first hit wins. A source that does
//! not carry the entry is a silent miss; a source that fails while serving
//! it is recorded, so an exhausted entry reports everything it tried.

use crate::acquirer::aggregate::ClasspathLayout;
use crate::bundle::{OriginalArchive, ResourceBundle};
use crate::coordinate::Coordinate;
use crate::error::{EntryFailure, Error, SourceAttempt, TransferError};
use crate::integrity;
use crate::manifest::ManifestEntry;
use crate::resolver::{RepositoryResolver, ResolverOptions};
use crate::transfer;
use crate::types::{AcquireEvent, Category, SourceKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared context for a single acquisition task, reducing parameter passing
/// between the tier helpers.
pub(crate) struct EntryContext {
    pub(crate) category: Category,
    pub(crate) entry: ManifestEntry,
    pub(crate) output_root: PathBuf,
    /// Lookup path inside the bundle and the archive (`prefix/category/path`)
    pub(crate) bundle_path: String,
    pub(crate) resources: Option<Arc<dyn ResourceBundle>>,
    pub(crate) archive: Option<Arc<OriginalArchive>>,
    pub(crate) resolver: Arc<RepositoryResolver>,
    pub(crate) create_directories: bool,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<AcquireEvent>,
    pub(crate) layout: Arc<tokio::sync::Mutex<ClasspathLayout>>,
}

impl EntryContext {
    fn emit(&self, event: AcquireEvent) {
        // send() fails only when nobody subscribed, which is fine
        self.event_tx.send(event).ok();
    }

    /// Record the resolved location and announce it
    async fn resolve(&self, source: SourceKind, file: PathBuf, repository: Option<String>) {
        {
            let mut layout = self.layout.lock().await;
            layout.insert(self.category, self.entry.path.clone(), file.clone());
        }
        self.emit(AcquireEvent::EntryResolved {
            category: self.category,
            path: self.entry.path.clone(),
            source,
            file,
            repository,
        });
    }

    fn embedded_source(&self) -> String {
        format!("embedded resource {}", self.bundle_path)
    }

    fn archive_source(&self) -> String {
        format!("original archive entry {}", self.bundle_path)
    }
}

/// Run one manifest entry through the source ladder
///
/// Returns the entry's failure, carrying every recorded attempt, when no
/// source could provide it. The caller collects failures across entries and
/// reports them together.
pub(crate) async fn acquire_entry(ctx: EntryContext) -> std::result::Result<(), EntryFailure> {
    ctx.emit(AcquireEvent::EntryStarted {
        category: ctx.category,
        path: ctx.entry.path.clone(),
        id: ctx.entry.id.clone(),
    });

    // one directory per category, mirroring the embedded bundle layout
    let dest = ctx
        .output_root
        .join(ctx.category.dir_name())
        .join(&ctx.entry.path);
    let mut attempts = Vec::new();

    if integrity::is_file_valid(&dest, &ctx.entry.hash).await {
        debug!(category = %ctx.category, path = %ctx.entry.path, "existing file matches its digest");
        ctx.resolve(SourceKind::Cache, dest, None).await;
        return Ok(());
    }

    if let Some(bytes) = read_embedded(&ctx, &mut attempts).await {
        match write_payload(&ctx, &dest, &bytes).await {
            Ok(()) => {
                debug!(category = %ctx.category, path = %ctx.entry.path, "materialized from the embedded bundle");
                ctx.resolve(SourceKind::Embedded, dest, None).await;
                return Ok(());
            }
            Err(e) => attempts.push(SourceAttempt::new(ctx.embedded_source(), e)),
        }
    }

    if let Some(bytes) = read_archived(&ctx, &mut attempts).await {
        match write_payload(&ctx, &dest, &bytes).await {
            Ok(()) => {
                debug!(category = %ctx.category, path = %ctx.entry.path, "materialized from the original archive");
                ctx.resolve(SourceKind::Archive, dest, None).await;
                return Ok(());
            }
            Err(e) => attempts.push(SourceAttempt::new(ctx.archive_source(), e)),
        }
    }

    match Coordinate::parse(&ctx.entry.id) {
        Ok(coordinate) => {
            let options = ResolverOptions {
                output_path: Some(dest.clone()),
                // a pre-existing destination already failed the digest check
                overwrite: true,
                expected_digest: Some(ctx.entry.hash.clone()),
                ..ResolverOptions::default()
            };
            match ctx
                .resolver
                .download(&coordinate, &ctx.output_root, &options)
                .await
            {
                Ok(download) => {
                    ctx.resolve(SourceKind::Repository, download.file, download.repository)
                        .await;
                    return Ok(());
                }
                Err(exhausted) => attempts.extend(exhausted.attempts),
            }
        }
        // an id that is not a coordinate leaves the remote tier unusable
        Err(e) => attempts.push(SourceAttempt::new("remote repositories", e)),
    }

    let failure = EntryFailure {
        category: ctx.category,
        id: ctx.entry.id.clone(),
        path: ctx.entry.path.clone(),
        attempts,
    };
    warn!(category = %ctx.category, path = %ctx.entry.path, error = %failure, "entry exhausted every source");
    ctx.emit(AcquireEvent::EntryFailed {
        category: ctx.category,
        path: ctx.entry.path.clone(),
        id: ctx.entry.id.clone(),
        error: failure.to_string(),
    });
    Err(failure)
}

/// Look the entry up in the embedded bundle, if one is mounted
///
/// A miss yields `None` with nothing recorded; a failed read records an
/// attempt and also yields `None` so the ladder continues.
async fn read_embedded(ctx: &EntryContext, attempts: &mut Vec<SourceAttempt>) -> Option<Vec<u8>> {
    let resources = Arc::clone(ctx.resources.as_ref()?);
    let path = ctx.bundle_path.clone();
    let outcome = tokio::task::spawn_blocking(move || resources.read(&path))
        .await
        .unwrap_or_else(|e| Err(std::io::Error::other(e)));

    match outcome {
        Ok(Some(bytes)) => Some(bytes),
        Ok(None) => {
            debug!(category = %ctx.category, path = %ctx.entry.path, "no embedded resource");
            None
        }
        Err(e) => {
            attempts.push(SourceAttempt::new(ctx.embedded_source(), e));
            None
        }
    }
}

/// Look the entry up in the original archive, if one is mounted
async fn read_archived(ctx: &EntryContext, attempts: &mut Vec<SourceAttempt>) -> Option<Vec<u8>> {
    let archive = Arc::clone(ctx.archive.as_ref()?);
    let path = ctx.bundle_path.clone();
    let outcome = tokio::task::spawn_blocking(move || archive.read(&path))
        .await
        .unwrap_or_else(|e| Err(Error::Io(std::io::Error::other(e))));

    match outcome {
        Ok(Some(bytes)) => Some(bytes),
        Ok(None) => {
            debug!(category = %ctx.category, path = %ctx.entry.path, "no archive entry");
            None
        }
        Err(e) => {
            attempts.push(SourceAttempt::new(ctx.archive_source(), e));
            None
        }
    }
}

/// Write a tier 3/4 payload to the destination
async fn write_payload(
    ctx: &EntryContext,
    dest: &Path,
    bytes: &[u8],
) -> std::result::Result<(), TransferError> {
    if ctx.create_directories {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| TransferError::Write {
                    path: dest.to_path_buf(),
                    source,
                })?;
        }
    }
    transfer::write_bytes(dest, bytes).await
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{resource_path, DirResourceBundle};
    use crate::config::{Config, RepositoryConfig};
    use crate::integrity::digest_bytes;
    use std::io::Write;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Bundle whose reads always fail, standing in for unreadable media
    struct BrokenBundle;

    impl ResourceBundle for BrokenBundle {
        fn read(&self, _path: &str) -> std::io::Result<Option<Vec<u8>>> {
            Err(std::io::Error::other("bundle medium unreadable"))
        }
    }

    fn entry_for(payload: &[u8], id: &str, path: &str) -> ManifestEntry {
        ManifestEntry {
            hash: digest_bytes(payload),
            id: id.to_string(),
            path: path.to_string(),
        }
    }

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

    fn context(
        root: &Path,
        entry: ManifestEntry,
        config: &Config,
        resources: Option<Arc<dyn ResourceBundle>>,
        archive: Option<Arc<OriginalArchive>>,
    ) -> EntryContext {
        let resolver =
            Arc::new(RepositoryResolver::new(reqwest::Client::new(), config).unwrap());
        let (event_tx, _rx) = tokio::sync::broadcast::channel(64);
        let layout = Arc::new(tokio::sync::Mutex::new(ClasspathLayout::for_manifests(
            &[],
            std::slice::from_ref(&entry),
        )));
        let bundle_path = resource_path("META-INF", Category::Libraries, &entry.path);

        EntryContext {
            category: Category::Libraries,
            entry,
            output_root: root.to_path_buf(),
            bundle_path,
            resources,
            archive,
            resolver,
            create_directories: true,
            event_tx,
            layout,
        }
    }

    async fn mount_catch_all_expecting_none(server: &MockServer) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(server)
            .await;
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        for (name, bytes) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn valid_existing_file_short_circuits_every_other_source() {
        let server = MockServer::start().await;
        mount_catch_all_expecting_none(&server).await;

        let root = tempfile::tempdir().unwrap();
        let payload = b"already on disk";
        let entry = entry_for(payload, "com.example:widget:1.0:jar", "com/example/widget-1.0.jar");

        let dest = root.path().join("libraries").join(&entry.path);
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(&dest, payload).unwrap();

        let config = single_repo_config("mock", &server.uri());
        let ctx = context(root.path(), entry.clone(), &config, None, None);
        let mut events = ctx.event_tx.subscribe();
        let layout = Arc::clone(&ctx.layout);

        acquire_entry(ctx).await.unwrap();

        assert_eq!(
            layout.lock().await.get(Category::Libraries, &entry.path),
            Some(dest.as_path())
        );
        assert!(matches!(
            events.try_recv().unwrap(),
            AcquireEvent::EntryStarted { .. }
        ));
        match events.try_recv().unwrap() {
            AcquireEvent::EntryResolved { source, repository, .. } => {
                assert_eq!(source, SourceKind::Cache);
                assert_eq!(repository, None);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn embedded_resource_wins_without_touching_the_network() {
        let server = MockServer::start().await;
        mount_catch_all_expecting_none(&server).await;

        let root = tempfile::tempdir().unwrap();
        let payload = b"embedded widget";
        let entry = entry_for(payload, "com.example:widget:1.0:jar", "com/example/widget-1.0.jar");

        let bundle_dir = tempfile::tempdir().unwrap();
        let resource = bundle_dir
            .path()
            .join("META-INF/libraries/com/example/widget-1.0.jar");
        std::fs::create_dir_all(resource.parent().unwrap()).unwrap();
        std::fs::write(&resource, payload).unwrap();

        let config = single_repo_config("mock", &server.uri());
        let bundle: Arc<dyn ResourceBundle> = Arc::new(DirResourceBundle::new(bundle_dir.path()));
        let ctx = context(root.path(), entry.clone(), &config, Some(bundle), None);
        let layout = Arc::clone(&ctx.layout);

        acquire_entry(ctx).await.unwrap();

        let dest = root.path().join("libraries").join(&entry.path);
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
        assert_eq!(
            layout.lock().await.get(Category::Libraries, &entry.path),
            Some(dest.as_path())
        );
    }

    #[tokio::test]
    async fn archived_original_serves_when_the_bundle_misses() {
        let server = MockServer::start().await;
        mount_catch_all_expecting_none(&server).await;

        let root = tempfile::tempdir().unwrap();
        let payload = b"archived widget";
        let entry = entry_for(payload, "com.example:widget:1.0:jar", "com/example/widget-1.0.jar");

        let archive_dir = tempfile::tempdir().unwrap();
        let zip_path = archive_dir.path().join("original.jar");
        write_zip(
            &zip_path,
            &[("META-INF/libraries/com/example/widget-1.0.jar", payload.as_slice())],
        );
        let archive = Arc::new(OriginalArchive::open(&zip_path).unwrap());

        // the mounted bundle does not carry the entry, a silent miss
        let empty_bundle_dir = tempfile::tempdir().unwrap();
        let bundle: Arc<dyn ResourceBundle> =
            Arc::new(DirResourceBundle::new(empty_bundle_dir.path()));

        let config = single_repo_config("mock", &server.uri());
        let ctx = context(root.path(), entry.clone(), &config, Some(bundle), Some(archive));
        let mut events = ctx.event_tx.subscribe();

        acquire_entry(ctx).await.unwrap();

        let dest = root.path().join("libraries").join(&entry.path);
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
        events.try_recv().unwrap(); // started
        match events.try_recv().unwrap() {
            AcquireEvent::EntryResolved { source, .. } => assert_eq!(source, SourceKind::Archive),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn broken_bundle_read_falls_through_to_the_archive() {
        let server = MockServer::start().await;
        mount_catch_all_expecting_none(&server).await;

        let root = tempfile::tempdir().unwrap();
        let payload = b"archived widget";
        let entry = entry_for(payload, "com.example:widget:1.0:jar", "com/example/widget-1.0.jar");

        let archive_dir = tempfile::tempdir().unwrap();
        let zip_path = archive_dir.path().join("original.jar");
        write_zip(
            &zip_path,
            &[("META-INF/libraries/com/example/widget-1.0.jar", payload.as_slice())],
        );
        let archive = Arc::new(OriginalArchive::open(&zip_path).unwrap());

        let config = single_repo_config("mock", &server.uri());
        let bundle: Arc<dyn ResourceBundle> = Arc::new(BrokenBundle);
        let ctx = context(root.path(), entry.clone(), &config, Some(bundle), Some(archive));

        // the failed bundle read falls through to the archive
        acquire_entry(ctx).await.unwrap();
        let dest = root.path().join("libraries").join(&entry.path);
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
    }

    #[tokio::test]
    async fn remote_repository_is_the_last_resort() {
        let server = MockServer::start().await;
        let payload = b"remote widget";
        Mock::given(method("GET"))
            .and(url_path("/com/example/widget/1.0/widget-1.0.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.as_slice()))
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let entry = entry_for(payload, "com.example:widget:1.0:jar", "com/example/widget-1.0.jar");

        let config = single_repo_config("mock", &server.uri());
        let ctx = context(root.path(), entry.clone(), &config, None, None);
        let mut events = ctx.event_tx.subscribe();

        acquire_entry(ctx).await.unwrap();

        let dest = root.path().join("libraries").join(&entry.path);
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
        events.try_recv().unwrap(); // started
        match events.try_recv().unwrap() {
            AcquireEvent::EntryResolved { source, repository, .. } => {
                assert_eq!(source, SourceKind::Repository);
                assert_eq!(repository.as_deref(), Some("mock"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn stale_destination_is_replaced_from_the_repository() {
        let server = MockServer::start().await;
        let payload = b"fresh bytes";
        Mock::given(method("GET"))
            .and(url_path("/com/example/widget/1.0/widget-1.0.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.as_slice()))
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let entry = entry_for(payload, "com.example:widget:1.0:jar", "com/example/widget-1.0.jar");

        let dest = root.path().join("libraries").join(&entry.path);
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(&dest, b"stale bytes").unwrap();

        let config = single_repo_config("mock", &server.uri());
        let ctx = context(root.path(), entry.clone(), &config, None, None);

        acquire_entry(ctx).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
    }

    #[tokio::test]
    async fn exhaustion_reports_every_attempted_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let entry = entry_for(b"never served", "com.example:widget:1.0:jar", "com/example/widget-1.0.jar");

        let config = single_repo_config("mock", &server.uri());
        let bundle: Arc<dyn ResourceBundle> = Arc::new(BrokenBundle);
        let ctx = context(root.path(), entry.clone(), &config, Some(bundle), None);
        let mut events = ctx.event_tx.subscribe();

        let failure = acquire_entry(ctx).await.unwrap_err();

        assert_eq!(failure.id, "com.example:widget:1.0:jar");
        assert_eq!(failure.attempts.len(), 2);
        assert!(failure.attempts[0].source.starts_with("embedded resource"));
        assert!(failure.attempts[1].source.starts_with("repository mock"));
        let rendered = failure.to_string();
        assert!(rendered.contains("bundle medium unreadable"));
        assert!(rendered.contains("HTTP 404"));

        events.try_recv().unwrap(); // started
        match events.try_recv().unwrap() {
            AcquireEvent::EntryFailed { error, .. } => {
                assert!(error.contains("all sources exhausted"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_id_surfaces_in_the_failure_report() {
        let server = MockServer::start().await;
        mount_catch_all_expecting_none(&server).await;

        let root = tempfile::tempdir().unwrap();
        let entry = entry_for(b"no such payload", "standalone-1.21.5", "1.21.5/client.jar");

        let config = single_repo_config("mock", &server.uri());
        let ctx = context(root.path(), entry, &config, None, None);

        let failure = acquire_entry(ctx).await.unwrap_err();
        assert_eq!(failure.attempts.len(), 1);
        assert_eq!(failure.attempts[0].source, "remote repositories");
        assert!(failure.attempts[0].error.contains("invalid coordinate"));
    }
}
