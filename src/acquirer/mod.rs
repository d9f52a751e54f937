//! Manifest-driven classpath acquisition
//!
//! The `ClasspathDownloader` struct and its collaborators are organized by
//! concern:
//! - [`aggregate`] - Order-preserving classpath layout shared across tasks
//! - [`entry`] - Per-entry source ladder execution
//!
//! `acquire` fans one task per manifest entry onto the runtime, bounded by a
//! semaphore, and awaits every task before reading the aggregate. A failing
//! entry never cancels its siblings; the run fails afterwards with every
//! broken entry's attempt transcript in one report.

mod aggregate;
mod entry;

pub use aggregate::ClasspathLayout;

use crate::bundle::{resource_path, OriginalArchive, ResourceBundle};
use crate::config::Config;
use crate::coordinate::Coordinate;
use crate::error::{AcquireFailed, EntryFailure, Error, Result};
use crate::manifest::ManifestEntry;
use crate::patch::{self, NoOpPatchEngine, PatchEngine, PatchRecord};
use crate::resolver::{Download, RepositoryResolver, ResolverOptions};
use crate::types::{AcquireEvent, Category};
use entry::{acquire_entry, EntryContext};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One acquisition run: the manifests to satisfy and the local sources
/// mounted for it
pub struct AcquireRequest {
    /// Directory the classpath is materialized under, one subdirectory per
    /// category
    pub output_root: PathBuf,
    /// Parsed versions manifest, in declared order
    pub versions: Vec<ManifestEntry>,
    /// Parsed libraries manifest, in declared order
    pub libraries: Vec<ManifestEntry>,
    /// Embedded resource bundle, when one is mounted
    pub resources: Option<Arc<dyn ResourceBundle>>,
    /// Original distribution archive, when one is mounted
    pub original_archive: Option<PathBuf>,
    /// Declared patch records
    pub patches: Vec<PatchRecord>,
}

impl AcquireRequest {
    /// A request with no local sources mounted and no patches declared
    pub fn new(
        output_root: impl Into<PathBuf>,
        versions: Vec<ManifestEntry>,
        libraries: Vec<ManifestEntry>,
    ) -> Self {
        Self {
            output_root: output_root.into(),
            versions,
            libraries,
            resources: None,
            original_archive: None,
            patches: Vec::new(),
        }
    }
}

/// Main acquisition engine (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct ClasspathDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    config: Arc<Config>,
    /// Repository resolver shared by every acquisition task
    resolver: Arc<RepositoryResolver>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: tokio::sync::broadcast::Sender<AcquireEvent>,
    /// Semaphore limiting concurrent entry tasks
    concurrent_limit: Arc<tokio::sync::Semaphore>,
    /// External patch engine (trait object for pluggable implementations)
    patch_engine: Arc<dyn PatchEngine>,
}

impl ClasspathDownloader {
    /// Create a new downloader from configuration
    ///
    /// This validates the configuration, builds the shared HTTP client with
    /// the configured timeouts and user agent, and sets up the event
    /// broadcast channel. Patch records are rejected until an engine is
    /// attached with [`with_patch_engine`](Self::with_patch_engine).
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.http.connect_timeout)
            .timeout(config.http.request_timeout)
            .user_agent(config.http.user_agent.as_str())
            .build()?;

        let resolver = Arc::new(RepositoryResolver::new(client, &config)?);

        // Buffer of 1000 events; subscribers that fall further behind see a lag error
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        let concurrent_limit = Arc::new(tokio::sync::Semaphore::new(
            config.acquire.max_concurrent_fetches,
        ));

        Ok(Self {
            config: Arc::new(config),
            resolver,
            event_tx,
            concurrent_limit,
            patch_engine: Arc::new(NoOpPatchEngine),
        })
    }

    /// Attach a patch engine collaborator
    pub fn with_patch_engine(mut self, engine: Arc<dyn PatchEngine>) -> Self {
        info!(patch_engine = engine.name(), "patch engine configured");
        self.patch_engine = engine;
        self
    }

    /// Subscribe to acquisition events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all
    /// events independently; one that falls behind by more than 1000 events
    /// receives a `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use classpath_dl::{ClasspathDownloader, Config};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = ClasspathDownloader::new(Config::default())?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             println!("{event:?}");
    ///         }
    ///     });
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AcquireEvent> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    ///
    /// The configuration is wrapped in an Arc, so this is a cheap clone.
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Download a single artifact outside any manifest
    ///
    /// Resolves `coordinate` against the configured repository chain and
    /// places the artifact under `root` in the repository layout, honoring
    /// the destination overrides in `options`. The configured overwrite
    /// policy applies when the per-call option leaves it off.
    pub async fn download_artifact(
        &self,
        coordinate: &Coordinate,
        root: &Path,
        options: &ResolverOptions,
    ) -> Result<Download> {
        let mut options = options.clone();
        options.overwrite = options.overwrite || self.config.acquire.overwrite;
        Ok(self.resolver.download(coordinate, root, &options).await?)
    }

    /// Acquire every manifest entry and return the resolved layout
    ///
    /// Patch records are validated first: every output must target a
    /// manifest entry, and declared records require the original archive to
    /// be mounted. One task per remaining entry then walks the source ladder
    /// (existing file, embedded bundle, original archive, remote
    /// repositories) under the concurrency bound. Every task is awaited
    /// before the aggregate is read; failures are collected per entry and
    /// reported together. Patches are applied after the archive handle is
    /// released, and the returned layout is checked for completeness.
    pub async fn acquire(&self, request: AcquireRequest) -> Result<ClasspathLayout> {
        info!(
            versions = request.versions.len(),
            libraries = request.libraries.len(),
            root = %request.output_root.display(),
            "starting classpath acquisition"
        );

        patch::validate_against_manifests(&request.patches, &request.versions, &request.libraries)?;
        if !request.patches.is_empty() && request.original_archive.is_none() {
            return Err(Error::Config {
                message: format!(
                    "{} patch record(s) declared but no original archive is mounted",
                    request.patches.len()
                ),
                key: Some("patches".to_string()),
            });
        }

        let archive = match &request.original_archive {
            Some(path) => {
                let path = path.clone();
                let opened = tokio::task::spawn_blocking(move || OriginalArchive::open(&path))
                    .await
                    .map_err(|e| Error::Other(format!("archive open task failed: {e}")))??;
                Some(Arc::new(opened))
            }
            None => None,
        };

        let layout = Arc::new(tokio::sync::Mutex::new(ClasspathLayout::for_manifests(
            &request.versions,
            &request.libraries,
        )));

        let version_tasks = self
            .spawn_category(Category::Versions, &request.versions, &request, &archive, &layout)
            .await?;
        let library_tasks = self
            .spawn_category(Category::Libraries, &request.libraries, &request, &archive, &layout)
            .await?;

        let mut failures = Vec::new();
        self.await_category(Category::Versions, version_tasks, &layout, &mut failures)
            .await?;
        self.await_category(Category::Libraries, library_tasks, &layout, &mut failures)
            .await?;

        if !failures.is_empty() {
            warn!(failed = failures.len(), "acquisition failed");
            return Err(AcquireFailed { failures }.into());
        }

        // Last live handle; a patch engine may reopen or rewrite the original now
        drop(archive);

        if !request.patches.is_empty() {
            let applied = self
                .patch_engine
                .apply_all(
                    &request.patches,
                    request.original_archive.as_deref(),
                    &request.output_root,
                )
                .await?;
            let count = applied.len();
            {
                let mut layout = layout.lock().await;
                for produced in applied {
                    layout.insert(produced.category, produced.path, produced.file);
                }
            }
            info!(
                applied = count,
                patch_engine = self.patch_engine.name(),
                "patch records applied"
            );
            self.emit_event(AcquireEvent::PatchesApplied { applied: count });
        }

        let layout = Arc::try_unwrap(layout)
            .map_err(|_| Error::Other("classpath layout still shared after the barrier".to_string()))?
            .into_inner();

        let missing = layout.missing();
        if !missing.is_empty() {
            let listing = missing
                .iter()
                .map(|(category, path)| format!("{category}/{path}"))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::Patch(format!(
                "{} manifest entry(ies) left unresolved after patching: {listing}",
                missing.len()
            )));
        }

        info!(
            versions = layout.resolved(Category::Versions),
            libraries = layout.resolved(Category::Libraries),
            "classpath acquisition complete"
        );
        Ok(layout)
    }

    /// Spawn one bounded task per entry the patch engine will not produce
    async fn spawn_category(
        &self,
        category: Category,
        entries: &[ManifestEntry],
        request: &AcquireRequest,
        archive: &Option<Arc<OriginalArchive>>,
        layout: &Arc<tokio::sync::Mutex<ClasspathLayout>>,
    ) -> Result<Vec<tokio::task::JoinHandle<std::result::Result<(), EntryFailure>>>> {
        let mut tasks = Vec::with_capacity(entries.len());

        for manifest_entry in entries {
            if patch::produces(&request.patches, category, &manifest_entry.path) {
                debug!(%category, path = %manifest_entry.path, "entry will be produced by a patch");
                continue;
            }

            // Blocks while max_concurrent_fetches tasks are already in flight
            let permit = self
                .concurrent_limit
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| Error::Other("concurrency limiter closed".to_string()))?;

            let ctx = EntryContext {
                category,
                entry: manifest_entry.clone(),
                output_root: request.output_root.clone(),
                bundle_path: resource_path(
                    &self.config.acquire.resource_prefix,
                    category,
                    &manifest_entry.path,
                ),
                resources: request.resources.clone(),
                archive: archive.clone(),
                resolver: Arc::clone(&self.resolver),
                create_directories: self.config.acquire.create_directories,
                event_tx: self.event_tx.clone(),
                layout: Arc::clone(layout),
            };

            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                acquire_entry(ctx).await
            }));
        }

        Ok(tasks)
    }

    /// Await one category's tasks, collecting per-entry failures
    ///
    /// The category-resolved event fires only when every task in the
    /// category succeeded.
    async fn await_category(
        &self,
        category: Category,
        tasks: Vec<tokio::task::JoinHandle<std::result::Result<(), EntryFailure>>>,
        layout: &Arc<tokio::sync::Mutex<ClasspathLayout>>,
        failures: &mut Vec<EntryFailure>,
    ) -> Result<()> {
        let failed_before = failures.len();
        for outcome in futures::future::join_all(tasks).await {
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(failure)) => failures.push(failure),
                Err(e) => return Err(Error::Other(format!("acquisition task panicked: {e}"))),
            }
        }

        if failures.len() == failed_before {
            let resolved = layout.lock().await.resolved(category);
            info!(%category, resolved, "category resolved");
            self.emit_event(AcquireEvent::CategoryResolved { category, resolved });
        }
        Ok(())
    }

    /// Emit an event to all subscribers
    ///
    /// send() returns Err when there are no receivers, which is fine - the
    /// event is dropped.
    pub(crate) fn emit_event(&self, event: AcquireEvent) {
        self.event_tx.send(event).ok();
    }
}
