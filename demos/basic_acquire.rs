//! Basic classpath acquisition example
//!
//! This example demonstrates the core functionality of classpath-dl:
//! - Configuring remote repositories
//! - Creating a downloader instance
//! - Subscribing to events
//! - Acquiring a manifest pair into a classpath directory
//! - Reading the resolved, ordered classpath

use classpath_dl::config::{AcquireConfig, Config, RepositoryConfig};
use classpath_dl::{AcquireEvent, AcquireRequest, ClasspathDownloader, parse_manifest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    // Build configuration: Maven Central plus a bounded fetch pool
    let config = Config {
        repositories: vec![RepositoryConfig::maven_central()],
        acquire: AcquireConfig {
            max_concurrent_fetches: 4,
            ..Default::default()
        },
        ..Default::default()
    };

    // Create downloader instance
    let downloader = ClasspathDownloader::new(config)?;

    // Subscribe to events
    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                AcquireEvent::EntryStarted { path, .. } => {
                    println!("Started: {path}");
                }
                AcquireEvent::EntryResolved { path, source, .. } => {
                    println!("Resolved {path} from {source}");
                }
                AcquireEvent::EntryFailed { path, error, .. } => {
                    println!("Failed {path}: {error}");
                }
                AcquireEvent::CategoryResolved { category, resolved } => {
                    println!("Category {category} complete ({resolved} entries)");
                }
                _ => {}
            }
        }
    });

    // Manifests are tab-separated text: hexHash, id, destination path.
    // In a real application these ship alongside the program being prepared.
    let versions = parse_manifest(
        "a665a45920422f9d417e4867efdc4fb8a04a1f3fff1fa07e998e86f7f7a27ae3\t1.21.5\t1.21.5.jar\n",
    )?;
    let libraries = parse_manifest(
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824\tcom.google.guava:guava:33.0.0-jre\tcom/google/guava/guava/33.0.0-jre/guava-33.0.0-jre.jar\n",
    )?;

    // Acquire everything into ./classpath
    let layout = downloader
        .acquire(AcquireRequest::new("classpath", versions, libraries))
        .await?;

    // The classpath is ordered: versions first, then libraries, each in
    // manifest order
    println!("\nResolved classpath:");
    for file in layout.classpath() {
        println!("  {}", file.display());
    }

    Ok(())
}
