//! Custom configuration example
//!
//! This example shows how to configure classpath-dl with various options:
//! - Multiple repositories with a preferred mirror
//! - Snapshot repository support
//! - Fetch concurrency, overwrite and directory policies
//! - HTTP timeouts and a custom user agent
//! - Embedded resources and an original archive as local sources
//! - Standalone single-artifact downloads

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use classpath_dl::config::{AcquireConfig, Config, HttpConfig, RepositoryConfig};
use classpath_dl::{
    AcquireRequest, ClasspathDownloader, Coordinate, DirResourceBundle, ResolverOptions,
    parse_manifest,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A corporate mirror tried before Maven Central, plus a snapshot host
    let mirror = RepositoryConfig {
        id: "mirror".to_string(),
        url: "https://repo.example.com/maven2/".to_string(),
        releases: true,
        snapshots: false,
    };
    let snapshots = RepositoryConfig {
        id: "snapshots".to_string(),
        url: "https://repo.example.com/snapshots/".to_string(),
        releases: false,
        snapshots: true,
    };

    let config = Config {
        repositories: vec![
            mirror,
            snapshots,
            RepositoryConfig::maven_central(),
        ],
        acquire: AcquireConfig {
            max_concurrent_fetches: 16,
            // Replace stale files on standalone downloads
            overwrite: true,
            // Keep walking the chain after a repository fails
            try_all_repositories: true,
            // Consult the mirror first regardless of declaration order
            preferred_repositories: vec!["mirror".to_string()],
            create_directories: true,
            // Retry a missing packaging-specific artifact as a plain jar
            fallback_to_jar: true,
            // Where embedded lookups search inside the bundle
            resource_prefix: "embedded/".to_string(),
        },
        http: HttpConfig {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            user_agent: "my-launcher/2.0".to_string(),
        },
    };

    let downloader = ClasspathDownloader::new(config)?;

    // Local sources consulted before any network traffic: a directory
    // standing in for resources bundled with the program, and the original
    // distribution archive whose entries can satisfy manifest paths
    let mut request = AcquireRequest::new(
        "classpath",
        parse_manifest(
            "a665a45920422f9d417e4867efdc4fb8a04a1f3fff1fa07e998e86f7f7a27ae3\t1.21.5\t1.21.5.jar\n",
        )?,
        parse_manifest(
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824\torg.slf4j:slf4j-api:2.0.12\torg/slf4j/slf4j-api/2.0.12/slf4j-api-2.0.12.jar\n",
        )?,
    );
    request.resources = Some(Arc::new(DirResourceBundle::new("bundled")));
    request.original_archive = Some("cache/original.jar".into());

    let layout = downloader.acquire(request).await?;
    println!("{} files on the classpath", layout.classpath().len());

    // Outside any manifest, single artifacts resolve through the same
    // repository chain; options override the repository-layout destination
    let coordinate = Coordinate::parse("com.google.code.gson:gson:2.11.0")?;
    let download = downloader
        .download_artifact(
            &coordinate,
            Path::new("downloads"),
            &ResolverOptions {
                file_name: Some("gson.jar".to_string()),
                ..Default::default()
            },
        )
        .await?;
    println!(
        "gson from {}: {}",
        download.repository.as_deref().unwrap_or("existing file"),
        download.file.display()
    );

    Ok(())
}
