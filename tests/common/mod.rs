//! Common test utilities for classpath-dl integration tests

use classpath_dl::integrity::digest_bytes;
use classpath_dl::{Config, ManifestEntry, RepositoryConfig};
use std::io::Write;
use std::path::Path;
use wiremock::matchers::method;
use wiremock::matchers::path as url_path;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Manifest entry whose declared hash matches `payload`
pub fn entry_for(payload: &[u8], id: &str, path: &str) -> ManifestEntry {
    ManifestEntry {
        hash: digest_bytes(payload),
        id: id.to_string(),
        path: path.to_string(),
    }
}

/// Configuration pointing at the mock server as the only repository
pub fn single_repo_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.repositories = vec![RepositoryConfig {
        id: "mock".to_string(),
        url: server.uri(),
        releases: true,
        snapshots: true,
    }];
    config
}

/// Serve `body` for GET requests to `path`
pub async fn mount_jar(server: &MockServer, path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(url_path(path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// Catch-all mock proving no request reaches the server at all
pub async fn mount_catch_all_expecting_none(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

/// Write a zip archive with the given `(name, bytes)` entries
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("create zip file");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for (name, bytes) in entries {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(bytes).expect("write zip entry");
    }
    writer.finish().expect("finish zip");
}
