//! HTTP byte movement and file writes
//!
//! Thin transfer layer shared by the resolver and the acquisition tiers. All
//! functions take the shared [`reqwest::Client`] so connection pooling spans
//! every concurrent task. Directory creation is the caller's concern: these
//! functions write exactly where they are told.

use crate::error::{DescriptorError, TransferError};
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Write an in-memory body to `path`
pub async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), TransferError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| TransferError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Stream a remote body to `path`
///
/// Non-success statuses fail before anything touches disk. If the body read
/// or a write fails midway, the partial file is removed so a later attempt
/// never mistakes it for a finished artifact.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
) -> Result<(), TransferError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| TransferError::Request {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(TransferError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let result = stream_body(response, url, path).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(path).await;
    }
    result
}

async fn stream_body(
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<(), TransferError> {
    let write_error = |source| TransferError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(path).await.map_err(write_error)?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| TransferError::Request {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(write_error)?;
    }

    file.flush().await.map_err(write_error)
}

/// Fetch a small text document (repository metadata, project descriptors)
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, DescriptorError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| DescriptorError::Fetch {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(DescriptorError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|source| DescriptorError::Fetch {
            url: url.to_string(),
            source,
        })
}
