//! Content integrity checking
//!
//! The digest algorithm is fixed: **SHA-256**, the algorithm used to populate
//! the manifests this crate consumes. It is part of the manifest contract, not
//! inferred from hash length.

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Digest a byte slice
pub fn digest_bytes(bytes: &[u8]) -> Vec<u8> {
    Sha256::digest(bytes).to_vec()
}

/// Digest a file's content, reading in chunks
pub fn digest_file(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize().to_vec())
}

/// Whether the file at `path` exists and matches `expected`
///
/// Returns false, never an error, when the file is missing or unreadable.
pub fn is_file_valid_sync(path: &Path, expected: &[u8]) -> bool {
    match digest_file(path) {
        Ok(digest) => digest == expected,
        Err(_) => false,
    }
}

/// Async wrapper around [`is_file_valid_sync`]
///
/// Digesting runs on the blocking pool so large artifacts do not stall the
/// runtime.
pub async fn is_file_valid(path: &Path, expected: &[u8]) -> bool {
    let path = path.to_path_buf();
    let expected = expected.to_vec();
    tokio::task::spawn_blocking(move || is_file_valid_sync(&path, &expected))
        .await
        .unwrap_or(false)
}

/// Async wrapper around [`digest_file`], for callers that need the digest
/// itself rather than a validity verdict
pub async fn digest_file_async(path: &Path) -> std::io::Result<Vec<u8>> {
    let path = path.to_path_buf();
    match tokio::task::spawn_blocking(move || digest_file(&path)).await {
        Ok(result) => result,
        Err(join) => Err(std::io::Error::other(join.to_string())),
    }
}
