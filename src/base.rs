//! Base artifact download context
//!
//! A one-line record describing the original upstream archive:
//! `hexHash<TAB>url<TAB>fileName`. The ensured file is mounted as the
//! archived-original source during acquisition and handed to the patch
//! engine as its original input.

use crate::error::{Error, Result, TransferError};
use crate::integrity;
use crate::transfer;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CACHE_DIR: &str = "cache";

/// The original base artifact: content hash, origin URL, local file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseArtifact {
    /// Expected SHA-256 digest of the archive
    pub hash: Vec<u8>,
    /// Where the archive can be downloaded from
    pub url: String,
    /// File name the archive is cached under
    pub file_name: String,
}

impl BaseArtifact {
    /// Parse the single-line context record
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 || fields.iter().any(|field| field.is_empty()) {
            return Err(Error::MalformedManifest {
                line: 1,
                expected: 3,
                fields: fields.len(),
                content: line.to_string(),
            });
        }

        let hash = hex::decode(fields[0]).map_err(|e| Error::InvalidHash {
            line: 1,
            reason: e.to_string(),
        })?;

        Ok(Self {
            hash,
            url: fields[1].to_string(),
            file_name: fields[2].to_string(),
        })
    }

    /// Serialize back to the single-line record form
    pub fn to_line(&self) -> String {
        format!("{}\t{}\t{}", hex::encode(&self.hash), self.url, self.file_name)
    }

    /// Where the archive lives under `root`
    pub fn cache_path(&self, root: &Path) -> PathBuf {
        root.join(CACHE_DIR).join(&self.file_name)
    }

    /// Make the archive available locally, downloading it when needed
    ///
    /// A cached copy matching the expected digest is reused as-is. Otherwise
    /// the archive is downloaded and verified; a digest mismatch here is
    /// fatal, since nothing else can stand in for the original.
    pub async fn ensure(&self, client: &reqwest::Client, root: &Path) -> Result<PathBuf> {
        let target = self.cache_path(root);

        if integrity::is_file_valid(&target, &self.hash).await {
            debug!(file = %target.display(), "base artifact cache is valid");
            return Ok(target);
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(url = %self.url, file = %target.display(), "downloading base artifact");
        transfer::download_to_file(client, &self.url, &target).await?;

        let actual = integrity::digest_file_async(&target).await?;
        if actual != self.hash {
            let _ = tokio::fs::remove_file(&target).await;
            return Err(TransferError::DigestMismatch {
                path: target,
                expected: hex::encode(&self.hash),
                actual: hex::encode(actual),
            }
            .into());
        }

        Ok(target)
    }
}
