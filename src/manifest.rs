//! Manifest parsing and serialization
//!
//! A manifest is UTF-8 text with one record per line, exactly three
//! tab-separated fields: `hexHash\tid\tpath`. No header, no comments. Entry
//! order is significant: it is the classpath order within a category.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One required file declared by a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Expected SHA-256 content digest
    pub hash: Vec<u8>,
    /// Stable identity: a coordinate string for libraries, a version
    /// identifier for versions entries
    pub id: String,
    /// Destination-relative path below the category directory
    pub path: String,
}

impl ManifestEntry {
    /// Parse a single manifest line
    ///
    /// `line_number` is 1-based and only used for error reporting.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(Error::MalformedManifest {
                line: line_number,
                expected: 3,
                fields: fields.len(),
                content: line.to_string(),
            });
        }

        let hash = hex::decode(fields[0]).map_err(|e| Error::InvalidHash {
            line: line_number,
            reason: e.to_string(),
        })?;

        Ok(Self {
            hash,
            id: fields[1].to_string(),
            path: fields[2].to_string(),
        })
    }

    /// The expected digest, hex-encoded
    pub fn hash_hex(&self) -> String {
        hex::encode(&self.hash)
    }

    /// Render the entry back to its manifest line form
    pub fn to_line(&self) -> String {
        format!("{}\t{}\t{}", self.hash_hex(), self.id, self.path)
    }
}

/// Parse a whole manifest, preserving line order
///
/// Empty input yields an empty list. Any line without exactly three fields is
/// fatal and names the offending line.
pub fn parse_manifest(input: &str) -> Result<Vec<ManifestEntry>> {
    input
        .lines()
        .enumerate()
        .map(|(index, line)| ManifestEntry::parse_line(line, index + 1))
        .collect()
}

/// Serialize entries back to manifest text
///
/// `parse_manifest(serialize_manifest(entries)) == entries` for all valid
/// entry lists.
pub fn serialize_manifest(entries: &[ManifestEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.to_line());
        out.push('\n');
    }
    out
}
