//! Patch record parsing and pre-acquisition validation

use crate::error::{Error, Result};
use crate::manifest::ManifestEntry;
use crate::types::Category;

/// One record from a patch list
///
/// Seven tab-separated fields per line:
/// `category\toriginalHash\tpatchHash\toutputHash\toriginalPath\tpatchPath\toutputPath`,
/// hashes hex-encoded SHA-256.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
    /// Category the produced file belongs to
    pub category: Category,
    /// Digest of the original input file
    pub original_hash: Vec<u8>,
    /// Digest of the patch file itself
    pub patch_hash: Vec<u8>,
    /// Digest the materialized output must have
    pub output_hash: Vec<u8>,
    /// Bundle-relative path of the original input
    pub original_path: String,
    /// Bundle-relative path of the patch file
    pub patch_path: String,
    /// Destination-relative path of the produced file
    pub output_path: String,
}

impl PatchRecord {
    /// Parse a single patch record line
    ///
    /// `line_number` is 1-based and only used for error reporting.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 7 {
            return Err(Error::MalformedManifest {
                line: line_number,
                expected: 7,
                fields: fields.len(),
                content: line.to_string(),
            });
        }

        let category = Category::from_dir_name(fields[0]).ok_or_else(|| {
            Error::Patch(format!(
                "record line {line_number} names unknown category {:?}",
                fields[0]
            ))
        })?;

        let hash = |index: usize| {
            hex::decode(fields[index]).map_err(|e| Error::InvalidHash {
                line: line_number,
                reason: e.to_string(),
            })
        };

        Ok(Self {
            category,
            original_hash: hash(1)?,
            patch_hash: hash(2)?,
            output_hash: hash(3)?,
            original_path: fields[4].to_string(),
            patch_path: fields[5].to_string(),
            output_path: fields[6].to_string(),
        })
    }
}

/// Parse a whole patch list, preserving record order
pub fn parse_patch_list(input: &str) -> Result<Vec<PatchRecord>> {
    input
        .lines()
        .enumerate()
        .map(|(index, line)| PatchRecord::parse_line(line, index + 1))
        .collect()
}

/// Whether any record produces `path` within `category`
pub fn produces(records: &[PatchRecord], category: Category, path: &str) -> bool {
    records
        .iter()
        .any(|record| record.category == category && record.output_path == path)
}

/// Check every record's output against the manifest that must expect it
///
/// A record whose output path matches no manifest entry is a hard error:
/// applying it would materialize a file nothing on the classpath references.
pub fn validate_against_manifests(
    records: &[PatchRecord],
    versions: &[ManifestEntry],
    libraries: &[ManifestEntry],
) -> Result<()> {
    for record in records {
        let manifest = match record.category {
            Category::Versions => versions,
            Category::Libraries => libraries,
        };
        if !manifest
            .iter()
            .any(|entry| entry.path == record.output_path)
        {
            return Err(Error::PatchTargetMissing {
                category: record.category,
                path: record.output_path.clone(),
            });
        }
    }
    Ok(())
}
