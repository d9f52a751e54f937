//! Repository metadata and project descriptor parsing
//!
//! Pure parsing over already-fetched XML text; the resolver owns the HTTP
//! side. Documents are modeled as serde structs fed by `quick_xml::de`, which
//! performs no DTD processing and no external entity resolution, so a
//! hostile descriptor cannot trigger reads beyond the document itself.

use crate::coordinate::{Coordinate, SnapshotVersion};
use crate::error::DescriptorError;
use serde::Deserialize;
use std::collections::HashMap;

const CLASSIFIER_PLUGINS: [&str; 2] = ["maven-jar-plugin", "maven-shade-plugin"];

/// Packaging and classifier inferred from a project descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorInference {
    /// Effective packaging, property-substituted, `jar` when absent
    pub packaging: String,
    /// Classifier override from a jar/shade plugin declaration, if any
    pub classifier: Option<String>,
}

// maven-metadata.xml

#[derive(Debug, Deserialize)]
struct MetadataDocument {
    versioning: Option<Versioning>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Versioning {
    snapshot: Option<SnapshotBlock>,
    snapshot_versions: Option<SnapshotVersionList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotBlock {
    timestamp: Option<String>,
    build_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SnapshotVersionList {
    #[serde(rename = "snapshotVersion", default)]
    entries: Vec<SnapshotVersionEntry>,
}

#[derive(Debug, Deserialize)]
struct SnapshotVersionEntry {
    value: Option<String>,
}

/// Parse snapshot metadata into a resolved snapshot version
///
/// Prefers the `<snapshot>` block when it carries both timestamp and build
/// number; otherwise decomposes the first `<snapshotVersion><value>` entry.
/// `Ok(None)` means the document held no usable snapshot information; the
/// caller proceeds with the declared version.
pub fn parse_snapshot_metadata(xml: &str) -> Result<Option<SnapshotVersion>, DescriptorError> {
    let document: MetadataDocument =
        quick_xml::de::from_str(xml).map_err(|e| DescriptorError::Parse(e.to_string()))?;

    let Some(versioning) = document.versioning else {
        return Ok(None);
    };

    if let Some(snapshot) = versioning.snapshot {
        if let (Some(timestamp), Some(build_number)) = (snapshot.timestamp, snapshot.build_number)
        {
            return Ok(Some(SnapshotVersion::new(timestamp, build_number)));
        }
    }

    Ok(versioning
        .snapshot_versions
        .and_then(|list| list.entries.into_iter().find_map(|entry| entry.value))
        .and_then(|value| SnapshotVersion::from_timestamped_value(&value)))
}

// Project descriptor (POM)

#[derive(Debug, Deserialize)]
struct ProjectDocument {
    packaging: Option<String>,
    properties: Option<HashMap<String, String>>,
    build: Option<BuildSection>,
    profiles: Option<ProfileList>,
}

#[derive(Debug, Deserialize)]
struct ProfileList {
    #[serde(rename = "profile", default)]
    entries: Vec<ProfileEntry>,
}

#[derive(Debug, Deserialize)]
struct ProfileEntry {
    build: Option<BuildSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildSection {
    plugins: Option<PluginList>,
    plugin_management: Option<PluginManagement>,
}

#[derive(Debug, Deserialize)]
struct PluginManagement {
    plugins: Option<PluginList>,
}

#[derive(Debug, Deserialize)]
struct PluginList {
    #[serde(rename = "plugin", default)]
    entries: Vec<PluginEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PluginEntry {
    artifact_id: Option<String>,
    configuration: Option<PluginConfiguration>,
    executions: Option<ExecutionList>,
}

#[derive(Debug, Deserialize)]
struct ExecutionList {
    #[serde(rename = "execution", default)]
    entries: Vec<ExecutionEntry>,
}

#[derive(Debug, Deserialize)]
struct ExecutionEntry {
    configuration: Option<PluginConfiguration>,
}

#[derive(Debug, Deserialize)]
struct PluginConfiguration {
    classifier: Option<String>,
}

/// Infer packaging and classifier from a project descriptor
///
/// The property table is seeded with `project.groupId` / `project.artifactId`
/// / `project.version` from the coordinate being resolved, then extended with
/// the descriptor's `<properties>` children. `${key}` tokens in packaging and
/// classifier values are substituted from that table; unknown keys stay
/// literal.
pub fn parse_project_descriptor(
    xml: &str,
    coordinate: &Coordinate,
) -> Result<DescriptorInference, DescriptorError> {
    let mut document: ProjectDocument =
        quick_xml::de::from_str(xml).map_err(|e| DescriptorError::Parse(e.to_string()))?;

    let mut properties = HashMap::new();
    properties.insert("project.groupId".to_string(), coordinate.group_id.clone());
    properties.insert(
        "project.artifactId".to_string(),
        coordinate.artifact_id.clone(),
    );
    properties.insert("project.version".to_string(), coordinate.version.clone());
    if let Some(declared) = document.properties.take() {
        properties.extend(declared);
    }

    let packaging = substitute(document.packaging.as_deref().unwrap_or("jar"), &properties);
    let classifier = classifier_override(&document).map(|raw| substitute(&raw, &properties));

    Ok(DescriptorInference {
        packaging,
        classifier,
    })
}

/// First classifier declared by a jar or shade plugin anywhere in the
/// document: the main build and every profile build, declared and managed
/// plugins alike
fn classifier_override(document: &ProjectDocument) -> Option<String> {
    let profile_builds = document
        .profiles
        .iter()
        .flat_map(|profiles| profiles.entries.iter())
        .filter_map(|profile| profile.build.as_ref());

    document
        .build
        .iter()
        .chain(profile_builds)
        .flat_map(|build| {
            build.plugins.iter().chain(
                build
                    .plugin_management
                    .iter()
                    .filter_map(|management| management.plugins.as_ref()),
            )
        })
        .flat_map(|list| list.entries.iter())
        .find_map(plugin_classifier)
}

/// A matching plugin's classifier, from its configuration or any of its
/// executions
fn plugin_classifier(plugin: &PluginEntry) -> Option<String> {
    let artifact_id = plugin.artifact_id.as_deref()?;
    if !CLASSIFIER_PLUGINS.contains(&artifact_id) {
        return None;
    }

    let direct = plugin
        .configuration
        .as_ref()
        .and_then(|configuration| configuration.classifier.clone());
    direct.or_else(|| {
        plugin
            .executions
            .iter()
            .flat_map(|executions| executions.entries.iter())
            .find_map(|execution| {
                execution
                    .configuration
                    .as_ref()
                    .and_then(|configuration| configuration.classifier.clone())
            })
    })
}

/// Replace `${key}` tokens with property values, leaving unknown keys literal
///
/// Bounded to a few rounds so property values referencing other properties
/// resolve without risking a substitution cycle.
fn substitute(value: &str, properties: &HashMap<String, String>) -> String {
    let mut current = value.to_string();

    for _ in 0..5 {
        if !current.contains("${") {
            break;
        }

        let mut out = String::with_capacity(current.len());
        let mut rest = current.as_str();
        let mut changed = false;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    match properties.get(key) {
                        Some(replacement) => {
                            out.push_str(replacement);
                            changed = true;
                        }
                        None => {
                            out.push_str("${");
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    // unterminated token, keep it literal
                    out.push_str("${");
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        current = out;
        if !changed {
            break;
        }
    }

    current
}
