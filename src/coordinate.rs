//! Maven coordinate model
//!
//! A declared [`Coordinate`] is immutable once parsed. Resolution outputs
//! (snapshot timestamps, descriptor-inferred packaging/classifier) live in a
//! separately constructed [`ResolvedCoordinate`], so concurrent tasks never
//! share mutable coordinate state.

use crate::error::{Error, Result};

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// A parsed `groupId:artifactId:version[:packaging[:classifier]]` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    /// Group id, dot-separated
    pub group_id: String,
    /// Artifact id
    pub artifact_id: String,
    /// Declared version, `-SNAPSHOT` suffix included when present
    pub version: String,
    /// Declared packaging, if the coordinate carried a fourth segment
    pub packaging: Option<String>,
    /// Declared classifier, if the coordinate carried a fifth segment
    pub classifier: Option<String>,
}

impl Coordinate {
    /// Parse a coordinate string
    ///
    /// Fewer than 3 segments or an empty group/artifact/version segment is
    /// rejected. Empty packaging/classifier segments are treated as absent;
    /// segments past the fifth are ignored.
    pub fn parse(coordinate: &str) -> Result<Self> {
        let parts: Vec<&str> = coordinate.split(':').collect();
        if parts.len() < 3 {
            return Err(Error::InvalidCoordinate {
                coordinate: coordinate.to_string(),
                reason: format!(
                    "expected at least 3 colon-separated segments, found {}",
                    parts.len()
                ),
            });
        }

        for (segment, name) in parts.iter().take(3).zip(["group", "artifact", "version"]) {
            if segment.is_empty() {
                return Err(Error::InvalidCoordinate {
                    coordinate: coordinate.to_string(),
                    reason: format!("{name} segment is empty"),
                });
            }
        }

        let optional = |index: usize| {
            parts
                .get(index)
                .filter(|segment| !segment.is_empty())
                .map(|segment| segment.to_string())
        };

        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version: parts[2].to_string(),
            packaging: optional(3),
            classifier: optional(4),
        })
    }

    /// Whether the declared version is a snapshot
    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with(SNAPSHOT_SUFFIX)
    }

    /// Declared version without any `-SNAPSHOT` suffix
    pub fn base_version(&self) -> &str {
        self.version
            .strip_suffix(SNAPSHOT_SUFFIX)
            .unwrap_or(&self.version)
    }

    /// Repository-relative directory path
    ///
    /// Always uses the declared version: a snapshot's directory name keeps its
    /// `-SNAPSHOT` suffix even after timestamp resolution.
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version
        )
    }

    /// Repository-relative path of the version's snapshot metadata document
    pub fn metadata_path(&self) -> String {
        format!("{}/maven-metadata.xml", self.repository_path())
    }

    /// Start resolution on this coordinate
    pub fn resolve(&self) -> ResolvedCoordinate {
        ResolvedCoordinate::new(self.clone())
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.group_id, self.artifact_id, self.version
        )?;
        match (&self.packaging, &self.classifier) {
            (Some(packaging), Some(classifier)) => write!(f, ":{packaging}:{classifier}"),
            (Some(packaging), None) => write!(f, ":{packaging}"),
            (None, Some(classifier)) => write!(f, ":jar:{classifier}"),
            (None, None) => Ok(()),
        }
    }
}

/// A resolved snapshot build identifier from repository metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotVersion {
    /// Build timestamp, e.g. `20240720.200737`
    pub timestamp: String,
    /// Build number, e.g. `2`
    pub build_number: String,
}

impl SnapshotVersion {
    /// Construct from explicit timestamp and build number
    pub fn new(timestamp: impl Into<String>, build_number: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            build_number: build_number.into(),
        }
    }

    /// Decompose a timestamped version value at its last two dashes
    ///
    /// `1.0-20240720.200737-2` yields timestamp `20240720.200737` and build
    /// number `2`. Values without two dashes yield `None`.
    pub fn from_timestamped_value(value: &str) -> Option<Self> {
        let (rest, build_number) = value.rsplit_once('-')?;
        let (_, timestamp) = rest.rsplit_once('-')?;
        if timestamp.is_empty() || build_number.is_empty() {
            return None;
        }
        Some(Self::new(timestamp, build_number))
    }
}

/// A declared coordinate paired with its resolution outputs
///
/// Built per repository attempt; never shared mutably. Packaging and
/// classifier overlays take precedence over the declared segments. The
/// resolver only sets an overlay when the declared segment is absent,
/// except for the forced-jar download fallback.
#[derive(Debug, Clone)]
pub struct ResolvedCoordinate {
    declared: Coordinate,
    snapshot: Option<SnapshotVersion>,
    packaging: Option<String>,
    classifier: Option<String>,
}

impl ResolvedCoordinate {
    /// Wrap a declared coordinate with no resolution outputs
    pub fn new(declared: Coordinate) -> Self {
        Self {
            declared,
            snapshot: None,
            packaging: None,
            classifier: None,
        }
    }

    /// The declared coordinate
    pub fn declared(&self) -> &Coordinate {
        &self.declared
    }

    /// Attach a resolved snapshot version
    pub fn with_snapshot(mut self, snapshot: SnapshotVersion) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Overlay a packaging (descriptor inference or forced jar fallback)
    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = Some(packaging.into());
        self
    }

    /// Overlay a classifier (descriptor inference)
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Effective packaging: overlay, else declared, else `jar`
    pub fn packaging(&self) -> &str {
        self.packaging
            .as_deref()
            .or(self.declared.packaging.as_deref())
            .unwrap_or("jar")
    }

    /// Effective classifier: overlay, else declared
    pub fn classifier(&self) -> Option<&str> {
        self.classifier
            .as_deref()
            .or(self.declared.classifier.as_deref())
    }

    /// File-name version: the resolved snapshot version when present, else
    /// the declared version
    pub fn actual_version(&self) -> String {
        match (&self.snapshot, self.declared.is_snapshot()) {
            (Some(snapshot), true) => format!(
                "{}-{}-{}",
                self.declared.base_version(),
                snapshot.timestamp,
                snapshot.build_number
            ),
            _ => self.declared.version.clone(),
        }
    }

    /// File extension derived from the effective packaging
    pub fn extension(&self) -> &str {
        extension_for(self.packaging())
    }

    /// Artifact file name: `artifactId-actualVersion[-classifier].extension`
    pub fn file_name(&self) -> String {
        let mut name = format!("{}-{}", self.declared.artifact_id, self.actual_version());
        if let Some(classifier) = self.classifier() {
            name.push('-');
            name.push_str(classifier);
        }
        name.push('.');
        name.push_str(self.extension());
        name
    }

    /// Repository-relative path of the artifact file
    pub fn remote_path(&self) -> String {
        format!("{}/{}", self.declared.repository_path(), self.file_name())
    }

    /// Repository-relative path of the project descriptor
    ///
    /// Classifier-free: `artifactId-actualVersion.pom`.
    pub fn descriptor_path(&self) -> String {
        format!(
            "{}/{}-{}.pom",
            self.declared.repository_path(),
            self.declared.artifact_id,
            self.actual_version()
        )
    }
}

/// Map a packaging string to a file extension
///
/// Known packagings come from a fixed table; unknown packagings that look like
/// plugin or OSGi artifacts fall back to jar; anything else is used verbatim.
pub fn extension_for(packaging: &str) -> &str {
    match packaging {
        "jar" | "maven-plugin" | "bundle" | "eclipse-plugin" | "eclipse-feature" | "ejb"
        | "ejb-client" | "test-jar" | "java-source" | "javadoc" | "gradle-plugin" => "jar",
        "war" => "war",
        "ear" => "ear",
        "rar" => "rar",
        "pom" => "pom",
        "zip" => "zip",
        "tar.gz" => "tar.gz",
        "tar.bz2" => "tar.bz2",
        other if other.contains("plugin") || other.contains("bundle") || other.contains("osgi") => {
            "jar"
        }
        other => other,
    }
}
