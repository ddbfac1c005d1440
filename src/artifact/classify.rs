use super::ArtifactType;
use crate::parsers::Manifest;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

const PROFILE_EXTENSION: &str = ".mobileconfig";

/// Derives an artifact's type from its `xxx-yyy-NNN` file name prefix.
pub struct ArtifactClassifier {
    convention: Regex,
    prefixes: HashMap<&'static str, ArtifactType>,
}

impl Default for ArtifactClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactClassifier {
    pub fn new() -> Self {
        let prefixes = HashMap::from([
            ("pol", ArtifactType::Policy),
            ("cfg", ArtifactType::CustomConfig),
            ("cmp", ArtifactType::Compliance),
            ("scr", ArtifactType::Script),
            ("cat", ArtifactType::CustomAttribute),
            ("app", ArtifactType::Package),
        ]);

        Self {
            convention: Regex::new(r"^([a-z]{3})-([a-z]{3})-(\d{3})").expect("valid regex"),
            prefixes,
        }
    }

    pub fn classify(&self, path: &Path) -> ArtifactType {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if let Some(caps) = self.convention.captures(&name) {
            return self
                .prefixes
                .get(&caps[1])
                .cloned()
                .unwrap_or(ArtifactType::Unknown);
        }

        if name.ends_with(PROFILE_EXTENSION) {
            ArtifactType::CustomConfig
        } else {
            ArtifactType::Policy
        }
    }

    /// Manifest `Type` wins over the file name when present.
    pub fn resolve(&self, path: &Path, manifest: Option<&Manifest>) -> ArtifactType {
        manifest
            .and_then(Manifest::declared_type)
            .unwrap_or_else(|| self.classify(path))
    }
}
