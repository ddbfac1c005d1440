//! Core records produced by extraction and aggregation

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

crate::define_label_enum! {
    /// Classification of a configuration artifact
    ArtifactType {
        Policy => "Policy",
        CustomConfig => "CustomConfig",
        Compliance => "Compliance",
        Script => "Script",
        CustomAttribute => "CustomAttribute",
        Package => "Package",
        Unknown => "Unknown",
    }
}

impl ArtifactType {
    /// Kinds that only exist as sidecar manifests, with settings taken from
    /// the manifest subtree of the same name.
    pub fn is_manifest_only(&self) -> bool {
        matches!(
            self,
            ArtifactType::Script | ArtifactType::Package | ArtifactType::CustomAttribute
        )
    }
}

/// A single extracted (key, value) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One documented configuration artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub reference: String,
    pub artifact_type: ArtifactType,
    pub relpath: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub settings: Vec<Setting>,
}

impl Artifact {
    pub fn new(
        reference: impl Into<String>,
        artifact_type: ArtifactType,
        relpath: impl Into<String>,
        settings: Vec<Setting>,
    ) -> Self {
        Self {
            reference: reference.into(),
            artifact_type,
            relpath: relpath.into(),
            name: None,
            description: None,
            settings,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn count(&self) -> usize {
        self.settings.len()
    }

    /// Deduplication identity: (ref, type, relative path)
    pub fn identity(&self) -> (&str, &str, &str) {
        (
            self.reference.as_str(),
            self.artifact_type.as_str(),
            self.relpath.as_str(),
        )
    }
}

impl Serialize for Artifact {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Artifact", 7)?;
        state.serialize_field("ref", &self.reference)?;
        state.serialize_field("type", &self.artifact_type)?;
        state.serialize_field("relpath", &self.relpath)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("count", &self.count())?;
        state.serialize_field("settings", &self.settings)?;
        state.end()
    }
}
