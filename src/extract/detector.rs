//! Document shape detection and extractor dispatch

use super::compliance::{CompliancePolicyExtractor, EnrollmentRestrictionExtractor};
use super::normalize::ValueNormalizer;
use super::payload::{PayloadExtractor, PAYLOAD_CONTENT};
use super::settings_catalog::SettingsCatalogExtractor;
use super::SettingsExtractor;
use crate::artifact::Setting;
use crate::config::DEFAULT_MANIFEST_TAG;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

const TYPE_MARKER: &str = "@odata.type";
const COMPLIANCE_MARKER: &str = "CompliancePolicy";
const ENROLLMENT_RESTRICTION_MARKER: &str = "deviceEnrollmentPlatformRestriction";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentShape {
    SettingsCatalog,
    CompliancePolicy,
    EnrollmentRestriction,
    PayloadBundle,
    ManifestDescriptor,
}

impl fmt::Display for DocumentShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentShape::SettingsCatalog => "settings catalog",
            DocumentShape::CompliancePolicy => "compliance policy",
            DocumentShape::EnrollmentRestriction => "enrollment restriction",
            DocumentShape::PayloadBundle => "payload bundle",
            DocumentShape::ManifestDescriptor => "manifest descriptor",
        };
        f.write_str(name)
    }
}

/// Result of running the detector over one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub shape: Option<DocumentShape>,
    pub settings: Vec<Setting>,
}

pub struct FormatDetector {
    settings_catalog: SettingsCatalogExtractor,
    compliance: CompliancePolicyExtractor,
    enrollment_restriction: EnrollmentRestrictionExtractor,
    payload: PayloadExtractor,
    manifest_tag: String,
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::new(Arc::new(ValueNormalizer::default()), DEFAULT_MANIFEST_TAG)
    }
}

impl FormatDetector {
    pub fn new(normalizer: Arc<ValueNormalizer>, manifest_tag: impl Into<String>) -> Self {
        Self {
            settings_catalog: SettingsCatalogExtractor::new(normalizer.clone()),
            compliance: CompliancePolicyExtractor::new(normalizer.clone()),
            enrollment_restriction: EnrollmentRestrictionExtractor::new(normalizer.clone()),
            payload: PayloadExtractor::new(normalizer),
            manifest_tag: manifest_tag.into(),
        }
    }

    pub fn manifest_tag(&self) -> &str {
        &self.manifest_tag
    }

    /// Shape declared by a JSON document's type marker and fields.
    pub fn detect(&self, doc: &Value) -> Option<DocumentShape> {
        let marker = type_marker(doc);

        if doc.get("settings").map(Value::is_array).unwrap_or(false) {
            Some(DocumentShape::SettingsCatalog)
        } else if marker.contains(COMPLIANCE_MARKER) {
            Some(DocumentShape::CompliancePolicy)
        } else if marker.ends_with(ENROLLMENT_RESTRICTION_MARKER) {
            Some(DocumentShape::EnrollmentRestriction)
        } else if doc.get(PAYLOAD_CONTENT).map(Value::is_array).unwrap_or(false) {
            Some(DocumentShape::PayloadBundle)
        } else {
            None
        }
    }

    /// Runs the JSON extractor chain: settings catalog, then compliance
    /// policy, then enrollment restriction. An unmatched document yields no
    /// settings.
    pub fn extract_json(&self, doc: &Value) -> Extraction {
        let marker = type_marker(doc);

        let settings = self.settings_catalog.extract(doc);
        if !settings.is_empty() {
            return Extraction {
                shape: Some(DocumentShape::SettingsCatalog),
                settings,
            };
        }

        if marker.contains(COMPLIANCE_MARKER) {
            let settings = self.compliance.extract(doc);
            if !settings.is_empty() {
                return Extraction {
                    shape: Some(DocumentShape::CompliancePolicy),
                    settings,
                };
            }
        }

        if marker.ends_with(ENROLLMENT_RESTRICTION_MARKER) {
            let settings = self.enrollment_restriction.extract(doc);
            if !settings.is_empty() {
                return Extraction {
                    shape: Some(DocumentShape::EnrollmentRestriction),
                    settings,
                };
            }
        }

        trace!("no extractor produced settings (marker: '{}')", marker);
        Extraction {
            shape: self.detect(doc),
            settings: Vec::new(),
        }
    }

    /// Extracts a parsed profile bundle.
    pub fn extract_bundle(&self, doc: &Value) -> Extraction {
        Extraction {
            shape: Some(DocumentShape::PayloadBundle),
            settings: self.payload.extract(doc),
        }
    }

    /// Classifies raw file content, falling back to the extension only when
    /// the content itself is not conclusive.
    pub fn detect_file(&self, path: &Path, content: &str) -> Option<DocumentShape> {
        let trimmed = content.trim_start_matches('\u{feff}').trim_start();

        if trimmed.starts_with('{') {
            if let Ok(doc) = serde_json::from_str::<Value>(trimmed) {
                return self.detect(&doc);
            }
        } else if trimmed.starts_with('<') {
            if let Some(root) = xml_root_tag(trimmed) {
                if root == "plist" {
                    return Some(DocumentShape::PayloadBundle);
                }
                if root == self.manifest_tag {
                    return Some(DocumentShape::ManifestDescriptor);
                }
            }
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some("mobileconfig") => Some(DocumentShape::PayloadBundle),
            _ => None,
        }
    }
}

fn type_marker(doc: &Value) -> &str {
    doc.get(TYPE_MARKER).and_then(Value::as_str).unwrap_or("")
}

fn xml_root_tag(content: &str) -> Option<String> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    roxmltree::Document::parse_with_options(content, options)
        .ok()
        .map(|doc| doc.root_element().tag_name().name().to_string())
}
