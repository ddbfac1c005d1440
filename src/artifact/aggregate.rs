//! Aggregation of every discovered source into one ordered artifact list
//!
//! Three passes run in a fixed order: JSON documents, profile bundles, then
//! standalone manifests. A document that fails to load is logged and left
//! out; nothing here aborts the run.

use super::{Artifact, ArtifactClassifier, ArtifactType, Setting};
use crate::config::MdmdocConfig;
use crate::discovery::{self, SourceSet};
use crate::error::{ExtractError, ExtractResult};
use crate::extract::normalize::ValueNormalizer;
use crate::extract::payload::PAYLOAD_DISPLAY_NAME;
use crate::extract::{DocumentShape, Extraction, FormatDetector};
use crate::fs::{FileSystem, WalkOptions};
use crate::parsers::property_list::{unsupported_encoding, BINARY_MAGIC};
use crate::parsers::{parse_plist, Manifest, PlistError};
use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const BOM: char = '\u{feff}';
const SNIFF_BYTES: usize = 8;
const SIDECAR_EXTENSION: &str = "xml";
const JSON_SUFFIX: &str = ".json";
const BUNDLE_SUFFIX: &str = ".mobileconfig";

pub struct ArtifactAggregator {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    config: MdmdocConfig,
    detector: FormatDetector,
    classifier: ArtifactClassifier,
}

impl ArtifactAggregator {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>, config: MdmdocConfig) -> Self {
        let detector = FormatDetector::new(
            Arc::new(ValueNormalizer::new()),
            config.manifest_tag.clone(),
        );

        Self {
            fs,
            root: root.into(),
            config,
            detector,
            classifier: ArtifactClassifier::new(),
        }
    }

    /// Discovers sources under the root and aggregates them.
    pub fn run(&self) -> Result<Vec<Artifact>> {
        let options = WalkOptions {
            respect_gitignore: self.config.respect_gitignore,
        };
        let sources = discovery::discover(
            self.fs.as_ref(),
            &self.root,
            options,
            &self.config.source_dirs,
        )?;
        Ok(self.aggregate(&sources))
    }

    pub fn aggregate(&self, sources: &SourceSet) -> Vec<Artifact> {
        let start = Instant::now();
        let mut artifacts = Vec::with_capacity(sources.total());

        for path in &sources.json {
            if let Some(artifact) = self.json_artifact(path) {
                artifacts.push(artifact);
            }
        }

        for path in &sources.bundles {
            if let Some(artifact) = self.bundle_artifact(path) {
                artifacts.push(artifact);
            }
        }

        for path in &sources.manifests {
            if let Some(artifact) = self.manifest_artifact(path, &artifacts) {
                artifacts.push(artifact);
            }
        }

        let collected = artifacts.len();
        let merged = merge(artifacts);

        info!(
            artifacts = merged.len(),
            duplicates = collected - merged.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "aggregation complete"
        );

        merged
    }

    fn json_artifact(&self, path: &Path) -> Option<Artifact> {
        let doc = match self.load_json(path) {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                debug!("skipping empty document {}", path.display());
                return None;
            }
            Err(e) => {
                warn!(path = %e.path().display(), "{}", e);
                return None;
            }
        };

        let extraction = self.detector.extract_json(&doc);
        debug!(
            shape = ?extraction.shape,
            settings = extraction.settings.len(),
            "extracted {}",
            path.display()
        );

        let sidecar = self.sidecar(path);
        let artifact_type = self.classifier.resolve(path, sidecar.as_ref());

        Some(
            Artifact::new(
                file_stem(path),
                artifact_type,
                self.relpath(path),
                extraction.settings,
            )
            .with_name(sidecar.as_ref().and_then(|m| m.name.clone()))
            .with_description(sidecar.and_then(|m| m.description)),
        )
    }

    fn bundle_artifact(&self, path: &Path) -> Option<Artifact> {
        let doc = match self.load_bundle(path) {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                debug!("skipping empty profile {}", path.display());
                return None;
            }
            Err(e) => {
                warn!(path = %e.path().display(), "{}", e);
                return None;
            }
        };

        let extraction = self.detector.extract_bundle(&doc);
        debug!(
            settings = extraction.settings.len(),
            "extracted {}",
            path.display()
        );

        let sidecar = self.sidecar(path);
        let artifact_type = self.classifier.resolve(path, sidecar.as_ref());
        let name = sidecar
            .as_ref()
            .and_then(|m| m.name.clone())
            .or_else(|| {
                doc.get(PAYLOAD_DISPLAY_NAME)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });

        Some(
            Artifact::new(
                file_stem(path),
                artifact_type,
                self.relpath(path),
                extraction.settings,
            )
            .with_name(name)
            .with_description(sidecar.and_then(|m| m.description)),
        )
    }

    fn manifest_artifact(&self, path: &Path, existing: &[Artifact]) -> Option<Artifact> {
        let manifest = match self.load_manifest(path) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(path = %e.path().display(), "{}", e);
                return None;
            }
        };

        if manifest.root_tag != self.detector.manifest_tag() {
            return None;
        }

        let (Some(declared), Some(source)) =
            (manifest.artifact_type.as_deref(), manifest.source_file.as_deref())
        else {
            debug!("manifest {} lacks Type or SourceFile", path.display());
            return None;
        };

        let artifact_type = ArtifactType::parse(declared);
        if covered_by_primary_pass(&artifact_type, source) {
            return None;
        }
        if existing.iter().any(|a| a.relpath == source) {
            return None;
        }

        let settings = manifest_settings(&manifest, &artifact_type);

        let source_path = Path::new(source);
        let reference = if self.fs.exists(&self.root.join(source_path)) {
            file_stem(source_path)
        } else {
            file_stem(path)
        };

        debug!(
            settings = settings.len(),
            "manifest {} describes {} {}",
            path.display(),
            artifact_type,
            source
        );

        Some(
            Artifact::new(reference, artifact_type, source, settings)
                .with_name(manifest.name)
                .with_description(manifest.description),
        )
    }

    /// Detects and extracts a single document, whatever its kind.
    pub fn inspect(&self, path: &Path) -> ExtractResult<Extraction> {
        self.reject_unsupported_plist(path)?;
        let bytes = self.load_bytes(path)?;

        let shape = if bytes.starts_with(BINARY_MAGIC) {
            Some(DocumentShape::PayloadBundle)
        } else {
            let content = decode_text(path, bytes)?;
            self.detector.detect_file(path, &content)
        };

        match shape {
            Some(DocumentShape::PayloadBundle) => {
                let doc = self
                    .load_bundle(path)?
                    .unwrap_or_else(|| Value::Object(Map::new()));
                Ok(self.detector.extract_bundle(&doc))
            }
            Some(DocumentShape::ManifestDescriptor) => {
                let manifest = self.load_manifest(path)?;
                let settings = manifest
                    .declared_type()
                    .map(|t| manifest_settings(&manifest, &t))
                    .unwrap_or_default();
                Ok(Extraction {
                    shape: Some(DocumentShape::ManifestDescriptor),
                    settings,
                })
            }
            _ => match self.load_json(path)? {
                Some(doc) => Ok(self.detector.extract_json(&doc)),
                None => Ok(Extraction {
                    shape: None,
                    settings: Vec::new(),
                }),
            },
        }
    }

    /// Parsed JSON object, or `None` for an empty object.
    pub fn load_json(&self, path: &Path) -> ExtractResult<Option<Value>> {
        let content = self.load_text(path)?;
        let doc: Value = serde_json::from_str(&content).map_err(|source| ExtractError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        match doc.as_object() {
            None => Err(ExtractError::NotAnObject {
                path: path.to_path_buf(),
            }),
            Some(map) if map.is_empty() => Ok(None),
            Some(_) => Ok(Some(doc)),
        }
    }

    /// Parsed profile bundle, XML or binary, or `None` for an empty
    /// top-level dictionary.
    pub fn load_bundle(&self, path: &Path) -> ExtractResult<Option<Value>> {
        self.reject_unsupported_plist(path)?;
        let bytes = self.load_bytes(path)?;
        let doc = parse_plist(&bytes).map_err(|e| ExtractError::Plist {
            path: path.to_path_buf(),
            message: match e {
                PlistError::Parse(source) => source.to_string(),
                PlistError::Malformed(message) => message,
            },
        })?;

        match doc.as_object() {
            Some(map) if map.is_empty() => Ok(None),
            _ => Ok(Some(doc)),
        }
    }

    pub fn load_manifest(&self, path: &Path) -> ExtractResult<Manifest> {
        let content = self.load_text(path)?;
        Manifest::parse(&content).map_err(|source| ExtractError::Xml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn reject_unsupported_plist(&self, path: &Path) -> ExtractResult<()> {
        let head = self
            .fs
            .read_bytes(path, SNIFF_BYTES)
            .map_err(|e| read_error(path, e))?;

        match unsupported_encoding(&head) {
            Some(encoding) => Err(ExtractError::UnsupportedPlist {
                path: path.to_path_buf(),
                encoding: encoding.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn load_bytes(&self, path: &Path) -> ExtractResult<Vec<u8>> {
        let metadata = self.fs.metadata(path).map_err(|e| read_error(path, e))?;
        if metadata.len() > self.config.max_file_size_bytes {
            return Err(ExtractError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.config.max_file_size_bytes,
            });
        }

        self.fs.read(path).map_err(|e| read_error(path, e))
    }

    fn load_text(&self, path: &Path) -> ExtractResult<String> {
        let bytes = self.load_bytes(path)?;
        decode_text(path, bytes)
    }

    /// Same-named `.xml` next to a primary artifact. Its root tag is not
    /// checked.
    fn sidecar(&self, path: &Path) -> Option<Manifest> {
        let sidecar_path = path.with_extension(SIDECAR_EXTENSION);
        if !self.fs.is_file(&sidecar_path) {
            return None;
        }

        match self.load_manifest(&sidecar_path) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!(path = %e.path().display(), "{}", e);
                None
            }
        }
    }

    fn relpath(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Drops later duplicates of (ref, type, relpath), then sorts by ref.
/// The sort is stable, so equal refs keep their pass order.
pub fn merge(artifacts: Vec<Artifact>) -> Vec<Artifact> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Artifact> = artifacts
        .into_iter()
        .filter(|a| {
            let (reference, artifact_type, relpath) = a.identity();
            seen.insert((
                reference.to_string(),
                artifact_type.to_string(),
                relpath.to_string(),
            ))
        })
        .collect();

    merged.sort_by(|a, b| a.reference.cmp(&b.reference));
    merged
}

/// Manifest-only kinds take their settings from the subtree named after
/// the type; every other kind has none.
fn manifest_settings(manifest: &Manifest, artifact_type: &ArtifactType) -> Vec<Setting> {
    if !artifact_type.is_manifest_only() {
        return Vec::new();
    }
    manifest
        .section(artifact_type.as_str())
        .map(<[Setting]>::to_vec)
        .unwrap_or_default()
}

fn covered_by_primary_pass(artifact_type: &ArtifactType, source: &str) -> bool {
    match artifact_type {
        ArtifactType::Policy | ArtifactType::Compliance => source.ends_with(JSON_SUFFIX),
        ArtifactType::CustomConfig => {
            source.ends_with(JSON_SUFFIX) || source.ends_with(BUNDLE_SUFFIX)
        }
        _ => false,
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// UTF-8 text with any leading byte-order mark removed.
fn decode_text(path: &Path, bytes: Vec<u8>) -> ExtractResult<String> {
    let content = String::from_utf8(bytes).map_err(|e| ExtractError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(match content.strip_prefix(BOM) {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

fn read_error(path: &Path, e: anyhow::Error) -> ExtractError {
    ExtractError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
