//! Input discovery
//!
//! Lists every candidate document below a repository root and buckets it
//! by extension. Ordering within each bucket is by path.
//!
//! JSON documents and profiles can be limited to a set of source
//! directories relative to the root. Manifests are always collected from
//! the whole tree, since they may describe sources anywhere.

use crate::fs::{FileSystem, WalkOptions};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

const JSON_EXTENSION: &str = "json";
const BUNDLE_EXTENSION: &str = "mobileconfig";
const MANIFEST_EXTENSION: &str = "xml";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    pub json: Vec<PathBuf>,
    pub bundles: Vec<PathBuf>,
    pub manifests: Vec<PathBuf>,
}

impl SourceSet {
    pub fn total(&self) -> usize {
        self.json.len() + self.bundles.len() + self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

pub fn discover(
    fs: &dyn FileSystem,
    root: &Path,
    options: WalkOptions,
    source_dirs: &[PathBuf],
) -> Result<SourceSet> {
    let start = Instant::now();

    if !fs.is_dir(root) {
        anyhow::bail!("Input root is not a directory: {}", root.display());
    }

    let files = fs
        .walk_files(root, options)
        .with_context(|| format!("Failed to list files under {}", root.display()))?;

    let mut sources = SourceSet::default();
    for path in files {
        match path.extension().and_then(|e| e.to_str()) {
            Some(MANIFEST_EXTENSION) => sources.manifests.push(path),
            Some(JSON_EXTENSION) | Some(BUNDLE_EXTENSION)
                if !in_scope(root, &path, source_dirs) =>
            {
                debug!("outside source directories: {}", path.display())
            }
            Some(JSON_EXTENSION) => sources.json.push(path),
            Some(BUNDLE_EXTENSION) => sources.bundles.push(path),
            _ => debug!("ignoring {}", path.display()),
        }
    }

    info!(
        json = sources.json.len(),
        bundles = sources.bundles.len(),
        manifests = sources.manifests.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "discovered sources under {}",
        root.display()
    );

    Ok(sources)
}

fn in_scope(root: &Path, path: &Path, source_dirs: &[PathBuf]) -> bool {
    if source_dirs.is_empty() {
        return true;
    }
    let relative = path.strip_prefix(root).unwrap_or(path);
    source_dirs.iter().any(|dir| relative.starts_with(dir))
}
