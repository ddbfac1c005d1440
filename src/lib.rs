//! mdmdoc - configuration artifact extraction for device-management repositories
//!
//! Turns heterogeneous configuration documents into one ordered list of
//! artifacts, each carrying a flat list of `(key, value)` settings:
//!
//! - settings-catalog policies (nested setting-instance trees, JSON)
//! - compliance policies and enrollment restrictions (flat JSON)
//! - configuration profiles (`.mobileconfig`, XML or binary property lists)
//! - sidecar manifests (XML) that name, describe and re-type artifacts
//!
//! # Example
//!
//! ```no_run
//! use mdmdoc::{ArtifactAggregator, MdmdocConfig, RealFileSystem};
//! use std::sync::Arc;
//!
//! let aggregator = ArtifactAggregator::new(
//!     Arc::new(RealFileSystem),
//!     "/path/to/repo",
//!     MdmdocConfig::default(),
//! );
//! for artifact in aggregator.run()? {
//!     println!("{} ({}): {} settings", artifact.reference, artifact.artifact_type, artifact.count());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod fs;
pub mod parsers;
pub mod report;
pub mod util;

pub use artifact::{Artifact, ArtifactAggregator, ArtifactClassifier, ArtifactType, Setting};
pub use config::{ConfigError, MdmdocConfig};
pub use discovery::{discover, SourceSet};
pub use error::{ExtractError, ExtractResult};
pub use extract::{DocumentShape, Extraction, FormatDetector, SettingsExtractor, ValueNormalizer};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use report::MarkdownReport;
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
