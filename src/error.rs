//! Errors raised while loading a single source document.
//!
//! None of these abort an aggregation pass: the aggregator logs them and
//! excludes the offending document.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("{path} is {size} bytes, above the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON document {path} is not an object")]
    NotAnObject { path: PathBuf },

    #[error("Failed to parse XML {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Failed to parse property list {path}: {message}")]
    Plist { path: PathBuf, message: String },

    #[error("Unsupported property list encoding in {path}: {encoding}")]
    UnsupportedPlist { path: PathBuf, encoding: String },
}

impl ExtractError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ExtractError::Read { path, .. }
            | ExtractError::TooLarge { path, .. }
            | ExtractError::Json { path, .. }
            | ExtractError::NotAnObject { path }
            | ExtractError::Xml { path, .. }
            | ExtractError::Plist { path, .. }
            | ExtractError::UnsupportedPlist { path, .. } => path,
        }
    }
}

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
