//! Report rendering over an aggregated artifact list

pub mod markdown;

pub use markdown::{anchor, MarkdownReport, DEFAULT_TITLE};

use crate::artifact::Artifact;
use chrono::NaiveDate;
use serde::Serialize;

/// Structured form of a report, for JSON and YAML output
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub title: &'a str,
    pub generated: NaiveDate,
    pub total: usize,
    pub artifacts: &'a [Artifact],
}

impl<'a> Report<'a> {
    pub fn new(title: &'a str, generated: NaiveDate, artifacts: &'a [Artifact]) -> Self {
        Self {
            title,
            generated,
            total: artifacts.len(),
            artifacts,
        }
    }
}
