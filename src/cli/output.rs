//! Output formatting for the `generate` and `inspect` commands
//!
//! Reports render as Markdown, JSON or YAML. Single-document inspection
//! renders as JSON, YAML or human-readable text.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

use crate::artifact::Artifact;
use crate::extract::Extraction;
use crate::report::{MarkdownReport, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown document
    Markdown,
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

#[derive(Debug, Serialize)]
struct Inspection<'a> {
    path: &'a Path,
    #[serde(flatten)]
    extraction: &'a Extraction,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the aggregated artifact list as a report
    pub fn format_report(
        &self,
        artifacts: &[Artifact],
        title: &str,
        generated: NaiveDate,
    ) -> Result<String> {
        let report = Report::new(title, generated, artifacts);
        match self.format {
            OutputFormat::Markdown | OutputFormat::Human => {
                Ok(MarkdownReport::new(title).render(artifacts, generated))
            }
            OutputFormat::Json => {
                serde_json::to_string_pretty(&report).context("Failed to serialize report to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(&report).context("Failed to serialize report to YAML")
            }
        }
    }

    /// Formats the extraction result for a single document
    pub fn format_inspection(&self, path: &Path, extraction: &Extraction) -> Result<String> {
        let inspection = Inspection { path, extraction };
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&inspection)
                .context("Failed to serialize inspection to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&inspection).context("Failed to serialize inspection to YAML")
            }
            OutputFormat::Human | OutputFormat::Markdown => {
                Ok(self.format_inspection_human(path, extraction))
            }
        }
    }

    fn format_inspection_human(&self, path: &Path, extraction: &Extraction) -> String {
        let mut output = String::new();

        output.push_str(&format!("File:      {}\n", path.display()));
        match extraction.shape {
            Some(shape) => output.push_str(&format!("Shape:     {}\n", shape)),
            None => output.push_str("Shape:     (not recognized)\n"),
        }
        output.push_str(&format!("Settings:  {}\n", extraction.settings.len()));

        if !extraction.settings.is_empty() {
            output.push('\n');
            let width = extraction
                .settings
                .iter()
                .map(|s| s.key.chars().count())
                .max()
                .unwrap_or(0);
            for setting in &extraction.settings {
                output.push_str(&format!(
                    "  {:<width$}  {}\n",
                    setting.key,
                    setting.value,
                    width = width
                ));
            }
        }

        output
    }
}
