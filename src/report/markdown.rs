use crate::artifact::{Artifact, ArtifactType, Setting};
use chrono::NaiveDate;
use std::fmt::Write;

pub const DEFAULT_TITLE: &str = "Configuration Documentation";
const EMPTY_TABLE: &str = "_No payload settings discovered_\n";
const DATE_FORMAT: &str = "%B %d, %Y";

/// Renders an artifact list as a single Markdown document: header, index
/// table, then one section per artifact.
#[derive(Debug, Clone)]
pub struct MarkdownReport {
    title: String,
}

impl Default for MarkdownReport {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl MarkdownReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn render(&self, artifacts: &[Artifact], generated: NaiveDate) -> String {
        let mut md = String::new();

        let _ = writeln!(md, "# {}\n", self.title);
        let _ = writeln!(md, "**Generated:** {}\n", generated.format(DATE_FORMAT));
        let _ = writeln!(md, "**Total Artifacts:** {}\n", artifacts.len());

        md.push_str("## Index\n\n");
        md.push_str("| Ref | Type | Settings Count |\n|-----|------|----------------|\n");
        for artifact in artifacts {
            let _ = writeln!(
                md,
                "| [{}](#{}) | {} | {} |",
                artifact.reference,
                anchor(&artifact.reference, &artifact.artifact_type),
                artifact.artifact_type,
                artifact.count()
            );
        }
        md.push('\n');

        md.push_str("## Detailed Configuration\n\n");
        for artifact in artifacts {
            let _ = writeln!(
                md,
                "### {} ({})\n",
                artifact.reference, artifact.artifact_type
            );
            if let Some(name) = artifact.name.as_deref().filter(|n| !n.is_empty()) {
                let _ = writeln!(md, "**Name:** {}\n", name);
            }
            if let Some(description) = artifact.description.as_deref().filter(|d| !d.is_empty()) {
                let _ = writeln!(md, "{}\n", description);
            }
            let _ = writeln!(md, "**Source:** `{}`  ", artifact.relpath);
            let _ = writeln!(md, "**Settings:** {}\n", artifact.count());
            md.push_str(&settings_table(&artifact.settings));
            md.push('\n');
        }

        md
    }
}

/// Heading anchor for `### <ref> (<Type>)`.
pub fn anchor(reference: &str, artifact_type: &ArtifactType) -> String {
    format!("{}-{}", reference, artifact_type.as_str())
        .replace(' ', "-")
        .to_lowercase()
}

fn settings_table(settings: &[Setting]) -> String {
    if settings.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let mut table = String::from("| Key | Value |\n|-----|-------|\n");
    for setting in settings {
        let _ = writeln!(
            table,
            "| `{}` | `{}` |",
            escape_cell(&setting.key),
            escape_cell(&setting.value)
        );
    }
    table
}

// Pipes and newlines would break the table row.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn sample() -> Vec<Artifact> {
        vec![
            Artifact::new(
                "cfg-dck-001",
                ArtifactType::CustomConfig,
                "configurations/intune/cfg-dck-001.mobileconfig",
                vec![Setting::new("com.apple.dock.autohide", "True")],
            )
            .with_name(Some("Dock".to_string()))
            .with_description(Some("Dock layout".to_string())),
            Artifact::new("scr-sys-001", ArtifactType::Script, "scripts/scr-sys-001.sh", vec![]),
        ]
    }

    #[test]
    fn test_header_and_index() {
        let md = MarkdownReport::new("Intune My Macs").render(&sample(), date());

        assert!(md.starts_with("# Intune My Macs\n"));
        assert!(md.contains("**Generated:** March 05, 2024"));
        assert!(md.contains("**Total Artifacts:** 2"));
        assert!(md.contains("| [cfg-dck-001](#cfg-dck-001-customconfig) | CustomConfig | 1 |"));
        assert!(md.contains("| [scr-sys-001](#scr-sys-001-script) | Script | 0 |"));
    }

    #[test]
    fn test_detail_sections() {
        let md = MarkdownReport::default().render(&sample(), date());

        assert!(md.contains("### cfg-dck-001 (CustomConfig)\n\n**Name:** Dock\n\nDock layout\n"));
        assert!(md.contains("**Source:** `configurations/intune/cfg-dck-001.mobileconfig`  \n"));
        assert!(md.contains("| `com.apple.dock.autohide` | `True` |"));
        assert!(md.contains("### scr-sys-001 (Script)"));
        assert!(md.contains("_No payload settings discovered_"));
    }

    #[test]
    fn test_anchor_lowercases_and_hyphenates() {
        assert_eq!(
            anchor("POL-sec-001", &ArtifactType::CustomAttribute),
            "pol-sec-001-customattribute"
        );
        assert_eq!(
            anchor("my ref", &ArtifactType::Custom("Declarative Config".to_string())),
            "my-ref-declarative-config"
        );
    }

    #[test]
    fn test_cells_are_escaped() {
        let table = settings_table(&[Setting::new("a|b", "line1\nline2")]);
        assert!(table.contains("| `a\\|b` | `line1 line2` |"));
    }

    #[test]
    fn test_empty_report() {
        let md = MarkdownReport::default().render(&[], date());
        assert!(md.contains("**Total Artifacts:** 0"));
        assert!(!md.contains("###"));
    }
}
