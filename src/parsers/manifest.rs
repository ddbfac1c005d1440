//! Sidecar manifest parsing
//!
//! A manifest is a small XML descriptor next to (or pointing at) a primary
//! artifact:
//!
//! ```xml
//! <MacIntuneManifest>
//!   <ReferenceId>scr-sys-001</ReferenceId>
//!   <Type>Script</Type>
//!   <Name>Rename device</Name>
//!   <Description>Sets the computer name</Description>
//!   <SourceFile>scripts/scr-sys-001.sh</SourceFile>
//!   <Script>
//!     <RunAsAccount>system</RunAsAccount>
//!   </Script>
//! </MacIntuneManifest>
//! ```

use crate::artifact::{ArtifactType, Setting};
use roxmltree::{Document, Node, ParsingOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub root_tag: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub artifact_type: Option<String>,
    pub source_file: Option<String>,
    sections: Vec<(String, Vec<Setting>)>,
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self, roxmltree::Error> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(content.trim_start_matches('\u{feff}'), options)?;
        let root = doc.root_element();

        let sections = root
            .children()
            .filter(|c| c.is_element() && c.children().any(|n| n.is_element()))
            .map(|section| (section.tag_name().name().to_string(), flatten(section)))
            .collect();

        Ok(Self {
            root_tag: root.tag_name().name().to_string(),
            name: child_text(root, "Name"),
            description: child_text(root, "Description"),
            artifact_type: child_text(root, "Type"),
            source_file: child_text(root, "SourceFile"),
            sections,
        })
    }

    /// Declared type override, if any.
    pub fn declared_type(&self) -> Option<ArtifactType> {
        self.artifact_type.as_deref().map(ArtifactType::parse)
    }

    /// Immediate children of the first subtree named `tag`, as settings.
    pub fn section(&self, tag: &str) -> Option<&[Setting]> {
        self.sections
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, settings)| settings.as_slice())
    }
}

fn child_text(parent: Node, tag: &str) -> Option<String> {
    parent
        .children()
        .find(|c| c.has_tag_name(tag))
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn flatten(section: Node) -> Vec<Setting> {
    section
        .children()
        .filter(Node::is_element)
        .filter_map(|child| {
            child
                .text()
                .filter(|t| !t.is_empty())
                .map(|t| Setting::new(child.tag_name().name(), t.trim()))
        })
        .collect()
}
