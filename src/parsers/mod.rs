// Source document parsers
//
// Property-list profiles go through the plist crate, sidecar manifests
// through roxmltree; JSON goes straight through serde_json.

pub mod manifest;
pub mod property_list;

pub use manifest::Manifest;
pub use property_list::{parse_plist, PlistError};
