//! Profile-bundle payload flattening

use super::normalize::ValueNormalizer;
use super::SettingsExtractor;
use crate::artifact::Setting;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

pub const PAYLOAD_CONTENT: &str = "PayloadContent";
pub const PAYLOAD_DISPLAY_NAME: &str = "PayloadDisplayName";
const PAYLOAD_TYPE: &str = "PayloadType";
const DEFAULT_PREFIX: &str = "payload";

const METADATA_KEYS: [&str; 5] = [
    PAYLOAD_DISPLAY_NAME,
    "PayloadIdentifier",
    PAYLOAD_TYPE,
    "PayloadUUID",
    "PayloadVersion",
];

/// Flattens each payload dictionary into `PayloadType.field` pairs.
///
/// Nested arrays and dictionaries are summarized as `complex:list` /
/// `complex:dict` rather than expanded.
pub struct PayloadExtractor {
    normalizer: Arc<ValueNormalizer>,
    metadata_keys: HashSet<&'static str>,
}

impl PayloadExtractor {
    pub fn new(normalizer: Arc<ValueNormalizer>) -> Self {
        Self {
            normalizer,
            metadata_keys: METADATA_KEYS.into_iter().collect(),
        }
    }

    /// Extracts settings from an ordered sequence of payload dictionaries.
    pub fn extract_payloads(&self, payloads: &[Value]) -> Vec<Setting> {
        let mut out = Vec::new();

        for payload in payloads {
            let Some(fields) = payload.as_object() else {
                continue;
            };
            let prefix = fields
                .get(PAYLOAD_TYPE)
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PREFIX);

            for (field, value) in fields {
                if self.metadata_keys.contains(field.as_str()) {
                    continue;
                }
                let key = format!("{}.{}", prefix, field);
                match value {
                    Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                        out.push(Setting::new(key, self.normalizer.simplify_value(value)));
                    }
                    Value::Array(_) => out.push(Setting::new(key, "complex:list")),
                    Value::Object(_) => out.push(Setting::new(key, "complex:dict")),
                    Value::Null => {}
                }
            }
        }

        out
    }
}

impl SettingsExtractor for PayloadExtractor {
    /// Takes the whole bundle; payloads live under `PayloadContent`.
    fn extract(&self, doc: &Value) -> Vec<Setting> {
        doc.get(PAYLOAD_CONTENT)
            .and_then(Value::as_array)
            .map(|payloads| self.extract_payloads(payloads))
            .unwrap_or_default()
    }
}
