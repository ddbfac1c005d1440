//! Settings-catalog extraction
//!
//! A settings-catalog document holds a `settings` array of setting-instance
//! containers. Groups nest arbitrarily (`groupSettingCollectionValue` ->
//! `children` -> ...), and intermediate nodes carry no value of their own,
//! so the walk inspects every object and then always descends into all of
//! its values.

use super::normalize::ValueNormalizer;
use super::SettingsExtractor;
use crate::artifact::Setting;
use serde_json::{Map, Value};
use std::sync::Arc;

const SETTINGS_FIELD: &str = "settings";
const DEFINITION_ID: &str = "settingDefinitionId";
const CHOICE_VALUE: &str = "choiceSettingValue";
const SIMPLE_VALUE: &str = "simpleSettingValue";
const COLLECTION_VALUE: &str = "simpleSettingCollectionValue";

pub struct SettingsCatalogExtractor {
    normalizer: Arc<ValueNormalizer>,
}

impl SettingsCatalogExtractor {
    pub fn new(normalizer: Arc<ValueNormalizer>) -> Self {
        Self { normalizer }
    }

    fn walk(&self, node: &Value, out: &mut Vec<Setting>) {
        match node {
            Value::Object(map) => {
                if let Some(id) = map.get(DEFINITION_ID).and_then(Value::as_str) {
                    if !id.is_empty() {
                        self.inspect_carriers(id, map, out);
                    }
                }
                for child in map.values() {
                    self.walk(child, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.walk(item, out);
                }
            }
            _ => {}
        }
    }

    fn inspect_carriers(&self, id: &str, node: &Map<String, Value>, out: &mut Vec<Setting>) {
        for carrier in [CHOICE_VALUE, SIMPLE_VALUE] {
            if let Some(value) = node
                .get(carrier)
                .and_then(Value::as_object)
                .and_then(|block| block.get("value"))
                .filter(|v| !v.is_null())
            {
                out.push(Setting::new(
                    id,
                    self.normalizer.simplify_display_value(id, value),
                ));
            }
        }

        if let Some(entries) = node.get(COLLECTION_VALUE).and_then(Value::as_array) {
            for (idx, entry) in entries.iter().enumerate() {
                if let Some(value) = entry
                    .as_object()
                    .and_then(|e| e.get("value"))
                    .filter(|v| !v.is_null())
                {
                    out.push(Setting::new(
                        format!("{}[{}]", id, idx),
                        self.normalizer.simplify_display_value(id, value),
                    ));
                }
            }
        }
    }
}

impl SettingsExtractor for SettingsCatalogExtractor {
    fn extract(&self, doc: &Value) -> Vec<Setting> {
        let mut out = Vec::new();
        if let Some(settings) = doc.get(SETTINGS_FIELD) {
            self.walk(settings, &mut out);
        }
        out
    }
}
