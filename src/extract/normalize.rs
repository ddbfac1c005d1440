//! Value normalization for display
//!
//! Settings-catalog values habitually repeat their own definition id as a
//! literal prefix (`com.apple.mcx.filevault2_enable_0` under the key
//! `com.apple.mcx.filevault2_enable`). The normalizer strips that prefix,
//! maps `_true`/`_false` suffixes to `True`/`False`, truncates long strings
//! and leaves `{{placeholder}}` template content alone.

use regex::Regex;
use serde_json::Value;

const MAX_VALUE_CHARS: usize = 120;
const ELLIPSIS: &str = "...";
const PLACEHOLDER_PATTERN: &str = r"\{\{.*?\}\}";
const BOOLEAN_SUFFIXES: [(&str, &str); 2] = [("_true", "True"), ("_false", "False")];

#[derive(Debug, Clone)]
pub struct ValueNormalizer {
    max_chars: usize,
    placeholder: Regex,
    boolean_suffixes: Vec<(&'static str, &'static str)>,
}

impl Default for ValueNormalizer {
    fn default() -> Self {
        Self {
            max_chars: MAX_VALUE_CHARS,
            placeholder: Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"),
            boolean_suffixes: BOOLEAN_SUFFIXES.to_vec(),
        }
    }
}

impl ValueNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Basic normalization: numbers to decimal text, long strings truncated,
    /// nested structures encoded as compact JSON.
    pub fn simplify_value(&self, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => self.truncate(s),
            Value::Array(_) | Value::Object(_) => value.to_string(),
        }
    }

    /// Normalizes `raw` for display under the setting `key`.
    pub fn simplify_display_value(&self, key: &str, raw: &Value) -> String {
        let value = self.simplify_value(raw);
        if !raw.is_string() {
            return value;
        }
        if self.placeholder.is_match(&value) {
            return value;
        }

        for (suffix, mapped) in &self.boolean_suffixes {
            if let Some(prefix) = strip_suffix_ignore_case(&value, suffix) {
                if relates_to_key(prefix, key) || prefix == key {
                    return mapped.to_string();
                }
            }
        }

        if let Some(rest) = value
            .strip_prefix(key)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return rest.to_string();
        }

        if let Some(rest) = value.strip_prefix(key) {
            let rest = rest.trim_start_matches('_');
            if !rest.is_empty() {
                return rest.to_string();
            }
        }

        value
    }

    fn truncate(&self, s: &str) -> String {
        if s.chars().count() <= self.max_chars {
            return s.to_string();
        }
        let keep = self.max_chars - ELLIPSIS.len();
        let mut out: String = s.chars().take(keep).collect();
        out.push_str(ELLIPSIS);
        out
    }
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    if !value.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = value.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Loose match between a value prefix and a key through their last dotted
/// segments.
fn relates_to_key(prefix: &str, key: &str) -> bool {
    key.starts_with(last_segment(prefix)) || prefix.ends_with(last_segment(key))
}

fn last_segment(s: &str) -> &str {
    s.rsplit('.').next().unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalizer() -> ValueNormalizer {
        ValueNormalizer::default()
    }

    #[test]
    fn test_simplify_scalars() {
        let n = normalizer();
        assert_eq!(n.simplify_value(&Value::Null), "");
        assert_eq!(n.simplify_value(&json!(42)), "42");
        assert_eq!(n.simplify_value(&json!(1.5)), "1.5");
        assert_eq!(n.simplify_value(&json!(true)), "True");
        assert_eq!(n.simplify_value(&json!("short")), "short");
    }

    #[test]
    fn test_simplify_nested_is_compact_json() {
        let n = normalizer();
        assert_eq!(n.simplify_value(&json!(["a", 1])), r#"["a",1]"#);
        assert_eq!(n.simplify_value(&json!({"k": null})), r#"{"k":null}"#);
    }

    #[test]
    fn test_truncation_boundary() {
        let n = normalizer();
        let exact = "x".repeat(120);
        assert_eq!(n.simplify_value(&json!(exact)), exact);

        let long = "y".repeat(121);
        let out = n.simplify_value(&json!(long));
        assert_eq!(out.chars().count(), 120);
        assert!(out.ends_with("..."));
        assert_eq!(&out[..117], &"y".repeat(117));
    }

    #[test]
    fn test_truncation_counts_characters() {
        let n = normalizer();
        let long = "é".repeat(200);
        let out = n.simplify_value(&json!(long));
        assert_eq!(out.chars().count(), 120);
        assert!(out.starts_with("ééé"));
    }

    #[test]
    fn test_strips_key_prefix() {
        let n = normalizer();
        assert_eq!(
            n.simplify_display_value(
                "com.apple.mcx.filevault2_enable",
                &json!("com.apple.mcx.filevault2_enable_0")
            ),
            "0"
        );
        assert_eq!(
            n.simplify_display_value(
                "com.apple.managedclient.preferences_channelname",
                &json!("com.apple.managedclient.preferences_channelname_current")
            ),
            "current"
        );
    }

    #[test]
    fn test_boolean_suffix_maps() {
        let n = normalizer();
        assert_eq!(
            n.simplify_display_value("com.acme.x", &json!("com.acme.x_true")),
            "True"
        );
        assert_eq!(
            n.simplify_display_value("com.acme.x", &json!("com.acme.x_false")),
            "False"
        );
        assert_eq!(
            n.simplify_display_value(
                "com.apple.systempolicy.control_EnableAssessment",
                &json!("com.apple.systempolicy.control_EnableAssessment_true")
            ),
            "True"
        );
        assert_eq!(
            n.simplify_display_value("com.acme.x", &json!("com.acme.x_FALSE")),
            "False"
        );
    }

    #[test]
    fn test_boolean_suffix_through_last_segment() {
        let n = normalizer();
        // Prefix differs from the key; only the dotted segments line up
        assert_eq!(
            n.simplify_display_value("com.acme.enable", &json!("enable_true")),
            "True"
        );
        assert_eq!(
            n.simplify_display_value("com.acme.x.enable", &json!("other.enable_FALSE")),
            "False"
        );
        assert_eq!(
            n.simplify_display_value("enable.mode", &json!("vendor.enable_true")),
            "True"
        );
    }

    #[test]
    fn test_boolean_suffix_needs_related_prefix() {
        let n = normalizer();
        assert_eq!(
            n.simplify_display_value("com.acme.alpha", &json!("org.other.beta_true")),
            "org.other.beta_true"
        );
    }

    #[test]
    fn test_placeholder_is_untouched() {
        let n = normalizer();
        assert_eq!(
            n.simplify_display_value("com.acme.mail", &json!("com.acme.mail_{{mail}}")),
            "com.acme.mail_{{mail}}"
        );
        assert_eq!(
            n.simplify_display_value("com.acme.x", &json!("{{user}}_true")),
            "{{user}}_true"
        );
    }

    #[test]
    fn test_key_without_underscore_separator() {
        let n = normalizer();
        assert_eq!(
            n.simplify_display_value("com.acme.level", &json!("com.acme.level__3")),
            "_3"
        );
        assert_eq!(
            n.simplify_display_value("com.acme.level", &json!("com.acme.levelhigh")),
            "high"
        );
        assert_eq!(
            n.simplify_display_value("com.acme.level", &json!("com.acme.level")),
            "com.acme.level"
        );
    }

    #[test]
    fn test_non_string_values_are_not_stripped() {
        let n = normalizer();
        assert_eq!(n.simplify_display_value("4", &json!(42)), "42");
        assert_eq!(n.simplify_display_value("k", &Value::Null), "");
    }

    #[test]
    fn test_unrelated_value_unchanged() {
        let n = normalizer();
        assert_eq!(
            n.simplify_display_value("com.acme.x", &json!("https://example.com")),
            "https://example.com"
        );
    }
}
