//! Flat policy documents: compliance policies and enrollment restrictions

use super::normalize::ValueNormalizer;
use super::SettingsExtractor;
use crate::artifact::Setting;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

const SCHEDULED_ACTIONS: &str = "scheduledActionsForRule";
const PLATFORM_RESTRICTION: &str = "platformRestriction";

const IGNORED_FIELDS: [&str; 8] = [
    "@odata.type",
    "displayName",
    "description",
    "id",
    "createdDateTime",
    "lastModifiedDateTime",
    "version",
    "roleScopeTagIds",
];

pub struct CompliancePolicyExtractor {
    normalizer: Arc<ValueNormalizer>,
    ignored: HashSet<&'static str>,
}

impl CompliancePolicyExtractor {
    pub fn new(normalizer: Arc<ValueNormalizer>) -> Self {
        Self {
            normalizer,
            ignored: IGNORED_FIELDS.into_iter().collect(),
        }
    }

    fn scheduled_actions(&self, rules: &[Value], out: &mut Vec<Setting>) {
        for (idx, rule) in rules.iter().enumerate() {
            let Some(rule) = rule.as_object() else {
                continue;
            };
            let rule_name = rule
                .get("ruleName")
                .filter(|v| !v.is_null())
                .map(plain_text)
                .unwrap_or_else(|| format!("rule_{}", idx));
            let configs = rule
                .get("scheduledActionConfigurations")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            if configs.is_empty() {
                continue;
            }

            let base = format!("{}.{}", SCHEDULED_ACTIONS, rule_name);
            out.push(Setting::new(
                format!("{}.actionCount", base),
                configs.len().to_string(),
            ));

            for (cidx, config) in configs.iter().enumerate() {
                let Some(config) = config.as_object() else {
                    continue;
                };
                let action_type = config
                    .get("actionType")
                    .filter(|v| !v.is_null())
                    .map(plain_text)
                    .unwrap_or_else(|| "unknown".to_string());
                let grace = config
                    .get("gracePeriodHours")
                    .filter(|v| !v.is_null())
                    .map(plain_text)
                    .unwrap_or_else(|| "0".to_string());
                out.push(Setting::new(
                    format!("{}.action_{}", base, cidx),
                    format!("{} (grace: {}h)", action_type, grace),
                ));
            }
        }
    }
}

impl SettingsExtractor for CompliancePolicyExtractor {
    fn extract(&self, doc: &Value) -> Vec<Setting> {
        let mut out = Vec::new();
        let Some(fields) = doc.as_object() else {
            return out;
        };

        for (field, value) in fields {
            if self.ignored.contains(field.as_str()) {
                continue;
            }
            match value {
                Value::Array(rules) if field == SCHEDULED_ACTIONS => {
                    self.scheduled_actions(rules, &mut out);
                }
                _ => out.push(Setting::new(
                    field.as_str(),
                    self.normalizer.simplify_value(value),
                )),
            }
        }

        out
    }
}

/// Flattens the `platformRestriction` object of an enrollment restriction.
pub struct EnrollmentRestrictionExtractor {
    normalizer: Arc<ValueNormalizer>,
}

impl EnrollmentRestrictionExtractor {
    pub fn new(normalizer: Arc<ValueNormalizer>) -> Self {
        Self { normalizer }
    }
}

impl SettingsExtractor for EnrollmentRestrictionExtractor {
    fn extract(&self, doc: &Value) -> Vec<Setting> {
        doc.get(PLATFORM_RESTRICTION)
            .and_then(Value::as_object)
            .map(|restriction| {
                restriction
                    .iter()
                    .map(|(field, value)| {
                        Setting::new(
                            format!("{}.{}", PLATFORM_RESTRICTION, field),
                            self.normalizer.simplify_value(value),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Text of a scalar without JSON quoting.
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalizer() -> Arc<ValueNormalizer> {
        Arc::new(ValueNormalizer::default())
    }

    #[test]
    fn test_compliance_fields_and_actions() {
        let doc = json!({
            "@odata.type": "#microsoft.graph.macOSCompliancePolicy",
            "displayName": "macOS baseline",
            "id": "00000000-0000-0000-0000-000000000000",
            "passwordRequired": true,
            "osMinimumVersion": "14.0",
            "passwordMinimumLength": 12,
            "scheduledActionsForRule": [{
                "ruleName": "PasswordRequired",
                "scheduledActionConfigurations": [
                    {"actionType": "block", "gracePeriodHours": 24},
                    {"actionType": "notification"}
                ]
            }],
            "roleScopeTagIds": ["0"]
        });

        let out = CompliancePolicyExtractor::new(normalizer()).extract(&doc);
        let pairs: Vec<(&str, &str)> = out
            .iter()
            .map(|s| (s.key.as_str(), s.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("passwordRequired", "True"),
                ("osMinimumVersion", "14.0"),
                ("passwordMinimumLength", "12"),
                ("scheduledActionsForRule.PasswordRequired.actionCount", "2"),
                (
                    "scheduledActionsForRule.PasswordRequired.action_0",
                    "block (grace: 24h)"
                ),
                (
                    "scheduledActionsForRule.PasswordRequired.action_1",
                    "notification (grace: 0h)"
                ),
            ]
        );
    }

    #[test]
    fn test_unnamed_rule_and_empty_configurations() {
        let doc = json!({
            "scheduledActionsForRule": [
                {"scheduledActionConfigurations": [{"gracePeriodHours": 72}]},
                {"ruleName": "Empty", "scheduledActionConfigurations": []}
            ]
        });

        let out = CompliancePolicyExtractor::new(normalizer()).extract(&doc);
        assert_eq!(
            out,
            vec![
                Setting::new("scheduledActionsForRule.rule_0.actionCount", "1"),
                Setting::new(
                    "scheduledActionsForRule.rule_0.action_0",
                    "unknown (grace: 72h)"
                ),
            ]
        );
    }

    #[test]
    fn test_non_array_actions_pass_through() {
        let doc = json!({"scheduledActionsForRule": null, "firewallEnabled": false});

        let out = CompliancePolicyExtractor::new(normalizer()).extract(&doc);
        assert_eq!(
            out,
            vec![
                Setting::new("scheduledActionsForRule", ""),
                Setting::new("firewallEnabled", "False"),
            ]
        );
    }

    #[test]
    fn test_enrollment_restriction() {
        let doc = json!({
            "@odata.type": "#microsoft.graph.deviceEnrollmentPlatformRestriction",
            "platformRestriction": {
                "platformBlocked": false,
                "personalDeviceEnrollmentBlocked": true,
                "osMinimumVersion": null,
                "blockedManufacturers": []
            }
        });

        let out = EnrollmentRestrictionExtractor::new(normalizer()).extract(&doc);
        assert_eq!(
            out,
            vec![
                Setting::new("platformRestriction.platformBlocked", "False"),
                Setting::new("platformRestriction.personalDeviceEnrollmentBlocked", "True"),
                Setting::new("platformRestriction.osMinimumVersion", ""),
                Setting::new("platformRestriction.blockedManufacturers", "[]"),
            ]
        );
    }

    #[test]
    fn test_enrollment_restriction_missing_object() {
        let out = EnrollmentRestrictionExtractor::new(normalizer()).extract(&json!({}));
        assert!(out.is_empty());
    }
}
