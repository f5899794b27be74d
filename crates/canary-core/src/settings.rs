//! Deployment settings
//!
//! `custom.deploymentSettings` supplies service-wide defaults and
//! `functions.<name>.deploymentSettings` opts a function in. The two merge
//! field by field, the function's value winning whenever it sets one.

use canary_generators::{Alarm, DeploymentType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SettingsError;

/// Deployment settings as written in the service definition
///
/// Every field is optional here; [`DeploymentSettings::resolve`] enforces
/// the ones a gated function needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSettings {
    /// Alias name, also the suffix of the alias logical id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Traffic shifting strategy
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub deployment_type: Option<DeploymentType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarms: Option<Vec<Alarm>>,

    /// Opaque CodeDeploy trigger configurations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_configurations: Option<Vec<Value>>,

    /// ARN of an externally managed CodeDeploy service role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_deploy_role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_deploy_role_permissions_boundary: Option<String>,

    /// Function run before traffic shifts to the new version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_traffic_hook: Option<String>,

    /// Function run after traffic has shifted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_traffic_hook: Option<String>,

    /// Stages the feature is enabled for; only read from the global settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<String>>,
}

impl DeploymentSettings {
    /// Shallow merge: fields set in `overrides` replace ours
    #[must_use]
    pub fn merged(&self, overrides: &Self) -> Self {
        fn pick<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
            over.as_ref().or(base.as_ref()).cloned()
        }

        Self {
            alias: pick(&self.alias, &overrides.alias),
            deployment_type: pick(&self.deployment_type, &overrides.deployment_type),
            alarms: pick(&self.alarms, &overrides.alarms),
            trigger_configurations: pick(
                &self.trigger_configurations,
                &overrides.trigger_configurations,
            ),
            code_deploy_role: pick(&self.code_deploy_role, &overrides.code_deploy_role),
            code_deploy_role_permissions_boundary: pick(
                &self.code_deploy_role_permissions_boundary,
                &overrides.code_deploy_role_permissions_boundary,
            ),
            pre_traffic_hook: pick(&self.pre_traffic_hook, &overrides.pre_traffic_hook),
            post_traffic_hook: pick(&self.post_traffic_hook, &overrides.post_traffic_hook),
            stages: pick(&self.stages, &overrides.stages),
        }
    }

    /// Whether a pre- or post-traffic hook is configured
    ///
    /// An empty hook name counts as unset.
    #[inline]
    #[must_use]
    pub fn has_traffic_hooks(&self) -> bool {
        hook(self.pre_traffic_hook.as_deref()).is_some()
            || hook(self.post_traffic_hook.as_deref()).is_some()
    }

    /// Stages the feature is restricted to; empty means every stage
    #[inline]
    #[must_use]
    pub fn enabled_stages(&self) -> &[String] {
        self.stages.as_deref().unwrap_or_default()
    }

    /// Check the fields a gated function requires
    ///
    /// # Errors
    /// Returns [`SettingsError::MissingField`] when `alias` or `type` is
    /// absent.
    pub fn resolve(&self, function: &str) -> Result<ResolvedSettings, SettingsError> {
        let missing = |field| SettingsError::MissingField {
            function: function.to_string(),
            field,
        };

        Ok(ResolvedSettings {
            alias: self.alias.clone().ok_or_else(|| missing("alias"))?,
            deployment_type: self.deployment_type.ok_or_else(|| missing("type"))?,
            alarms: self.alarms.clone().unwrap_or_default(),
            trigger_configurations: self.trigger_configurations.clone(),
            code_deploy_role: self.code_deploy_role.clone(),
            pre_traffic_hook: hook(self.pre_traffic_hook.as_deref()).map(str::to_string),
            post_traffic_hook: hook(self.post_traffic_hook.as_deref()).map(str::to_string),
        })
    }
}

fn hook(name: Option<&str>) -> Option<&str> {
    name.filter(|name| !name.is_empty())
}

/// Settings of one gated function, with required fields present
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub alias: String,
    pub deployment_type: DeploymentType,
    pub alarms: Vec<Alarm>,
    pub trigger_configurations: Option<Vec<Value>>,
    pub code_deploy_role: Option<String>,
    pub pre_traffic_hook: Option<String>,
    pub post_traffic_hook: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn settings(value: Value) -> DeploymentSettings {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn deserializes_camel_case_keys() {
        let parsed = settings(json!({
            "alias": "Live",
            "type": "Linear10PercentEvery1Minute",
            "alarms": ["Alarm1", {"name": "Alarm2"}],
            "preTrafficHook": "preHook",
            "codeDeployRolePermissionsBoundary": "arn:aws:iam::123:policy/boundary",
            "stages": ["prod"]
        }));

        assert_eq!(parsed.alias.as_deref(), Some("Live"));
        assert_eq!(
            parsed.deployment_type,
            Some(DeploymentType::Linear10PercentEvery1Minute)
        );
        assert_eq!(
            parsed.alarms,
            Some(vec![
                Alarm::Resource("Alarm1".into()),
                Alarm::Named { name: "Alarm2".into() }
            ])
        );
        assert_eq!(parsed.pre_traffic_hook.as_deref(), Some("preHook"));
        assert!(parsed.has_traffic_hooks());
        assert_eq!(parsed.enabled_stages(), ["prod".to_string()]);
    }

    #[test]
    fn unknown_deployment_type_is_rejected() {
        let parsed = serde_json::from_value::<DeploymentSettings>(json!({"type": "Canary50Percent"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn function_settings_override_field_by_field() {
        let global = settings(json!({
            "type": "Canary10Percent5Minutes",
            "alias": "Live",
            "alarms": ["GlobalAlarm"],
            "codeDeployRole": "arn:aws:iam::123:role/global"
        }));
        let function = settings(json!({
            "alias": "Canary",
            "alarms": [],
            "postTrafficHook": "postHook"
        }));

        let merged = global.merged(&function);
        assert_eq!(merged.alias.as_deref(), Some("Canary"));
        assert_eq!(merged.deployment_type, Some(DeploymentType::Canary10Percent5Minutes));
        // An explicit empty list still overrides
        assert_eq!(merged.alarms, Some(Vec::new()));
        assert_eq!(merged.code_deploy_role.as_deref(), Some("arn:aws:iam::123:role/global"));
        assert_eq!(merged.post_traffic_hook.as_deref(), Some("postHook"));
        assert_eq!(merged.pre_traffic_hook, None);
    }

    #[test]
    fn resolve_requires_alias_and_type() {
        let no_alias = settings(json!({"type": "AllAtOnce"}));
        assert_eq!(
            no_alias.resolve("hello"),
            Err(SettingsError::MissingField {
                function: "hello".into(),
                field: "alias"
            })
        );

        let no_type = settings(json!({"alias": "Live"}));
        assert!(matches!(
            no_type.resolve("hello"),
            Err(SettingsError::MissingField { field: "type", .. })
        ));

        let resolved = settings(json!({"alias": "Live", "type": "AllAtOnce"}))
            .resolve("hello")
            .unwrap();
        assert_eq!(resolved.alias, "Live");
        assert!(resolved.alarms.is_empty());
        assert_eq!(resolved.trigger_configurations, None);
    }

    #[test]
    fn empty_hook_names_are_unset() {
        let parsed = settings(json!({
            "alias": "Live",
            "type": "AllAtOnce",
            "preTrafficHook": "",
            "postTrafficHook": ""
        }));
        assert!(!parsed.has_traffic_hooks());

        let resolved = parsed.resolve("hello").unwrap();
        assert_eq!(resolved.pre_traffic_hook, None);
        assert_eq!(resolved.post_traffic_hook, None);
    }

    #[test]
    fn no_stages_means_every_stage() {
        assert!(DeploymentSettings::default().enabled_stages().is_empty());
    }
}
