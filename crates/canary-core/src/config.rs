//! Service configuration
//!
//! The slice of a serverless service definition the deployment pass reads.
//! Unknown keys (handlers, events, provider runtime and so on) are ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::settings::DeploymentSettings;

/// Stage used when the provider does not name one
pub const DEFAULT_STAGE: &str = "dev";

/// Service definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub service: String,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub custom: CustomConfig,

    /// Functions keyed by their declared name, in declaration order
    #[serde(default)]
    pub functions: IndexMap<String, FunctionConfig>,
}

/// `provider` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_stage")]
    pub stage: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            stage: default_stage(),
        }
    }
}

fn default_stage() -> String {
    DEFAULT_STAGE.to_string()
}

/// `custom` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomConfig {
    /// Service-wide deployment settings
    #[serde(default)]
    pub deployment_settings: DeploymentSettings,
}

/// One entry of `functions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfig {
    /// Present when the function opts in to traffic-shifted releases
    ///
    /// A key with no body opts in with the global settings alone.
    #[serde(
        default,
        deserialize_with = "opt_in_settings",
        skip_serializing_if = "Option::is_none"
    )]
    pub deployment_settings: Option<DeploymentSettings>,
}

fn opt_in_settings<'de, D>(deserializer: D) -> Result<Option<DeploymentSettings>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<DeploymentSettings>::deserialize(deserializer).map(|settings| Some(settings.unwrap_or_default()))
}

impl ServiceConfig {
    /// Create a config for `service` with no functions
    #[inline]
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or does not match the expected shape
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::InvalidJson)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid or does not match the expected shape
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(ConfigError::InvalidYaml)
    }

    /// Convert from an already parsed value
    ///
    /// # Errors
    /// Returns error if the value does not match the expected shape
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(ConfigError::InvalidJson)
    }

    /// With stage, as a `--stage` option would set it
    #[inline]
    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.provider.stage = stage.into();
        self
    }

    /// With a function, optionally opted in
    #[must_use]
    pub fn with_function(
        mut self,
        name: impl Into<String>,
        deployment_settings: Option<DeploymentSettings>,
    ) -> Self {
        self.functions
            .insert(name.into(), FunctionConfig { deployment_settings });
        self
    }

    /// With service-wide deployment settings
    #[inline]
    #[must_use]
    pub fn with_global_settings(mut self, settings: DeploymentSettings) -> Self {
        self.custom.deployment_settings = settings;
        self
    }

    /// Current deployment stage
    #[inline]
    #[must_use]
    pub fn stage(&self) -> &str {
        &self.provider.stage
    }

    /// Service-wide deployment settings
    #[inline]
    #[must_use]
    pub fn global_settings(&self) -> &DeploymentSettings {
        &self.custom.deployment_settings
    }

    /// Names of functions declaring deployment settings, in declaration order
    pub fn functions_with_deployment_settings(&self) -> impl Iterator<Item = &str> {
        self.functions
            .iter()
            .filter(|(_, function)| function.deployment_settings.is_some())
            .map(|(name, _)| name.as_str())
    }

    /// Global settings overridden by the function's own
    ///
    /// `None` if the function is unknown or has not opted in.
    #[must_use]
    pub fn deployment_settings_for(&self, function: &str) -> Option<DeploymentSettings> {
        let own = self.functions.get(function)?.deployment_settings.as_ref()?;
        Some(self.global_settings().merged(own))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canary_generators::DeploymentType;
    use pretty_assertions::assert_eq;

    const YAML: &str = r"
service: canary-deployments-test
provider:
  name: aws
  runtime: nodejs18.x
  stage: prod
custom:
  deploymentSettings:
    stages:
      - prod
    codeDeployRolePermissionsBoundary: arn:aws:iam::123456789012:policy/boundary
functions:
  hello:
    handler: handler.hello
    events:
      - sns: snsTopic
    deploymentSettings:
      type: Linear10PercentEvery1Minute
      alias: Live
      preTrafficHook: preHook
      alarms:
        - HelloAlarm
        - name: ExternalAlarm
  preHook:
    handler: hooks.pre
";

    #[test]
    fn parses_yaml_service() {
        let config = ServiceConfig::from_yaml(YAML).unwrap();

        assert_eq!(config.service, "canary-deployments-test");
        assert_eq!(config.stage(), "prod");
        assert_eq!(config.global_settings().enabled_stages(), ["prod".to_string()]);
        assert_eq!(
            config.functions_with_deployment_settings().collect::<Vec<_>>(),
            vec!["hello"]
        );

        let hello = config.deployment_settings_for("hello").unwrap();
        assert_eq!(hello.alias.as_deref(), Some("Live"));
        assert_eq!(
            hello.deployment_type,
            Some(DeploymentType::Linear10PercentEvery1Minute)
        );
        assert_eq!(
            hello.code_deploy_role_permissions_boundary.as_deref(),
            Some("arn:aws:iam::123456789012:policy/boundary")
        );
        assert!(config.deployment_settings_for("preHook").is_none());
        assert!(config.deployment_settings_for("missing").is_none());
    }

    #[test]
    fn parses_json_service_with_default_stage() {
        let config = ServiceConfig::from_json(
            r#"{
                "service": "svc",
                "functions": {
                    "hello": {"deploymentSettings": {"alias": "Live", "type": "AllAtOnce"}}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.stage(), DEFAULT_STAGE);
        assert_eq!(config.global_settings(), &DeploymentSettings::default());
        assert!(config.deployment_settings_for("hello").is_some());
    }

    #[test]
    fn type_errors_surface_as_config_errors() {
        let err = ServiceConfig::from_json(r#"{"service": "svc", "functions": {"hello": {"deploymentSettings": {"alias": 3}}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson(_)));

        let err = ServiceConfig::from_yaml("service: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml(_)));
    }

    #[test]
    fn empty_settings_key_opts_in() {
        let config = ServiceConfig::from_yaml(
            r"
service: svc
custom:
  deploymentSettings:
    type: AllAtOnce
    alias: Live
functions:
  hello:
    deploymentSettings:
  world:
    handler: handler.world
",
        )
        .unwrap();

        assert_eq!(
            config.functions_with_deployment_settings().collect::<Vec<_>>(),
            vec!["hello"]
        );
        let hello = config.deployment_settings_for("hello").unwrap();
        assert_eq!(hello.alias.as_deref(), Some("Live"));
        assert_eq!(hello.deployment_type, Some(DeploymentType::AllAtOnce));

        let config = ServiceConfig::from_json(r#"{"service": "svc", "functions": {"hello": {"deploymentSettings": null}}}"#)
            .unwrap();
        assert!(config.deployment_settings_for("hello").is_some());
    }

    #[test]
    fn builder_keeps_declaration_order() {
        let config = ServiceConfig::new("svc")
            .with_stage("staging")
            .with_function("b", Some(DeploymentSettings::default()))
            .with_function("a", None)
            .with_function("c", Some(DeploymentSettings::default()));

        assert_eq!(config.stage(), "staging");
        assert_eq!(
            config.functions_with_deployment_settings().collect::<Vec<_>>(),
            vec!["b", "c"]
        );
    }
}
