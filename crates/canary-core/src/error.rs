//! Error types for Canary Core
//!
//! Everything here is fatal to a pass. Skip conditions (stage not enabled,
//! no execution role, externally managed CodeDeploy role) are not errors.

use canary_generators::GenerateError;

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum CanaryError {
    /// A resource could not be synthesized or rewritten
    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),

    /// Merged deployment settings are unusable
    #[error("invalid deployment settings: {0}")]
    Settings(#[from] SettingsError),

    /// Service configuration could not be read
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Deployment settings errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("function {function} has no `{field}` in its deployment settings")]
    MissingField {
        /// Function name as declared in the service
        function: String,
        /// Settings key that is absent
        field: &'static str,
    },
}

/// Service configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}
