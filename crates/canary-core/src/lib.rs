//! Canary Core - traffic-shifted release orchestration
//!
//! Takes a compiled CloudFormation template and a service definition and:
//! - Gates on functions that declare deployment settings and on the stage
//! - Synthesizes a CodeDeploy deployment group and alias per function
//! - Redirects every permission and event source to the alias
//! - Adds the shared application and roles
//! - Returns the result as one additive patch
//!
//! # Example
//!
//! ```rust,ignore
//! use canary_core::{CanaryDeployments, ServiceConfig};
//! use canary_template::Template;
//!
//! let config = ServiceConfig::from_yaml(&std::fs::read_to_string("serverless.yml")?)?;
//! let mut template = Template::from_value(compiled)?;
//!
//! CanaryDeployments::new(config).add_canary_deployment_resources(&mut template)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod naming;
pub mod orchestrator;
pub mod settings;

// Re-exports for convenience
pub use config::{CustomConfig, FunctionConfig, ProviderConfig, ServiceConfig, DEFAULT_STAGE};
pub use error::{CanaryError, ConfigError, SettingsError};
pub use naming::{Naming, ServerlessNaming};
pub use orchestrator::CanaryDeployments;
pub use settings::{DeploymentSettings, ResolvedSettings};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running a deployment pass
    pub use crate::{CanaryDeployments, CanaryError, DeploymentSettings, Naming, ServiceConfig};
    pub use canary_template::{Template, TemplatePatch};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
