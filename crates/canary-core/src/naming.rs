//! Logical id and stack naming
//!
//! The host framework owns these conventions. [`Naming`] is the seam the
//! orchestrator derives ids through; [`ServerlessNaming`] reproduces the
//! Serverless Framework rules.

use crate::config::ServiceConfig;

/// Derivation of logical ids and names from declared function names
pub trait Naming {
    /// Logical id of the `AWS::Lambda::Function` for a declared function
    fn lambda_logical_id(&self, function_name: &str) -> String;

    /// Name of the deployed stack
    fn stack_name(&self) -> String;

    /// `name` reduced to ASCII letters and digits, first letter upper-cased
    fn normalize_name_to_alpha_numeric_only(&self, name: &str) -> String;

    /// Logical id of the shared function execution role
    fn role_logical_id(&self) -> String;
}

/// Serverless Framework naming for one service and stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerlessNaming {
    service: String,
    stage: String,
}

impl ServerlessNaming {
    #[inline]
    #[must_use]
    pub fn new(service: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            stage: stage.into(),
        }
    }

    /// Naming for the service and stage of `config`
    #[inline]
    #[must_use]
    pub fn for_service(config: &ServiceConfig) -> Self {
        Self::new(config.service.clone(), config.stage())
    }

    /// `my-func_v2` becomes `MyDashfuncUnderscorev2`
    #[must_use]
    pub fn normalized_function_name(function_name: &str) -> String {
        capitalize(
            &function_name
                .replace('-', "Dash")
                .replace('_', "Underscore"),
        )
    }
}

impl Naming for ServerlessNaming {
    fn lambda_logical_id(&self, function_name: &str) -> String {
        format!("{}LambdaFunction", Self::normalized_function_name(function_name))
    }

    fn stack_name(&self) -> String {
        format!("{}-{}", self.service, self.stage)
    }

    fn normalize_name_to_alpha_numeric_only(&self, name: &str) -> String {
        let alpha_numeric: String = name.chars().filter(char::is_ascii_alphanumeric).collect();
        capitalize(&alpha_numeric)
    }

    fn role_logical_id(&self) -> String {
        "IamRoleLambdaExecution".to_string()
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
