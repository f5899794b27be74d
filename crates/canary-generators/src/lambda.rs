//! Lambda alias synthesis

use canary_template::{pointer, Resource};
use serde_json::{json, Map, Value};

/// Type tag of a function
pub const FUNCTION_TYPE: &str = "AWS::Lambda::Function";

/// Type tag of a published function version
pub const VERSION_TYPE: &str = "AWS::Lambda::Version";

/// Type tag of an alias
pub const ALIAS_TYPE: &str = "AWS::Lambda::Alias";

/// CodeDeploy wiring placed in the alias update policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficShifting<'a> {
    /// Logical id of the CodeDeploy application
    pub application: &'a str,
    /// Logical id of the deployment group
    pub deployment_group: &'a str,
    /// Logical id of the function run before traffic shifts
    pub before_hook: Option<&'a str>,
    /// Logical id of the function run after traffic shifts
    pub after_hook: Option<&'a str>,
}

/// Inputs for [`alias`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasParams<'a> {
    /// Alias name
    pub name: &'a str,
    /// Logical id of the function
    pub function: &'a str,
    /// Logical id of the function's version resource
    pub version: &'a str,
    /// Traffic shifting wiring, if CodeDeploy drives the alias
    pub traffic_shifting: Option<TrafficShifting<'a>>,
}

/// Build an `AWS::Lambda::Alias`
#[must_use]
pub fn alias(params: AliasParams<'_>) -> Resource {
    let resource = Resource::new(
        ALIAS_TYPE,
        json!({
            "FunctionVersion": pointer::attribute(params.version, "Version"),
            "FunctionName": pointer::reference(params.function),
            "Name": params.name
        }),
    );

    match params.traffic_shifting {
        Some(shifting) => resource.with_member("UpdatePolicy", update_policy(shifting)),
        None => resource,
    }
}

fn update_policy(shifting: TrafficShifting<'_>) -> Value {
    let mut update = Map::new();
    update.insert("ApplicationName".into(), pointer::reference(shifting.application));
    update.insert(
        "DeploymentGroupName".into(),
        pointer::reference(shifting.deployment_group),
    );
    if let Some(hook) = shifting.before_hook {
        update.insert("BeforeAllowTrafficHook".into(), pointer::reference(hook));
    }
    if let Some(hook) = shifting.after_hook {
        update.insert("AfterAllowTrafficHook".into(), pointer::reference(hook));
    }
    json!({ "CodeDeployLambdaAliasUpdate": update })
}
