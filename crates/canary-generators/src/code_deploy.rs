//! CodeDeploy application and deployment group synthesis

use std::fmt::{self, Display, Formatter};

use canary_template::{pointer, Resource};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::iam::CODE_DEPLOY_ROLE_LOGICAL_ID;

/// Type tag of a CodeDeploy application
pub const APPLICATION_TYPE: &str = "AWS::CodeDeploy::Application";

/// Type tag of a CodeDeploy deployment group
pub const DEPLOYMENT_GROUP_TYPE: &str = "AWS::CodeDeploy::DeploymentGroup";

/// Maximum length CodeDeploy accepts for a deployment group name
pub const MAX_DEPLOYMENT_GROUP_NAME_LEN: usize = 100;

/// Traffic shifting strategy (`CodeDeployDefault.Lambda<Type>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentType {
    Canary10Percent5Minutes,
    Canary10Percent10Minutes,
    Canary10Percent15Minutes,
    Canary10Percent30Minutes,
    Linear10PercentEvery1Minute,
    Linear10PercentEvery2Minutes,
    Linear10PercentEvery3Minutes,
    Linear10PercentEvery10Minutes,
    AllAtOnce,
}

impl DeploymentType {
    /// Suffix of the predefined deployment configuration name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Canary10Percent5Minutes => "Canary10Percent5Minutes",
            Self::Canary10Percent10Minutes => "Canary10Percent10Minutes",
            Self::Canary10Percent15Minutes => "Canary10Percent15Minutes",
            Self::Canary10Percent30Minutes => "Canary10Percent30Minutes",
            Self::Linear10PercentEvery1Minute => "Linear10PercentEvery1Minute",
            Self::Linear10PercentEvery2Minutes => "Linear10PercentEvery2Minutes",
            Self::Linear10PercentEvery3Minutes => "Linear10PercentEvery3Minutes",
            Self::Linear10PercentEvery10Minutes => "Linear10PercentEvery10Minutes",
            Self::AllAtOnce => "AllAtOnce",
        }
    }
}

impl Display for DeploymentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CloudWatch alarm that stops a deployment
///
/// A bare string names an alarm resource in the same template; the object
/// form carries a literal alarm name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Alarm {
    /// Logical id of an alarm in the template
    Resource(String),
    /// Literal alarm name
    Named { name: String },
}

impl Alarm {
    fn to_configuration(&self) -> Value {
        match self {
            Self::Resource(logical_id) => json!({ "Name": pointer::reference(logical_id) }),
            Self::Named { name } => json!({ "Name": name }),
        }
    }
}

/// Inputs for [`deployment_group`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeploymentGroupParams<'a> {
    /// Logical id of the CodeDeploy application
    pub application: &'a str,
    /// Physical deployment group name
    pub group_name: &'a str,
    /// Externally managed service role; the generated role is used when absent
    pub service_role_arn: Option<&'a str>,
    /// Traffic shifting strategy
    pub deployment_type: DeploymentType,
    /// Alarms that stop the deployment
    pub alarms: &'a [Alarm],
    /// Trigger configurations, passed through verbatim
    pub trigger_configurations: Option<&'a [Value]>,
}

/// Build the per-stack `AWS::CodeDeploy::Application`
#[must_use]
pub fn application() -> Resource {
    Resource::new(APPLICATION_TYPE, json!({ "ComputePlatform": "Lambda" }))
}

/// Build an `AWS::CodeDeploy::DeploymentGroup` for one function
///
/// `AlarmConfiguration` is only present when at least one alarm is given.
#[must_use]
pub fn deployment_group(params: DeploymentGroupParams<'_>) -> Resource {
    let service_role = params.service_role_arn.map_or_else(
        || pointer::attribute(CODE_DEPLOY_ROLE_LOGICAL_ID, "Arn"),
        |arn| Value::String(arn.to_string()),
    );

    let mut properties = Map::new();
    properties.insert("ApplicationName".into(), pointer::reference(params.application));
    properties.insert("DeploymentGroupName".into(), json!(params.group_name));
    properties.insert(
        "AutoRollbackConfiguration".into(),
        json!({
            "Enabled": true,
            "Events": [
                "DEPLOYMENT_FAILURE",
                "DEPLOYMENT_STOP_ON_ALARM",
                "DEPLOYMENT_STOP_ON_REQUEST"
            ]
        }),
    );
    properties.insert("ServiceRoleArn".into(), service_role);
    properties.insert(
        "DeploymentConfigName".into(),
        json!({
            "Fn::Sub": [
                "CodeDeployDefault.Lambda${ConfigName}",
                { "ConfigName": params.deployment_type.as_str() }
            ]
        }),
    );
    properties.insert(
        "DeploymentStyle".into(),
        json!({
            "DeploymentType": "BLUE_GREEN",
            "DeploymentOption": "WITH_TRAFFIC_CONTROL"
        }),
    );

    if !params.alarms.is_empty() {
        let alarms: Vec<Value> = params.alarms.iter().map(Alarm::to_configuration).collect();
        properties.insert(
            "AlarmConfiguration".into(),
            json!({ "Alarms": alarms, "Enabled": true }),
        );
    }

    if let Some(triggers) = params.trigger_configurations {
        properties.insert("TriggerConfigurations".into(), Value::Array(triggers.to_vec()));
    }

    Resource::new(DEPLOYMENT_GROUP_TYPE, Value::Object(properties))
}

/// Whether a synthesized deployment group carries trigger configurations
#[must_use]
pub fn has_trigger_configurations(resource: &Resource) -> bool {
    resource.is_type(DEPLOYMENT_GROUP_TYPE)
        && resource
            .properties()
            .and_then(|p| p.get("TriggerConfigurations"))
            .is_some()
}

/// Physical deployment group name: `<stack>-<group logical id>`, truncated
#[must_use]
pub fn deployment_group_name(stack_name: &str, group_logical_id: &str) -> String {
    format!("{stack_name}-{group_logical_id}")
        .chars()
        .take(MAX_DEPLOYMENT_GROUP_NAME_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const APP: &str = "MyCDApp";
    const GROUP: &str = "canary-deployments-test-dev-FirstLambdaFunctionDeploymentGroup";

    fn base_group() -> Value {
        json!({
            "Type": "AWS::CodeDeploy::DeploymentGroup",
            "Properties": {
                "ApplicationName": {"Ref": APP},
                "DeploymentGroupName": GROUP,
                "AutoRollbackConfiguration": {
                    "Enabled": true,
                    "Events": ["DEPLOYMENT_FAILURE", "DEPLOYMENT_STOP_ON_ALARM", "DEPLOYMENT_STOP_ON_REQUEST"]
                },
                "ServiceRoleArn": {"Fn::GetAtt": ["CodeDeployServiceRole", "Arn"]},
                "DeploymentConfigName": {
                    "Fn::Sub": ["CodeDeployDefault.Lambda${ConfigName}", {"ConfigName": "Linear10PercentEvery1Minute"}]
                },
                "DeploymentStyle": {"DeploymentType": "BLUE_GREEN", "DeploymentOption": "WITH_TRAFFIC_CONTROL"}
            }
        })
    }

    fn params<'a>(alarms: &'a [Alarm], triggers: Option<&'a [Value]>) -> DeploymentGroupParams<'a> {
        DeploymentGroupParams {
            application: APP,
            group_name: GROUP,
            service_role_arn: None,
            deployment_type: DeploymentType::Linear10PercentEvery1Minute,
            alarms,
            trigger_configurations: triggers,
        }
    }

    #[test]
    fn application_shape() {
        assert_eq!(
            application().as_value(),
            &json!({"Type": "AWS::CodeDeploy::Application", "Properties": {"ComputePlatform": "Lambda"}})
        );
    }

    #[test]
    fn group_with_alarms() {
        let alarms = [
            Alarm::Resource("Alarm1".into()),
            Alarm::Named { name: "Alarm2".into() },
        ];
        let mut expected = base_group();
        expected["Properties"]["AlarmConfiguration"] = json!({
            "Alarms": [{"Name": {"Ref": "Alarm1"}}, {"Name": "Alarm2"}],
            "Enabled": true
        });
        assert_eq!(deployment_group(params(&alarms, None)).as_value(), &expected);
    }

    #[test]
    fn group_without_alarms_has_no_alarm_configuration() {
        let group = deployment_group(params(&[], None));
        assert_eq!(group.as_value(), &base_group());
        assert!(group.properties().unwrap().get("AlarmConfiguration").is_none());
    }

    #[test]
    fn group_with_external_role() {
        let group = deployment_group(DeploymentGroupParams {
            service_role_arn: Some("existing_role_arn"),
            ..params(&[], None)
        });
        let mut expected = base_group();
        expected["Properties"]["ServiceRoleArn"] = json!("existing_role_arn");
        assert_eq!(group.as_value(), &expected);
    }

    #[test]
    fn group_with_trigger_configurations() {
        let triggers = [json!({
            "TriggerName": "rollbacks",
            "TriggerEvents": ["DeploymentRollback"],
            "TargetTriggerArn": "arn:aws:sns:region:account-id:my-sns-topic"
        })];
        let group = deployment_group(params(&[], Some(&triggers)));
        let mut expected = base_group();
        expected["Properties"]["TriggerConfigurations"] = json!(triggers);
        assert_eq!(group.as_value(), &expected);
        assert!(has_trigger_configurations(&group));
    }

    #[test]
    fn alarm_deserializes_both_forms() {
        let alarms: Vec<Alarm> = serde_json::from_value(json!(["Alarm1", {"name": "Alarm2"}])).unwrap();
        assert_eq!(
            alarms,
            vec![Alarm::Resource("Alarm1".into()), Alarm::Named { name: "Alarm2".into() }]
        );
    }

    #[test]
    fn group_name_is_truncated() {
        let stack = "s".repeat(90);
        let name = deployment_group_name(&stack, "HelloLambdaFunctionDeploymentGroup");
        assert_eq!(name.len(), MAX_DEPLOYMENT_GROUP_NAME_LEN);
        assert!(name.starts_with(&stack));
        assert_eq!(
            deployment_group_name("svc-dev", "HelloLambdaFunctionDeploymentGroup"),
            "svc-dev-HelloLambdaFunctionDeploymentGroup"
        );
    }
}
