//! IAM roles for CodeDeploy

use canary_template::{pointer, PropertyPath, Resource};
use serde_json::{json, Value};

/// Type tag of an IAM role
pub const ROLE_TYPE: &str = "AWS::IAM::Role";

/// Logical id of the generated CodeDeploy service role
pub const CODE_DEPLOY_ROLE_LOGICAL_ID: &str = "CodeDeployServiceRole";

const LAMBDA_LIMITED_POLICY: &str =
    "arn:aws:iam::aws:policy/service-role/AWSCodeDeployRoleForLambdaLimited";
const SNS_FULL_ACCESS_POLICY: &str = "arn:aws:iam::aws:policy/AmazonSNSFullAccess";

/// Build the service role CodeDeploy assumes
///
/// Trigger configurations publish to SNS, so the role gets SNS access when
/// any deployment group declares them.
#[must_use]
pub fn code_deploy_role(permissions_boundary: Option<&str>, with_triggers: bool) -> Resource {
    let mut managed_policies = vec![LAMBDA_LIMITED_POLICY];
    if with_triggers {
        managed_policies.push(SNS_FULL_ACCESS_POLICY);
    }

    let mut properties = json!({
        "ManagedPolicyArns": managed_policies,
        "AssumeRolePolicyDocument": {
            "Version": "2012-10-17",
            "Statement": [{
                "Action": ["sts:AssumeRole"],
                "Effect": "Allow",
                "Principal": {"Service": ["codedeploy.amazonaws.com"]}
            }]
        }
    });
    if let (Some(boundary), Value::Object(map)) = (permissions_boundary, &mut properties) {
        map.insert("PermissionsBoundary".into(), json!(boundary));
    }

    Resource::new(ROLE_TYPE, properties)
}

/// ARN of a deployment group, assembled at deploy time
#[must_use]
pub fn deployment_group_arn(application: &str, group_name: &str) -> Value {
    json!({
        "Fn::Join": ["", [
            "arn:",
            pointer::reference("AWS::Partition"),
            ":codedeploy:",
            pointer::reference("AWS::Region"),
            ":",
            pointer::reference("AWS::AccountId"),
            ":deploymentgroup:",
            pointer::reference(application),
            "/",
            group_name
        ]]
    })
}

/// Copy of the function execution role allowed to report hook results
///
/// Appends one statement granting
/// `codedeploy:PutLifecycleEventHookExecutionStatus` on the given deployment
/// groups to the role's first inline policy. Returns `None` when there are
/// no groups or the role has no inline policy statement list to extend.
#[must_use]
pub fn execution_role_with_code_deploy(
    role: &Resource,
    application: &str,
    group_names: &[String],
) -> Option<Resource> {
    if group_names.is_empty() {
        return None;
    }

    let statements_path: PropertyPath = PropertyPath::from_keys(["Properties", "Policies"])
        .at(0)
        .concat(&PropertyPath::from_keys(["PolicyDocument", "Statement"]));
    let Some(Value::Array(statements)) = role.get(&statements_path) else {
        tracing::debug!("Execution role has no inline policy statements; leaving it untouched");
        return None;
    };

    let resources: Vec<Value> = group_names
        .iter()
        .map(|name| deployment_group_arn(application, name))
        .collect();
    let mut statements = statements.clone();
    statements.push(json!({
        "Effect": "Allow",
        "Action": ["codedeploy:PutLifecycleEventHookExecutionStatus"],
        "Resource": resources
    }));

    role.with(&statements_path, Value::Array(statements)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn execution_role() -> Resource {
        Resource::from_value(json!({
            "Type": "AWS::IAM::Role",
            "Properties": {
                "RoleName": "svc-dev-lambdaRole",
                "Policies": [{
                    "PolicyName": "svc-dev-lambda",
                    "PolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{"Effect": "Allow", "Action": ["logs:CreateLogStream"], "Resource": "*"}]
                    }
                }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn role_without_triggers() {
        let role = code_deploy_role(None, false);
        assert_eq!(
            role.properties().unwrap()["ManagedPolicyArns"],
            json!([LAMBDA_LIMITED_POLICY])
        );
        assert!(role.properties().unwrap().get("PermissionsBoundary").is_none());
        assert_eq!(
            role.properties().unwrap()["AssumeRolePolicyDocument"]["Statement"][0]["Principal"],
            json!({"Service": ["codedeploy.amazonaws.com"]})
        );
    }

    #[test]
    fn role_with_triggers_and_boundary() {
        let role = code_deploy_role(Some("arn:aws:iam::123:policy/boundary"), true);
        let properties = role.properties().unwrap();
        assert_eq!(
            properties["ManagedPolicyArns"],
            json!([LAMBDA_LIMITED_POLICY, SNS_FULL_ACCESS_POLICY])
        );
        assert_eq!(properties["PermissionsBoundary"], json!("arn:aws:iam::123:policy/boundary"));
    }

    #[test]
    fn execution_role_gets_hook_statement() {
        let role = execution_role();
        let groups = vec!["svc-dev-PreHookLambdaFunctionDeploymentGroup".to_string()];
        let updated = execution_role_with_code_deploy(&role, "SvcDevDeploymentApplication", &groups)
            .unwrap();

        let statements = &updated.properties().unwrap()["Policies"][0]["PolicyDocument"]["Statement"];
        assert_eq!(statements.as_array().unwrap().len(), 2);
        assert_eq!(
            statements[1],
            json!({
                "Effect": "Allow",
                "Action": ["codedeploy:PutLifecycleEventHookExecutionStatus"],
                "Resource": [deployment_group_arn(
                    "SvcDevDeploymentApplication",
                    "svc-dev-PreHookLambdaFunctionDeploymentGroup"
                )]
            })
        );
        assert_eq!(updated.properties().unwrap()["RoleName"], json!("svc-dev-lambdaRole"));
        // Input is not mutated
        assert_eq!(role, execution_role());
    }

    #[test]
    fn execution_role_without_groups_is_skipped() {
        assert!(execution_role_with_code_deploy(&execution_role(), "App", &[]).is_none());
    }

    #[test]
    fn execution_role_without_policies_is_skipped() {
        let role = Resource::new("AWS::IAM::Role", json!({"RoleName": "bare"}));
        let groups = vec!["g".to_string()];
        assert!(execution_role_with_code_deploy(&role, "App", &groups).is_none());
    }
}
