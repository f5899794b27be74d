//! Testing utilities for the canary workspace
//!
//! Shared template fixtures, one builder per resource kind.

#![allow(missing_docs)]

use canary_template::{Resource, Template};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber, honouring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn resource(value: Value) -> Resource {
    Resource::from_value(value).unwrap()
}

pub fn template(resources: Value) -> Template {
    Template::from_value(json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Resources": resources
    }))
    .unwrap()
}

pub fn get_att(function: &str) -> Value {
    json!({"Fn::GetAtt": [function, "Arn"]})
}

pub fn function(handler: &str) -> Value {
    json!({
        "Type": "AWS::Lambda::Function",
        "Properties": {
            "Handler": handler,
            "Runtime": "nodejs18.x",
            "Role": {"Fn::GetAtt": ["IamRoleLambdaExecution", "Arn"]}
        }
    })
}

pub fn version(function: &str) -> Value {
    json!({
        "Type": "AWS::Lambda::Version",
        "DeletionPolicy": "Retain",
        "Properties": {
            "FunctionName": {"Ref": function},
            "CodeSha256": "abc123"
        }
    })
}

pub fn execution_role() -> Value {
    json!({
        "Type": "AWS::IAM::Role",
        "Properties": {
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": {"Service": ["lambda.amazonaws.com"]},
                    "Action": ["sts:AssumeRole"]
                }]
            },
            "Policies": [{
                "PolicyName": "canary-deployments-test-dev-lambda",
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Action": ["logs:CreateLogStream", "logs:PutLogEvents"],
                        "Resource": "*"
                    }]
                }
            }]
        }
    })
}

pub fn permission(function_name: Value) -> Value {
    json!({
        "Type": "AWS::Lambda::Permission",
        "Properties": {
            "FunctionName": function_name,
            "Action": "lambda:InvokeFunction",
            "Principal": "sns.amazonaws.com"
        }
    })
}

pub fn event_source_mapping(function: &str) -> Value {
    json!({
        "Type": "AWS::Lambda::EventSourceMapping",
        "DependsOn": "IamRoleLambdaExecution",
        "Properties": {
            "BatchSize": 10,
            "EventSourceArn": {"Fn::GetAtt": ["StreamsTable", "StreamArn"]},
            "FunctionName": get_att(function),
            "StartingPosition": "TRIM_HORIZON",
            "Enabled": true
        }
    })
}

pub fn api_gateway_method(function: &str) -> Value {
    json!({
        "Type": "AWS::ApiGateway::Method",
        "Properties": {
            "HttpMethod": "GET",
            "RequestParameters": {},
            "ResourceId": {"Ref": "ApiGatewayResourceHello"},
            "RestApiId": {"Ref": "ApiGatewayRestApi"},
            "AuthorizationType": "NONE",
            "Integration": {
                "IntegrationHttpMethod": "POST",
                "Type": "AWS_PROXY",
                "Uri": {"Fn::Join": ["", [
                    "arn:",
                    {"Ref": "AWS::Partition"},
                    ":apigateway:",
                    {"Ref": "AWS::Region"},
                    ":lambda:path/2015-03-31/functions/",
                    get_att(function),
                    "/invocations"
                ]]}
            },
            "MethodResponses": []
        }
    })
}

fn v2_uri(function: &str) -> Value {
    json!({"Fn::Join": ["", [
        "arn:",
        {"Ref": "AWS::Partition"},
        ":apigateway:",
        {"Ref": "AWS::Region"},
        ":lambda:path/2015-03-31/functions/",
        get_att(function),
        "/invocations"
    ]]})
}

pub fn api_gateway_v2_integration(function: &str) -> Value {
    json!({
        "Type": "AWS::ApiGatewayV2::Integration",
        "Properties": {
            "ApiId": {"Ref": "HttpApi"},
            "IntegrationType": "AWS_PROXY",
            "IntegrationUri": v2_uri(function),
            "PayloadFormatVersion": "2.0"
        }
    })
}

pub fn api_gateway_v2_authorizer(function: &str) -> Value {
    json!({
        "Type": "AWS::ApiGatewayV2::Authorizer",
        "Properties": {
            "ApiId": {"Ref": "HttpApi"},
            "AuthorizerType": "REQUEST",
            "AuthorizerUri": v2_uri(function),
            "Name": "authorizer"
        }
    })
}

pub fn sns_topic(functions: &[&str]) -> Value {
    let subscriptions: Vec<Value> = functions
        .iter()
        .map(|f| json!({"Endpoint": get_att(f), "Protocol": "lambda"}))
        .chain(std::iter::once(json!({"Endpoint": "ops@example.com", "Protocol": "email"})))
        .collect();
    json!({
        "Type": "AWS::SNS::Topic",
        "Properties": {
            "TopicName": "snsTopic",
            "Subscription": subscriptions
        }
    })
}

pub fn sns_subscription(function: &str) -> Value {
    json!({
        "Type": "AWS::SNS::Subscription",
        "Properties": {
            "TopicArn": "arn:aws:sns:us-east-1:123456789012:topic",
            "Protocol": "lambda",
            "Endpoint": get_att(function),
            "FilterPolicy": {"event": ["created"]}
        }
    })
}

pub fn s3_bucket(functions: &[&str]) -> Value {
    let configurations: Vec<Value> = functions
        .iter()
        .map(|f| json!({"Event": "s3:ObjectCreated:*", "Function": get_att(f)}))
        .collect();
    json!({
        "Type": "AWS::S3::Bucket",
        "Properties": {
            "BucketName": "uploads",
            "NotificationConfiguration": {"LambdaConfigurations": configurations}
        },
        "DependsOn": ["HelloLambdaPermissionUploadsS3"]
    })
}

pub fn events_rule(functions: &[&str]) -> Value {
    let targets: Vec<Value> = functions
        .iter()
        .enumerate()
        .map(|(i, f)| json!({"Arn": get_att(f), "Id": format!("target{i}")}))
        .collect();
    json!({
        "Type": "AWS::Events::Rule",
        "Properties": {
            "ScheduleExpression": "rate(5 minutes)",
            "State": "ENABLED",
            "Targets": targets
        }
    })
}

pub fn log_subscription_filter(function: &str) -> Value {
    json!({
        "Type": "AWS::Logs::SubscriptionFilter",
        "DependsOn": "lambdaPermissionLogicalId",
        "Properties": {
            "LogGroupName": "logGroupName",
            "FilterPattern": "FilterPattern",
            "DestinationArn": get_att(function)
        }
    })
}

pub fn iot_topic_rule(function: &str) -> Value {
    json!({
        "Type": "AWS::IoT::TopicRule",
        "Properties": {
            "TopicRulePayload": {
                "RuleDisabled": "false",
                "Sql": "SELECT * FROM 'some_topic'",
                "Actions": [{"Lambda": {"FunctionArn": get_att(function)}}]
            }
        }
    })
}

pub fn app_sync_data_source(function: &str) -> Value {
    json!({
        "Type": "AWS::AppSync::DataSource",
        "Properties": {
            "ApiId": {"Fn::GetAtt": ["GraphQlApi", "ApiId"]},
            "Name": "lambdaSource",
            "Type": "AWS_LAMBDA",
            "ServiceRoleArn": {"Fn::GetAtt": ["GraphQlDsRole", "Arn"]},
            "LambdaConfig": {"LambdaFunctionArn": get_att(function)}
        }
    })
}
