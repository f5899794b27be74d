//! Reference locator
//!
//! Finds every resource of a given kind whose properties point at a
//! function. Where a kind keeps its pointer is a fixed table ([`site`]); the
//! matching itself is generic over that table.

use canary_template::{pointer, Pointer, PropertyPath, Resource, Template};
use serde_json::Value;

use crate::kind::ResourceKind;
use crate::lambda::VERSION_TYPE;

/// How a function pointer is expressed at a [`PointerSite`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerForm {
    /// `{"Fn::GetAtt": [function, attr]}`
    Attribute,
    /// Attribute reference, or a direct `{"Ref": function}` when no
    /// attribute reference is present
    AttributeOrDirect,
    /// The function id appears somewhere inside a composed expression
    Embedded,
}

/// Where a resource kind may hold a pointer to a function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerSite {
    /// Array to scan element by element, relative to the resource root
    pub list: Option<&'static [&'static str]>,
    /// Pointer location, relative to each list element or to the resource root
    pub pointer: &'static [&'static str],
    /// Expected pointer shape
    pub form: PointerForm,
}

impl PointerSite {
    const fn single(pointer: &'static [&'static str], form: PointerForm) -> Self {
        Self {
            list: None,
            pointer,
            form,
        }
    }

    const fn each(list: &'static [&'static str], pointer: &'static [&'static str]) -> Self {
        Self {
            list: Some(list),
            pointer,
            form: PointerForm::Attribute,
        }
    }
}

/// Pointer site of each kind
#[must_use]
pub const fn site(kind: ResourceKind) -> PointerSite {
    use PointerForm::{Attribute, AttributeOrDirect, Embedded};

    match kind {
        ResourceKind::LambdaPermission => {
            PointerSite::single(&["Properties", "FunctionName"], AttributeOrDirect)
        }
        ResourceKind::EventSourceMapping => {
            PointerSite::single(&["Properties", "FunctionName"], Attribute)
        }
        ResourceKind::ApiGatewayMethod => {
            PointerSite::single(&["Properties", "Integration", "Uri"], Embedded)
        }
        ResourceKind::ApiGatewayV2Integration => {
            PointerSite::single(&["Properties", "IntegrationUri"], Embedded)
        }
        ResourceKind::ApiGatewayV2Authorizer => {
            PointerSite::single(&["Properties", "AuthorizerUri"], Embedded)
        }
        ResourceKind::SnsTopic => PointerSite::each(&["Properties", "Subscription"], &["Endpoint"]),
        ResourceKind::SnsSubscription => {
            PointerSite::single(&["Properties", "Endpoint"], Attribute)
        }
        ResourceKind::S3Bucket => PointerSite::each(
            &["Properties", "NotificationConfiguration", "LambdaConfigurations"],
            &["Function"],
        ),
        ResourceKind::EventsRule => PointerSite::each(&["Properties", "Targets"], &["Arn"]),
        ResourceKind::LogsSubscriptionFilter => {
            PointerSite::single(&["Properties", "DestinationArn"], Attribute)
        }
        ResourceKind::IotTopicRule => PointerSite::each(
            &["Properties", "TopicRulePayload", "Actions"],
            &["Lambda", "FunctionArn"],
        ),
        ResourceKind::AppSyncDataSource => {
            PointerSite::single(&["Properties", "LambdaConfig", "LambdaFunctionArn"], Attribute)
        }
    }
}

/// A resource found to point at a function
#[derive(Debug, Clone, PartialEq)]
pub struct Location<'t> {
    /// Logical id of the dependent resource
    pub logical_id: &'t str,
    /// The resource as found in the template
    pub resource: &'t Resource,
    /// Kind it was located as
    pub kind: ResourceKind,
    /// Exact pointer paths to redirect, relative to the resource root
    ///
    /// For list kinds these carry the index of every matching entry.
    pub sites: Vec<PropertyPath>,
}

/// Pointer paths inside `resource` that point at `function`
///
/// Empty when the resource does not reference the function at this kind's
/// site (including list kinds where no entry matches).
#[must_use]
pub fn matching_sites(kind: ResourceKind, resource: &Resource, function: &str) -> Vec<PropertyPath> {
    let site = site(kind);
    let pointer_path = PropertyPath::from_keys(site.pointer.iter().copied());

    match site.list {
        None => resource
            .get(&pointer_path)
            .filter(|value| points_at(value, function, site.form))
            .map(|_| pointer_path.clone())
            .into_iter()
            .collect(),
        Some(list) => {
            let list_path = PropertyPath::from_keys(list.iter().copied());
            let Some(Value::Array(entries)) = resource.get(&list_path) else {
                return Vec::new();
            };
            entries
                .iter()
                .enumerate()
                .filter(|(_, entry)| {
                    canary_template::path::get(entry, &pointer_path)
                        .is_some_and(|value| points_at(value, function, site.form))
                })
                .map(|(index, _)| list_path.at(index).concat(&pointer_path))
                .collect()
        }
    }
}

fn points_at(value: &Value, function: &str, form: PointerForm) -> bool {
    match form {
        PointerForm::Attribute => Pointer::parse(value).is_some_and(|p| p.is_attribute_of(function)),
        PointerForm::AttributeOrDirect => match Pointer::parse(value) {
            Some(p @ Pointer::Attribute { .. }) => p.is_attribute_of(function),
            Some(p @ Pointer::Direct(_)) => p.is_direct_to(function),
            None => false,
        },
        PointerForm::Embedded => pointer::embeds(value, function),
    }
}

/// Resources of `kind` in `template` that point at `function`
#[must_use]
pub fn locate<'t>(template: &'t Template, kind: ResourceKind, function: &str) -> Vec<Location<'t>> {
    template
        .resources_of_type(kind.type_tag())
        .filter_map(|(logical_id, resource)| {
            let sites = matching_sites(kind, resource, function);
            (!sites.is_empty()).then(|| Location {
                logical_id,
                resource,
                kind,
                sites,
            })
        })
        .collect()
}

/// Permissions granting invocation of `function`
#[must_use]
pub fn locate_permissions<'t>(template: &'t Template, function: &str) -> Vec<Location<'t>> {
    locate(template, ResourceKind::LambdaPermission, function)
}

/// Event sources delivering to `function`, grouped by kind
#[must_use]
pub fn locate_events<'t>(template: &'t Template, function: &str) -> Vec<Location<'t>> {
    ResourceKind::EVENT_SOURCES
        .into_iter()
        .flat_map(|kind| locate(template, kind, function))
        .collect()
}

/// Logical id of the version published for `function`
///
/// First `AWS::Lambda::Version` in template order whose `FunctionName` is a
/// direct reference to the function.
#[must_use]
pub fn find_version<'t>(template: &'t Template, function: &str) -> Option<&'t str> {
    let function_name = PropertyPath::from_keys(["Properties", "FunctionName"]);
    template
        .resources_of_type(VERSION_TYPE)
        .find(|(_, resource)| {
            resource
                .get(&function_name)
                .and_then(Pointer::parse)
                .is_some_and(|p| p.is_direct_to(function))
        })
        .map(|(logical_id, _)| logical_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FUNCTION: &str = "HelloLambdaFunction";

    fn resource(value: Value) -> Resource {
        Resource::from_value(value).unwrap()
    }

    #[test]
    fn permission_matches_attribute_or_direct() {
        let by_attribute = resource(json!({
            "Type": "AWS::Lambda::Permission",
            "Properties": {"FunctionName": {"Fn::GetAtt": [FUNCTION, "Arn"]}}
        }));
        let by_ref = resource(json!({
            "Type": "AWS::Lambda::Permission",
            "Properties": {"FunctionName": {"Ref": FUNCTION}}
        }));
        let other = resource(json!({
            "Type": "AWS::Lambda::Permission",
            "Properties": {"FunctionName": {"Ref": "OtherLambdaFunction"}}
        }));

        assert_eq!(matching_sites(ResourceKind::LambdaPermission, &by_attribute, FUNCTION).len(), 1);
        assert_eq!(matching_sites(ResourceKind::LambdaPermission, &by_ref, FUNCTION).len(), 1);
        assert!(matching_sites(ResourceKind::LambdaPermission, &other, FUNCTION).is_empty());
    }

    #[test]
    fn attribute_site_ignores_direct_reference() {
        let mapping = resource(json!({
            "Type": "AWS::Logs::SubscriptionFilter",
            "Properties": {"DestinationArn": {"Ref": FUNCTION}}
        }));
        assert!(matching_sites(ResourceKind::LogsSubscriptionFilter, &mapping, FUNCTION).is_empty());
    }

    #[test]
    fn embedded_site_needs_whole_id() {
        let method = resource(json!({
            "Type": "AWS::ApiGateway::Method",
            "Properties": {"Integration": {"Uri": {"Fn::Join": ["", [
                "arn:aws:apigateway:", {"Ref": "AWS::Region"},
                ":lambda:path/2015-03-31/functions/",
                {"Fn::GetAtt": ["HelloLambdaFunctionTwo", "Arn"]}, "/invocations"
            ]]}}}
        }));
        assert!(matching_sites(ResourceKind::ApiGatewayMethod, &method, FUNCTION).is_empty());
        assert_eq!(
            matching_sites(ResourceKind::ApiGatewayMethod, &method, "HelloLambdaFunctionTwo"),
            vec!["Properties.Integration.Uri".parse::<PropertyPath>().unwrap()]
        );
    }

    #[test]
    fn list_site_records_matching_indices() {
        let bucket = resource(json!({
            "Type": "AWS::S3::Bucket",
            "Properties": {"NotificationConfiguration": {"LambdaConfigurations": [
                {"Event": "s3:ObjectCreated:*", "Function": {"Fn::GetAtt": ["OtherLambdaFunction", "Arn"]}},
                {"Event": "s3:ObjectCreated:*", "Function": {"Fn::GetAtt": [FUNCTION, "Arn"]}},
                {"Event": "s3:ObjectRemoved:*", "Function": {"Fn::GetAtt": [FUNCTION, "Arn"]}}
            ]}}
        }));
        let sites: Vec<String> = matching_sites(ResourceKind::S3Bucket, &bucket, FUNCTION)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            sites,
            vec![
                "Properties.NotificationConfiguration.LambdaConfigurations[1].Function",
                "Properties.NotificationConfiguration.LambdaConfigurations[2].Function",
            ]
        );
    }

    #[test]
    fn list_site_without_match_is_not_applicable() {
        let bucket = resource(json!({
            "Type": "AWS::S3::Bucket",
            "Properties": {"NotificationConfiguration": {"LambdaConfigurations": [
                {"Function": {"Fn::GetAtt": ["OtherLambdaFunction", "Arn"]}}
            ]}}
        }));
        assert!(matching_sites(ResourceKind::S3Bucket, &bucket, FUNCTION).is_empty());
    }

    #[test]
    fn missing_list_is_not_applicable() {
        let bucket = resource(json!({"Type": "AWS::S3::Bucket", "Properties": {"BucketName": "b"}}));
        assert!(matching_sites(ResourceKind::S3Bucket, &bucket, FUNCTION).is_empty());
    }

    #[test]
    fn locate_filters_by_type_and_pointer() {
        let template = Template::from_value(json!({"Resources": {
            "A": {"Type": "AWS::SNS::Subscription", "Properties": {"Endpoint": {"Fn::GetAtt": [FUNCTION, "Arn"]}}},
            "B": {"Type": "AWS::SNS::Subscription", "Properties": {"Endpoint": {"Fn::GetAtt": ["Other", "Arn"]}}},
            "C": {"Type": "AWS::Logs::SubscriptionFilter", "Properties": {"DestinationArn": {"Fn::GetAtt": [FUNCTION, "Arn"]}}}
        }}))
        .unwrap();

        let located = locate(&template, ResourceKind::SnsSubscription, FUNCTION);
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].logical_id, "A");

        let events: Vec<_> = locate_events(&template, FUNCTION)
            .into_iter()
            .map(|l| l.logical_id)
            .collect();
        assert_eq!(events, vec!["C", "A"]);
    }

    #[test]
    fn find_version_by_direct_reference() {
        let template = Template::from_value(json!({"Resources": {
            "OtherVersionAbc": {"Type": "AWS::Lambda::Version", "Properties": {"FunctionName": {"Ref": "Other"}}},
            "HelloLambdaVersionXyz": {"Type": "AWS::Lambda::Version", "Properties": {"FunctionName": {"Ref": FUNCTION}}}
        }}))
        .unwrap();
        assert_eq!(find_version(&template, FUNCTION), Some("HelloLambdaVersionXyz"));
        assert_eq!(find_version(&template, "Missing"), None);
    }
}
