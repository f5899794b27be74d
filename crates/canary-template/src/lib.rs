//! Canary Template
//!
//! In-memory CloudFormation document tree with structural, path-addressed
//! reads and writes.
//!
//! # Core Concepts
//!
//! - [`Template`]: Resources keyed by logical id, other sections kept verbatim
//! - [`Resource`]: Loosely-typed resource with a mandatory `Type`
//! - [`PropertyPath`]: Key/index addressing within a resource
//! - [`Pointer`]: Structural recognition of `Ref` and `Fn::GetAtt`
//! - [`TemplatePatch`]: Additive set of resource additions and replacements
//!
//! # Example
//!
//! ```rust,ignore
//! use canary_template::{pointer, PropertyPath, Template, TemplatePatch};
//!
//! let template = Template::from_value(document)?;
//! let filter = template.get("LogsSubscriptionFilter").unwrap();
//! let path: PropertyPath = "Properties.DestinationArn".parse()?;
//! let rewritten = filter.with(&path, pointer::reference("HelloAlias"))?;
//!
//! let mut patch = TemplatePatch::new();
//! patch.replace("LogsSubscriptionFilter", rewritten);
//! let updated = template.merged(patch);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod patch;
pub mod path;
pub mod pointer;
mod resource;
mod template;

// Re-exports
pub use patch::{PatchOperation, TemplatePatch};
pub use path::{PathError, PathSegment, PropertyPath, WriteMode};
pub use pointer::Pointer;
pub use resource::{Resource, DEPENDS_ON, PROPERTIES, TYPE};
pub use template::{Template, TemplateError, RESOURCES};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn rewrite_pointer_and_merge() {
        let template = Template::from_value(json!({
            "Resources": {
                "HelloLambdaFunction": {"Type": "AWS::Lambda::Function", "Properties": {}},
                "Filter": {
                    "Type": "AWS::Logs::SubscriptionFilter",
                    "Properties": {
                        "LogGroupName": "group",
                        "DestinationArn": {"Fn::GetAtt": ["HelloLambdaFunction", "Arn"]}
                    }
                }
            }
        }))
        .unwrap();

        let path: PropertyPath = "Properties.DestinationArn".parse().unwrap();
        let filter = template.get("Filter").unwrap();
        let target = filter.get(&path).and_then(Pointer::parse).unwrap();
        assert!(target.is_attribute_of("HelloLambdaFunction"));

        let mut patch = TemplatePatch::new();
        patch.replace("Filter", filter.with(&path, pointer::reference("HelloAlias")).unwrap());
        let merged = template.merged(patch);

        assert_eq!(
            merged.get("Filter").unwrap().as_value(),
            &json!({
                "Type": "AWS::Logs::SubscriptionFilter",
                "Properties": {
                    "LogGroupName": "group",
                    "DestinationArn": {"Ref": "HelloAlias"}
                }
            })
        );
        // Source template is untouched
        assert!(template
            .get("Filter")
            .and_then(|f| f.get(&path))
            .and_then(Pointer::parse)
            .is_some_and(|p| p.is_attribute_of("HelloLambdaFunction")));
    }
}
