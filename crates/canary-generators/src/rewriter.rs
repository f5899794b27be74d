//! Reference rewriter
//!
//! Redirects located function pointers to an alias. Every strategy copies its
//! input and replaces only the pointer nodes the locator recorded; sibling
//! data, including unrelated list entries, is left as it was.

use canary_template::{pointer, Resource, WriteMode};
use serde_json::Value;

use crate::api_gateway;
use crate::error::GenerateError;
use crate::kind::ResourceKind;
use crate::locator::{self, Location};

/// Value written in place of a function pointer for `kind`
#[must_use]
pub fn replacement(kind: ResourceKind, alias: &str) -> Value {
    match kind {
        ResourceKind::ApiGatewayMethod => api_gateway::invocation_uri(alias),
        ResourceKind::ApiGatewayV2Integration | ResourceKind::ApiGatewayV2Authorizer => {
            api_gateway::v2_invocation_uri(alias)
        }
        ResourceKind::LambdaPermission
        | ResourceKind::EventSourceMapping
        | ResourceKind::SnsTopic
        | ResourceKind::SnsSubscription
        | ResourceKind::S3Bucket
        | ResourceKind::EventsRule
        | ResourceKind::LogsSubscriptionFilter
        | ResourceKind::IotTopicRule
        | ResourceKind::AppSyncDataSource => pointer::reference(alias),
    }
}

/// Rewrite the pointers recorded in `location` on `resource`
///
/// `resource` is usually `location.resource`, but may be a copy already
/// rewritten for another function: the recorded sites stay valid because
/// earlier rewrites only replace pointer nodes in place.
///
/// # Errors
/// Returns [`GenerateError::KindMismatch`] if `resource` is not of the
/// located kind, and [`GenerateError::InvalidRewrite`] if a recorded site no
/// longer exists.
pub fn rewrite(resource: &Resource, location: &Location<'_>, alias: &str) -> Result<Resource, GenerateError> {
    if !resource.is_type(location.kind.type_tag()) {
        return Err(GenerateError::KindMismatch {
            logical_id: location.logical_id.to_string(),
            expected: location.kind,
            actual: resource.resource_type().to_string(),
        });
    }

    let value = replacement(location.kind, alias);
    let mut rewritten = resource.clone();
    for site in &location.sites {
        rewritten
            .set(site, value.clone(), WriteMode::Existing)
            .map_err(|source| GenerateError::InvalidRewrite {
                logical_id: location.logical_id.to_string(),
                source,
            })?;
        tracing::debug!("Redirected {}.{} to {}", location.logical_id, site, alias);
    }
    Ok(rewritten)
}

/// Rewrite any pointer from `resource` to `function` so it targets `alias`
///
/// Looks the kind up from the resource type, locates the pointers, and
/// rewrites them. A resource that does not point at `function` comes back
/// unchanged.
///
/// # Errors
/// Returns [`GenerateError::UnsupportedResourceKind`] for resource types
/// outside [`ResourceKind`].
pub fn rewrite_reference(
    logical_id: &str,
    resource: &Resource,
    alias: &str,
    function: &str,
) -> Result<Resource, GenerateError> {
    let kind = ResourceKind::from_type_tag(resource.resource_type()).ok_or_else(|| {
        GenerateError::UnsupportedResourceKind {
            logical_id: logical_id.to_string(),
            resource_type: resource.resource_type().to_string(),
        }
    })?;

    let location = Location {
        logical_id,
        resource,
        kind,
        sites: locator::matching_sites(kind, resource, function),
    };
    rewrite(resource, &location, alias)
}
