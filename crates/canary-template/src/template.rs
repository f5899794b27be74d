//! Compiled template document
//!
//! Resources keyed by logical id, plus every other top-level section carried
//! verbatim.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::patch::{PatchOperation, TemplatePatch};
use crate::resource::Resource;

/// Key of the resource section
pub const RESOURCES: &str = "Resources";

/// In-memory template
///
/// Resource order is insertion order and survives [`Template::apply`]:
/// replaced resources keep their slot, added ones are appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "Resources", default)]
    resources: IndexMap<String, Resource>,

    #[serde(flatten)]
    sections: Map<String, Value>,
}

impl Template {
    /// Create empty template
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an already-parsed document
    ///
    /// # Errors
    /// Returns error if `Resources` is not an object of valid resources
    pub fn from_value(value: Value) -> Result<Self, TemplateError> {
        serde_json::from_value(value).map_err(TemplateError::InvalidTemplate)
    }

    /// Convert back into a document
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut root = self.sections;
        let resources: Map<String, Value> = self
            .resources
            .into_iter()
            .map(|(id, resource)| (id, resource.into_value()))
            .collect();
        root.insert(RESOURCES.to_string(), Value::Object(resources));
        Value::Object(root)
    }

    /// Resource by logical id
    #[inline]
    #[must_use]
    pub fn get(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    /// Check if a logical id exists
    #[inline]
    #[must_use]
    pub fn contains(&self, logical_id: &str) -> bool {
        self.resources.contains_key(logical_id)
    }

    /// Insert or overwrite a resource, returning the previous one
    #[inline]
    pub fn insert(&mut self, logical_id: impl Into<String>, resource: Resource) -> Option<Resource> {
        self.resources.insert(logical_id.into(), resource)
    }

    /// Number of resources
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if there are no resources
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterate over resources in template order
    pub fn resources(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Iterate over resources with the given type tag
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Resource)> + 'a {
        self.resources()
            .filter(move |(_, resource)| resource.is_type(resource_type))
    }

    /// Non-resource top-level section
    #[inline]
    #[must_use]
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.sections.get(key)
    }

    /// Merge a patch into this template
    ///
    /// Shallow key union: every patched logical id is inserted or
    /// overwritten, nothing else changes.
    pub fn apply(&mut self, patch: TemplatePatch) {
        for (logical_id, operation) in patch {
            let existed = self.resources.contains_key(&logical_id);
            match (&operation, existed) {
                (PatchOperation::Add(_), true) => {
                    tracing::warn!("Patch adds {} which already exists; overwriting", logical_id);
                }
                (PatchOperation::Replace(_), false) => {
                    tracing::warn!("Patch replaces {} which does not exist; adding", logical_id);
                }
                _ => {}
            }
            self.resources.insert(logical_id, operation.into_resource());
        }
    }

    /// Copy of this template with `patch` applied
    #[must_use]
    pub fn merged(&self, patch: TemplatePatch) -> Self {
        let mut copy = self.clone();
        copy.apply(patch);
        copy
    }
}

impl TryFrom<Value> for Template {
    type Error = TemplateError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Template> for Value {
    fn from(template: Template) -> Self {
        template.into_value()
    }
}

/// Template error types
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid template: {0}")]
    InvalidTemplate(#[source] serde_json::Error),

    #[error("invalid resource: {0}")]
    InvalidResource(String),
}
