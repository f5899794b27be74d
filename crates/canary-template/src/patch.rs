//! Additive template patches
//!
//! Provides [`TemplatePatch`]: the set of resources a transformation pass
//! wants to add or replace, kept separate from the template until the caller
//! applies it.

use indexmap::IndexMap;

use crate::resource::Resource;

/// Operation on a single logical id
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOperation {
    /// Introduce a logical id the template did not have
    Add(Resource),

    /// Replace an existing logical id wholesale
    Replace(Resource),
}

impl PatchOperation {
    /// Resource carried by the operation
    #[inline]
    #[must_use]
    pub fn resource(&self) -> &Resource {
        match self {
            Self::Add(resource) | Self::Replace(resource) => resource,
        }
    }

    /// Take the carried resource
    #[inline]
    #[must_use]
    pub fn into_resource(self) -> Resource {
        match self {
            Self::Add(resource) | Self::Replace(resource) => resource,
        }
    }

    /// Whether this introduces a new logical id
    #[inline]
    #[must_use]
    pub fn is_add(&self) -> bool {
        matches!(self, Self::Add(_))
    }
}

/// Ordered set of patch operations keyed by logical id
///
/// Recording a second operation for the same logical id replaces the first
/// but keeps its position. There is no removal operation:
/// applying a patch can only add or overwrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplatePatch {
    entries: IndexMap<String, PatchOperation>,
}

impl TemplatePatch {
    /// Create empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new resource
    #[inline]
    pub fn add(&mut self, logical_id: impl Into<String>, resource: Resource) {
        self.entries.insert(logical_id.into(), PatchOperation::Add(resource));
    }

    /// Record a replacement for an existing resource
    #[inline]
    pub fn replace(&mut self, logical_id: impl Into<String>, resource: Resource) {
        self.entries
            .insert(logical_id.into(), PatchOperation::Replace(resource));
    }

    /// Resource recorded for `logical_id`
    #[inline]
    #[must_use]
    pub fn get(&self, logical_id: &str) -> Option<&Resource> {
        self.entries.get(logical_id).map(PatchOperation::resource)
    }

    /// Operation recorded for `logical_id`
    #[inline]
    #[must_use]
    pub fn operation(&self, logical_id: &str) -> Option<&PatchOperation> {
        self.entries.get(logical_id)
    }

    /// Check if an operation exists for `logical_id`
    #[inline]
    #[must_use]
    pub fn contains(&self, logical_id: &str) -> bool {
        self.entries.contains_key(logical_id)
    }

    /// Number of operations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if patch is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Logical ids introduced by this patch, in order
    pub fn added(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, op)| op.is_add())
            .map(|(id, _)| id.as_str())
    }

    /// Logical ids replaced by this patch, in order
    pub fn replaced(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, op)| !op.is_add())
            .map(|(id, _)| id.as_str())
    }

    /// Iterate over operations in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PatchOperation)> {
        self.entries.iter().map(|(id, op)| (id.as_str(), op))
    }

    /// Append all operations of `other`
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }
}

impl IntoIterator for TemplatePatch {
    type Item = (String, PatchOperation);
    type IntoIter = indexmap::map::IntoIter<String, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
