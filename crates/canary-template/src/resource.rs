//! Template resources
//!
//! A [`Resource`] is a loosely-typed object with a mandatory string `Type`.
//! Everything else (`Properties`, `DependsOn`, `UpdatePolicy`, `Condition`,
//! ...) is carried verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path::{self, PathError, PathSegment, PropertyPath, WriteMode};
use crate::template::TemplateError;

/// Key holding the resource type tag
pub const TYPE: &str = "Type";

/// Key holding the resource property tree
pub const PROPERTIES: &str = "Properties";

/// Key holding explicit dependencies
pub const DEPENDS_ON: &str = "DependsOn";

/// Single resource of a template
///
/// # Invariants
/// - The underlying value is an object
/// - `Type` is present and is a string, and no write through [`Resource::set`]
///   can change it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Resource {
    value: Value,
}

impl Resource {
    /// Create resource with a type tag and properties
    #[must_use]
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        let mut map = Map::new();
        map.insert(TYPE.to_string(), Value::String(resource_type.into()));
        map.insert(PROPERTIES.to_string(), properties);
        Self {
            value: Value::Object(map),
        }
    }

    /// Wrap a parsed JSON value
    ///
    /// # Errors
    /// Returns error if the value is not an object or lacks a string `Type`
    pub fn from_value(value: Value) -> Result<Self, TemplateError> {
        match value.get(TYPE) {
            Some(Value::String(_)) => Ok(Self { value }),
            Some(_) => Err(TemplateError::InvalidResource("`Type` is not a string".into())),
            None if value.is_object() => {
                Err(TemplateError::InvalidResource("missing `Type`".into()))
            }
            None => Err(TemplateError::InvalidResource("not an object".into())),
        }
    }

    /// Resource type tag (e.g. `AWS::Lambda::Function`)
    #[inline]
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.value.get(TYPE).and_then(Value::as_str).unwrap_or_default()
    }

    /// Check the type tag
    #[inline]
    #[must_use]
    pub fn is_type(&self, resource_type: &str) -> bool {
        self.resource_type() == resource_type
    }

    /// Property tree (if any)
    #[inline]
    #[must_use]
    pub fn properties(&self) -> Option<&Value> {
        self.value.get(PROPERTIES)
    }

    /// Explicit dependencies, normalised to a list
    #[must_use]
    pub fn depends_on(&self) -> Vec<&str> {
        match self.value.get(DEPENDS_ON) {
            Some(Value::String(single)) => vec![single.as_str()],
            Some(Value::Array(many)) => many.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Read the node at `path`, relative to the resource root
    #[inline]
    #[must_use]
    pub fn get(&self, path: &PropertyPath) -> Option<&Value> {
        path::get(&self.value, path)
    }

    /// Write `new_value` at `path`, relative to the resource root
    ///
    /// # Errors
    /// Returns [`PathError::Protected`] for paths that would replace the
    /// whole resource or its `Type`, and [`PathError::Missing`] as described
    /// in [`path::set`].
    pub fn set(&mut self, path: &PropertyPath, new_value: Value, mode: WriteMode) -> Result<(), PathError> {
        match path.first() {
            None => return Err(PathError::Protected(String::new())),
            Some(PathSegment::Key(key)) if key == TYPE => {
                return Err(PathError::Protected(path.to_string()));
            }
            _ => {}
        }
        path::set(&mut self.value, path, new_value, mode)
    }

    /// Copy of this resource with `new_value` written at an existing path
    ///
    /// # Errors
    /// See [`Resource::set`]
    pub fn with(&self, path: &PropertyPath, new_value: Value) -> Result<Self, PathError> {
        let mut copy = self.clone();
        copy.set(path, new_value, WriteMode::Existing)?;
        Ok(copy)
    }

    /// Set a top-level member such as `UpdatePolicy` or `DependsOn`
    #[must_use]
    pub fn with_member(mut self, key: &str, member: Value) -> Self {
        if key != TYPE {
            if let Value::Object(map) = &mut self.value {
                map.insert(key.to_string(), member);
            }
        }
        self
    }

    /// Borrow as JSON
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Convert into JSON
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }
}

impl TryFrom<Value> for Resource {
    type Error = TemplateError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Resource> for Value {
    fn from(resource: Resource) -> Self {
        resource.value
    }
}
