//! Intrinsic pointer forms
//!
//! CloudFormation expresses links between resources with two intrinsic
//! objects: `{"Ref": id}` and `{"Fn::GetAtt": [id, attribute]}`. They are
//! recognised here by shape, never by comparing arbitrary keys.

use serde_json::{json, Value};

use crate::path::PropertyPath;

/// Key of a direct reference
pub const REF: &str = "Ref";

/// Key of an attribute reference
pub const GET_ATT: &str = "Fn::GetAtt";

/// A pointer to another resource found inside a property tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer<'a> {
    /// `{"Ref": id}`
    Direct(&'a str),
    /// `{"Fn::GetAtt": [id, attribute]}` or the `"id.attribute"` shorthand
    Attribute {
        logical_id: &'a str,
        attribute: &'a str,
    },
}

impl<'a> Pointer<'a> {
    /// Recognise a pointer by shape
    ///
    /// Returns `None` for anything that is not exactly a single-member
    /// intrinsic object with well-formed arguments.
    #[must_use]
    pub fn parse(value: &'a Value) -> Option<Self> {
        let map = value.as_object()?;
        if map.len() != 1 {
            return None;
        }

        if let Some(target) = map.get(REF) {
            return target.as_str().map(Pointer::Direct);
        }

        match map.get(GET_ATT)? {
            Value::Array(parts) => match parts.as_slice() {
                [Value::String(logical_id), Value::String(attribute)] => Some(Self::Attribute {
                    logical_id: logical_id.as_str(),
                    attribute: attribute.as_str(),
                }),
                _ => None,
            },
            Value::String(shorthand) => {
                shorthand
                    .split_once('.')
                    .map(|(logical_id, attribute)| Self::Attribute {
                        logical_id,
                        attribute,
                    })
            }
            _ => None,
        }
    }

    /// Logical id this pointer names
    #[inline]
    #[must_use]
    pub fn logical_id(&self) -> &'a str {
        match *self {
            Self::Direct(logical_id) | Self::Attribute { logical_id, .. } => logical_id,
        }
    }

    /// Whether this is an attribute reference to `logical_id`
    #[inline]
    #[must_use]
    pub fn is_attribute_of(&self, logical_id: &str) -> bool {
        matches!(self, Self::Attribute { logical_id: id, .. } if *id == logical_id)
    }

    /// Whether this is a direct reference to `logical_id`
    #[inline]
    #[must_use]
    pub fn is_direct_to(&self, logical_id: &str) -> bool {
        matches!(self, Self::Direct(id) if *id == logical_id)
    }
}

/// Build a direct reference `{"Ref": logical_id}`
#[inline]
#[must_use]
pub fn reference(logical_id: &str) -> Value {
    json!({ REF: logical_id })
}

/// Build an attribute reference `{"Fn::GetAtt": [logical_id, attribute]}`
#[inline]
#[must_use]
pub fn attribute(logical_id: &str, attribute: &str) -> Value {
    json!({ GET_ATT: [logical_id, attribute] })
}

/// Flattened view of a tree: every leaf with its path
///
/// Scalars and empty containers are leaves. Order follows the tree.
#[must_use]
pub fn leaves(value: &Value) -> Vec<(PropertyPath, &Value)> {
    let mut out = Vec::new();
    collect_leaves(value, PropertyPath::root(), &mut out);
    out
}

fn collect_leaves<'a>(value: &'a Value, path: PropertyPath, out: &mut Vec<(PropertyPath, &'a Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                collect_leaves(child, path.child(key.as_str()), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                collect_leaves(child, path.at(index), out);
            }
        }
        _ => out.push((path, value)),
    }
}

/// Whether `logical_id` appears as a whole string leaf anywhere in `value`
///
/// This is how pointers embedded in composed expressions (`Fn::Join`,
/// `Fn::Sub` argument maps) are detected, independent of how the surrounding
/// string is assembled.
#[must_use]
pub fn embeds(value: &Value, logical_id: &str) -> bool {
    leaves(value)
        .into_iter()
        .any(|(_, leaf)| leaf.as_str() == Some(logical_id))
}
