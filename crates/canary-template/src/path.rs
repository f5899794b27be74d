//! Property paths for addressing within resources
//!
//! Provides [`PropertyPath`] for hierarchical addressing of nodes inside a
//! loosely-typed JSON tree, plus the [`get`]/[`set`] primitives built on it.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde_json::{Map, Value};

/// One step of a [`PropertyPath`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// Object member
    Key(String),
    /// Array element
    Index(usize),
}

/// Path within a resource tree
///
/// Used to locate and rewrite pointers inside resource properties.
///
/// # Examples
/// - `Properties.FunctionName`
/// - `Properties.TopicRulePayload.Actions[0].Lambda.FunctionArn`
/// - `Properties.DestinationArn.Fn::GetAtt[0]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyPath(Vec<PathSegment>);

impl PropertyPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Create path made only of object keys
    #[must_use]
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(|k| PathSegment::Key(k.into())).collect())
    }

    /// Empty path (root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First segment (if not root)
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&PathSegment> {
        self.0.first()
    }

    /// Append a key segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(PathSegment::Key(key.into()));
        new
    }

    /// Append an index segment, returning new path
    #[inline]
    #[must_use]
    pub fn at(&self, index: usize) -> Self {
        let mut new = self.clone();
        new.0.push(PathSegment::Index(index));
        new
    }

    /// Append all segments of `other`, returning new path
    #[inline]
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut new = self.clone();
        new.0.extend(other.0.iter().cloned());
        new
    }

    /// Path made of the first `len` segments
    #[inline]
    #[must_use]
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PathSegment> {
        self.0.iter()
    }
}

impl Display for PropertyPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for (i, piece) in s.split('.').enumerate() {
            let (key, mut rest) = match piece.find('[') {
                Some(open) => piece.split_at(open),
                None => (piece, ""),
            };

            // A bare index is only allowed at the very start: `[0].Name`
            if key.is_empty() && (rest.is_empty() || i > 0) {
                return Err(PathError::EmptySegment);
            }
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_string()));
            }

            while !rest.is_empty() {
                let close = rest
                    .find(']')
                    .filter(|_| rest.starts_with('['))
                    .ok_or_else(|| PathError::InvalidIndex(piece.to_string()))?;
                let index = rest[1..close]
                    .parse::<usize>()
                    .map_err(|_| PathError::InvalidIndex(piece.to_string()))?;
                segments.push(PathSegment::Index(index));
                rest = &rest[close + 1..];
            }
        }

        Ok(Self(segments))
    }
}

impl From<Vec<PathSegment>> for PropertyPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl Default for PropertyPath {
    fn default() -> Self {
        Self::root()
    }
}

/// How [`set`] treats missing intermediate nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Every intermediate node must already exist
    #[default]
    Existing,
    /// Missing object members along the path are created as empty objects
    ///
    /// Array slots are never created.
    CreateMissing,
}

/// Read the node at `path`
///
/// Missing members, out-of-range indices and type mismatches all yield `None`.
#[must_use]
pub fn get<'a>(value: &'a Value, path: &PropertyPath) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, segment| match (segment, node) {
        (PathSegment::Key(key), Value::Object(map)) => map.get(key),
        (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
        _ => None,
    })
}

/// Write `new_value` at `path`
///
/// The leaf member may be new; a leaf index must already be in bounds.
///
/// # Errors
/// Returns [`PathError::Missing`] when an intermediate node is absent (under
/// [`WriteMode::Existing`]) or has the wrong shape for the next segment.
pub fn set(
    value: &mut Value,
    path: &PropertyPath,
    new_value: Value,
    mode: WriteMode,
) -> Result<(), PathError> {
    let Some((last, parents)) = path.segments().split_last() else {
        *value = new_value;
        return Ok(());
    };

    let mut node = value;
    for (depth, segment) in parents.iter().enumerate() {
        node = step_mut(node, segment, mode).ok_or_else(|| PathError::Missing {
            path: path.prefix(depth + 1).to_string(),
        })?;
    }

    match (last, node) {
        (PathSegment::Key(key), Value::Object(map)) => {
            map.insert(key.clone(), new_value);
            Ok(())
        }
        (PathSegment::Index(index), Value::Array(items)) if *index < items.len() => {
            items[*index] = new_value;
            Ok(())
        }
        _ => Err(PathError::Missing {
            path: path.to_string(),
        }),
    }
}

fn step_mut<'a>(node: &'a mut Value, segment: &PathSegment, mode: WriteMode) -> Option<&'a mut Value> {
    match (segment, node) {
        (PathSegment::Key(key), Value::Object(map)) => match mode {
            WriteMode::Existing => map.get_mut(key),
            WriteMode::CreateMissing => Some(
                map.entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
            ),
        },
        (PathSegment::Index(index), Value::Array(items)) => items.get_mut(*index),
        _ => None,
    }
}

/// Errors related to property paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Malformed `[n]` suffix
    #[error("invalid index in segment: {0}")]
    InvalidIndex(String),

    /// Node required by a write is absent or not a container
    #[error("no node at '{path}'")]
    Missing { path: String },

    /// Path would change a resource's identity
    #[error("path '{0}' is not writable")]
    Protected(String),
}
