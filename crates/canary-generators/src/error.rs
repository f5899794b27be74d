//! Error types for resource generation

use canary_template::PathError;

use crate::kind::ResourceKind;

/// Errors raised while locating, rewriting or synthesizing resources
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// No rewrite strategy exists for the resource's type
    #[error("no alias rewrite strategy for {logical_id} of type {resource_type}")]
    UnsupportedResourceKind {
        logical_id: String,
        resource_type: String,
    },

    /// Resource handed to the rewriter is not of the located kind
    #[error("{logical_id} is {actual}, expected {expected}")]
    KindMismatch {
        logical_id: String,
        expected: ResourceKind,
        actual: String,
    },

    /// Aliased function has no published version in the template
    #[error("no AWS::Lambda::Version found for function {function}")]
    MissingFunctionVersion { function: String },

    /// A located pointer could not be written back
    #[error("cannot rewrite {logical_id}: {source}")]
    InvalidRewrite {
        logical_id: String,
        #[source]
        source: PathError,
    },
}
