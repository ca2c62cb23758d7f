//! Defines the types of errors that may occur while describing, walking, or transforming trees.
//! Also defines simple conversions between strings and errors.

use thiserror::Error;

/* Module Level Errors */

// We do approximately one error type per module.

/// A node declaration that cannot be described. These are programming errors in the node type, so they are always
/// fatal.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{node_type} declares feature `{name}` more than once")]
    DuplicateFeature { node_type: String, name: String },

    /// A problem described by a string.
    #[error("{0}")]
    Problem(String),
}

/// Everything that can stop a transformation.
///
/// Only unmapped nodes and missing mandatory values may be degraded into issues by fault tolerant mode. The rest
/// indicate a broken registration or a broken node type.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("no factory is registered for {node_type}")]
    UnmappedNode { node_type: String },

    #[error("mandatory child `{feature}` of {node_type} is absent")]
    MissingMandatoryChild { node_type: String, feature: String },

    #[error("{node_type} was transformed into nothing where a node is required")]
    NoNodeProduced { node_type: String },

    #[error("factory registered for {expected} was handed a {found}")]
    SourceTypeMismatch { expected: String, found: String },

    #[error("{node_type} has no feature named `{feature}`")]
    UnknownFeature { node_type: String, feature: String },

    #[error("feature `{feature}` of {node_type} is not a containment")]
    NotAContainment { node_type: String, feature: String },

    #[error("{count} nodes were produced from {node_type} where a single node was expected")]
    MultipleNodesProduced { node_type: String, count: usize },

    #[error("a collection was supplied for `{feature}` of {node_type}, which holds a single value")]
    UnexpectedCollection { node_type: String, feature: String },

    #[error("expected a {expected} node, found {found}")]
    UnexpectedNodeType { expected: String, found: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    /// A constructor, setter, or finalizer gave up. Described by a string.
    #[error("{0}")]
    Construction(String),
}

impl TransformError {
    /// Whether fault tolerant mode may turn this error into an issue and drop the offending subtree.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TransformError::UnmappedNode { .. }
                | TransformError::MissingMandatoryChild { .. }
                | TransformError::NoNodeProduced { .. }
        )
    }
}

/// Problems loading [`crate::transform::TransformOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid transform options: {0}")]
    Toml(#[from] toml::de::Error),
}

/* String Conversions. */

impl From<String> for ModelError {
    fn from(value: String) -> Self {
        ModelError::Problem(value)
    }
}

impl From<&str> for ModelError {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<String> for TransformError {
    fn from(value: String) -> Self {
        TransformError::Construction(value)
    }
}

impl From<&str> for TransformError {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}
