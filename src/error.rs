//! Error types for arbor.

use thiserror::Error;

/// Errors that can occur during index construction, insertion, or search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// A vector's length does not match the index dimensionality.
    #[error("vector has {actual} dimensions, index expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The search frontier referenced a node id that is not registered in
    /// the index. Fatal to the query; the index itself is left intact.
    #[error("search frontier referenced an unknown tree node")]
    InvalidIndex,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for arbor operations.
pub type Result<T> = std::result::Result<T, IndexError>;
