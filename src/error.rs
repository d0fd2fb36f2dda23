//! Error types for T-GCN operations.
//!
//! All errors are precondition violations detected at a call boundary,
//! before any computation starts. A failed call never yields a partially
//! computed tensor.

use thiserror::Error;

/// Main error type for T-GCN operations.
///
/// # Examples
///
/// ```
/// use tgcn::error::TgcnError;
///
/// let err = TgcnError::ShapeMismatch {
///     tensor: "x".to_string(),
///     expected: "[3, 2]".to_string(),
///     actual: "[3, 5]".to_string(),
/// };
/// assert!(err.to_string().contains("shape mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum TgcnError {
    /// A tensor's shape disagrees with the configured dimensions or with
    /// another tensor of the same call.
    #[error("shape mismatch for `{tensor}`: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Name of the offending tensor
        tensor: String,
        /// Expected shape description
        expected: String,
        /// Actual shape found
        actual: String,
    },

    /// An edge endpoint lies outside `[0, num_nodes)`.
    #[error("edge {edge} has endpoint {index} outside [0, {num_nodes})")]
    OutOfBoundsEdgeIndex {
        /// Position of the edge in the edge list
        edge: usize,
        /// Offending endpoint (signed so negative inputs are reported as given)
        index: i64,
        /// Number of nodes in the graph
        num_nodes: usize,
    },

    /// A configuration value violates its constraint.
    #[error("invalid configuration: {param} = {value}, expected {constraint}")]
    InvalidConfiguration {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },
}

impl TgcnError {
    /// Build a [`TgcnError::ShapeMismatch`] from two shapes.
    pub(crate) fn shape(tensor: &str, expected: impl Into<String>, actual: &[usize]) -> Self {
        TgcnError::ShapeMismatch {
            tensor: tensor.to_string(),
            expected: expected.into(),
            actual: format!("{actual:?}"),
        }
    }

    /// Build a [`TgcnError::InvalidConfiguration`].
    pub(crate) fn config(param: &str, value: impl std::fmt::Display, constraint: &str) -> Self {
        TgcnError::InvalidConfiguration {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

/// Convenience type alias for T-GCN results.
pub type Result<T> = std::result::Result<T, TgcnError>;
