//! Error types for the sift crate.

use thiserror::Error;

/// Errors that can occur when building criteria or evaluating them.
///
/// Looking up an absent key in a [`Collection`](crate::Collection) is not an
/// error; those operations return `Option`.
#[derive(Debug, Error)]
pub enum SiftError {
    /// A field path could not be resolved on a record.
    #[error("field '{field}' not found on record")]
    FieldNotFound { field: String },

    /// A dotted path tried to descend into a value that is not a record.
    #[error("field '{field}' does not hold a nested record")]
    NotARecord { field: String },

    /// A path ended on a nested record that cannot be read as a single value.
    #[error("field '{field}' is a nested record without a value snapshot")]
    NoSnapshot { field: String },

    /// The expression tree is malformed or uses an unknown operator.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// Invalid regular expression pattern in a `matches` comparison.
    #[error("invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// An argument is outside the accepted contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The key type has no value left after the highest key in a collection.
    #[error("automatic keys exhausted for this key type")]
    KeysExhausted,
}

impl SiftError {
    pub(crate) fn field_not_found(field: impl Into<String>) -> Self {
        SiftError::FieldNotFound {
            field: field.into(),
        }
    }

    pub(crate) fn invalid_expression(message: impl Into<String>) -> Self {
        let message = message.into();
        log::warn!("rejecting expression: {}", message);
        SiftError::InvalidExpression(message)
    }

    pub(crate) fn keys_exhausted() -> Self {
        log::warn!("no automatic key left for this collection");
        SiftError::KeysExhausted
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        let message = message.into();
        log::warn!("rejecting argument: {}", message);
        SiftError::InvalidArgument(message)
    }
}

/// Result type for sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;
