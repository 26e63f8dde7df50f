//! Error types for reading the ANode wire form.

use thiserror::Error;

/// Result type for ANode conversion.
pub type AstResult<T> = Result<T, AstError>;

/// A malformed template tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstError {
    #[error("unexpected expression type {0}")]
    UnknownExpressionType(u8),

    #[error("{kind} is missing required field `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("{kind} has an invalid `{field}`: {detail}")]
    InvalidField {
        kind: &'static str,
        field: &'static str,
        detail: String,
    },
}

impl AstError {
    /// Create a missing field error.
    pub fn missing(kind: &'static str, field: &'static str) -> Self {
        Self::MissingField { kind, field }
    }

    /// Create an invalid field error.
    pub fn invalid(kind: &'static str, field: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidField {
            kind,
            field,
            detail: detail.into(),
        }
    }
}
