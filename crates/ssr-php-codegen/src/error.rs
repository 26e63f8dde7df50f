//! Error types for PHP code generation.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Result type for code generation.
pub type CompileResult<T> = Result<T, CompileError>;

/// An error that aborts the compilation of a file.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("unexpected unary operator \"{}\"", operator_display(.0))]
    UnexpectedUnaryOperator(u32),

    #[error("unexpected binary operator \"{}\"", operator_display(.0))]
    UnexpectedBinaryOperator(u32),

    #[error("cannot resolve component \"{id}\" from \"{specifier}\" in {file}")]
    UnresolvedComponent {
        file: Utf8PathBuf,
        specifier: String,
        id: String,
    },

    #[error("cannot stringify {0}")]
    CannotStringify(String),

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CompileError {
    /// Create an invalid expression error.
    pub fn invalid_expression(message: impl Into<String>) -> Self {
        Self::InvalidExpression(message.into())
    }

    /// Get the error code as a string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnexpectedUnaryOperator(_) => "unexpected-unary-operator",
            Self::UnexpectedBinaryOperator(_) => "unexpected-binary-operator",
            Self::UnresolvedComponent { .. } => "unresolved-component",
            Self::CannotStringify(_) => "cannot-stringify",
            Self::InvalidExpression(_) => "invalid-expression",
            Self::Config(_) => "config",
        }
    }
}

/// Operator codes are character codes for single-character operators.
fn operator_display(code: &u32) -> String {
    match char::from_u32(*code) {
        Some(c) if c.is_ascii_punctuation() => c.to_string(),
        _ => code.to_string(),
    }
}

/// A problem with the compiler configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing project root: set `nsRootDir`")]
    MissingRoot,

    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}
