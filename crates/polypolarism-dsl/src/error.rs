//! Parse error types.

use thiserror::Error;

/// A malformed schema or type string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected token at {offset}: expected {expected}, found '{found}'")]
    UnexpectedToken {
        offset: usize,
        expected: String,
        found: String,
    },

    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("unknown type '{name}' at {offset}")]
    UnknownType { name: String, offset: usize },

    #[error("invalid character '{found}' at {offset}")]
    InvalidCharacter { found: String, offset: usize },

    #[error("unexpected trailing input at {offset}: '{found}'")]
    TrailingInput { found: String, offset: usize },
}

impl ParseError {
    pub fn unexpected_token(offset: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        ParseError::UnexpectedToken {
            offset,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>) -> Self {
        ParseError::UnexpectedEof {
            expected: expected.into(),
        }
    }
}
