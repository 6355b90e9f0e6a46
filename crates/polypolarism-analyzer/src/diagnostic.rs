//! Diagnostics attached to checked functions.

use polypolarism_ops::{GroupByError, JoinError};
use polypolarism_types::{DataType, TypeError};
use thiserror::Error;

/// A single problem found in a function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// A declared return column the body never produces.
    #[error("missing column '{column}' of type {expected}")]
    MissingColumn { column: String, expected: DataType },

    /// A produced column the declared return type does not list.
    #[error("extra column '{column}' of type {inferred} not in declared return type")]
    ExtraColumn { column: String, inferred: DataType },

    #[error("column '{column}' has type {inferred}, but declared type is {declared}")]
    TypeDifference {
        column: String,
        declared: DataType,
        inferred: DataType,
    },

    #[error("{message}")]
    InferenceFailure { message: String },

    #[error("argument '{param}' of '{function}' is missing column '{column}' of type {expected}")]
    ArgumentMissingColumn {
        function: String,
        param: String,
        column: String,
        expected: DataType,
    },

    #[error("argument '{param}' of '{function}': column '{column}' has type {actual}, expected {expected}")]
    ArgumentTypeMismatch {
        function: String,
        param: String,
        column: String,
        expected: DataType,
        actual: DataType,
    },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error(transparent)]
    GroupBy(#[from] GroupByError),
}

impl CheckError {
    pub fn return_not_inferred() -> Self {
        CheckError::InferenceFailure {
            message: "could not infer return type".to_string(),
        }
    }
}
