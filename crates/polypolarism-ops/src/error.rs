//! Transfer function errors.

use polypolarism_types::DataType;
use thiserror::Error;

use crate::groupby::AggFunction;

/// A join whose keys or strategy cannot be typed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error("must specify either 'on' or both 'left_on' and 'right_on'")]
    MissingKeys,

    #[error("column '{column}' not found in left frame")]
    LeftKeyNotFound { column: String },

    #[error("column '{column}' not found in right frame")]
    RightKeyNotFound { column: String },

    #[error("join key dtype mismatch: left '{left_key}' is {left_type}, right '{right_key}' is {right_type}")]
    KeyTypeMismatch {
        left_key: String,
        left_type: DataType,
        right_key: String,
        right_type: DataType,
    },

    #[error("unsupported join strategy '{how}'")]
    UnsupportedStrategy { how: String },
}

/// A group-by or aggregation that cannot be typed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupByError {
    #[error("group by key column '{column}' not found")]
    KeyNotFound { column: String },

    #[error("aggregation column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("cannot apply {function} to type {ty}: {function} requires numeric type")]
    NonNumeric { function: AggFunction, ty: DataType },
}
