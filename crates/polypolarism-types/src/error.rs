//! Type algebra error definitions.

use thiserror::Error;

use crate::types::DataType;

/// A failure of column lookup or of combining column types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("column '{column}' not found; available columns: [{}]", available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("cannot promote types {left} and {right} for arithmetic operation")]
    Promotion { left: DataType, right: DataType },

    #[error("cannot unify types {left} and {right}")]
    Unification { left: DataType, right: DataType },

    #[error("condition must be Boolean, found {found}")]
    NonBooleanCondition { found: DataType },
}
