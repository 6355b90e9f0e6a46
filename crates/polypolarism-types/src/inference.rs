//! Type algebra for column expressions.
//!
//! Literal classification, arithmetic promotion, casts, branch unification
//! and column lookup.

use crate::error::TypeError;
use crate::literal::Literal;
use crate::types::{DataType, FrameType};

/// Infer the type of a literal value.
pub fn infer_literal(value: &Literal) -> DataType {
    match value {
        // Booleans are classified before integers.
        Literal::Bool(_) => DataType::Boolean,
        Literal::Int(_) => DataType::Int64,
        Literal::Float(_) => DataType::Float64,
        Literal::Str(_) => DataType::Utf8,
        Literal::Null => DataType::Null,
    }
}

/// Look up a column, failing with the list of available columns.
pub fn lookup_column(name: &str, frame: &FrameType) -> Result<DataType, TypeError> {
    frame
        .column(name)
        .cloned()
        .ok_or_else(|| TypeError::ColumnNotFound {
            column: name.to_string(),
            available: frame.column_names(),
        })
}

/// Combine with `Null`: `Null op Null` is `Null`, `Null op T` is `T?`.
fn absorb_null(left: &DataType, right: &DataType) -> Option<DataType> {
    match (left, right) {
        (DataType::Null, DataType::Null) => Some(DataType::Null),
        (DataType::Null, other) | (other, DataType::Null) => Some(other.base().clone().nullable()),
        _ => None,
    }
}

/// Promote two unwrapped numeric types. Mixing integer and floating point
/// always yields `Float64`; otherwise the higher rank wins.
fn promote_numeric(left: &DataType, right: &DataType) -> Option<DataType> {
    let left_rank = left.promotion_rank()?;
    let right_rank = right.promotion_rank()?;

    if left.is_float() != right.is_float() {
        return Some(DataType::Float64);
    }
    if left_rank >= right_rank {
        Some(left.clone())
    } else {
        Some(right.clone())
    }
}

/// Result type of an arithmetic operation on two column types.
pub fn promote(left: &DataType, right: &DataType) -> Result<DataType, TypeError> {
    if let Some(ty) = absorb_null(left, right) {
        return Ok(ty);
    }

    let (left_base, left_nullable) = left.unwrap_nullable();
    let (right_base, right_nullable) = right.unwrap_nullable();

    let promoted = promote_numeric(left_base, right_base).ok_or_else(|| TypeError::Promotion {
        left: left.clone(),
        right: right.clone(),
    })?;

    Ok(promoted.with_nullability(left_nullable || right_nullable))
}

/// Result type of casting `source` to `target`.
///
/// A cast never removes nullability the data already has.
pub fn cast(source: &DataType, target: &DataType) -> DataType {
    let (target_base, target_nullable) = target.unwrap_nullable();
    target_base
        .clone()
        .with_nullability(source.is_nullable() || target_nullable)
}

/// Common type of two branches.
pub fn unify(left: &DataType, right: &DataType) -> Result<DataType, TypeError> {
    if let Some(ty) = absorb_null(left, right) {
        return Ok(ty);
    }

    let (left_base, left_nullable) = left.unwrap_nullable();
    let (right_base, right_nullable) = right.unwrap_nullable();
    let nullable = left_nullable || right_nullable;

    if left_base == right_base {
        return Ok(left_base.clone().with_nullability(nullable));
    }

    promote_numeric(left_base, right_base)
        .map(|ty| ty.with_nullability(nullable))
        .ok_or_else(|| TypeError::Unification {
            left: left.clone(),
            right: right.clone(),
        })
}

/// Result type of a `when(condition).then(a).otherwise(b)` expression.
pub fn infer_conditional(
    condition: &DataType,
    then: &DataType,
    otherwise: &DataType,
) -> Result<DataType, TypeError> {
    let (condition_base, condition_nullable) = condition.unwrap_nullable();
    if *condition_base != DataType::Boolean {
        return Err(TypeError::NonBooleanCondition {
            found: condition.clone(),
        });
    }

    let unified = unify(then, otherwise)?;
    if condition_nullable {
        // A null condition produces a null result.
        return Ok(unified.base().clone().nullable());
    }
    Ok(unified)
}
