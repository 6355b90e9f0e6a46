//! Join transfer function.

use std::str::FromStr;

use indexmap::IndexMap;
use polypolarism_types::{DataType, FrameType};

use crate::error::JoinError;

/// Kind of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinHow {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinHow {
    /// Whether rows of the left frame may be missing from the output.
    fn left_nullable(self) -> bool {
        matches!(self, JoinHow::Right | JoinHow::Full)
    }

    /// Whether rows of the right frame may be missing from the output.
    fn right_nullable(self) -> bool {
        matches!(self, JoinHow::Left | JoinHow::Full)
    }
}

impl FromStr for JoinHow {
    type Err = JoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inner" => Ok(JoinHow::Inner),
            "left" => Ok(JoinHow::Left),
            "right" => Ok(JoinHow::Right),
            "full" | "outer" => Ok(JoinHow::Full),
            other => Err(JoinError::UnsupportedStrategy {
                how: other.to_string(),
            }),
        }
    }
}

/// Join key columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinKeys {
    /// A key column with the same name on both sides.
    On(String),
    /// Distinct key columns on each side.
    Pair { left_on: String, right_on: String },
}

impl JoinKeys {
    /// Resolve keys from `on` or a `left_on`/`right_on` pair. `on` wins if
    /// both forms are given.
    pub fn resolve(
        on: Option<String>,
        left_on: Option<String>,
        right_on: Option<String>,
    ) -> Result<Self, JoinError> {
        match (on, left_on, right_on) {
            (Some(on), _, _) => Ok(JoinKeys::On(on)),
            (None, Some(left_on), Some(right_on)) => Ok(JoinKeys::Pair { left_on, right_on }),
            _ => Err(JoinError::MissingKeys),
        }
    }

    fn left(&self) -> &str {
        match self {
            JoinKeys::On(on) => on,
            JoinKeys::Pair { left_on, .. } => left_on,
        }
    }

    fn right(&self) -> &str {
        match self {
            JoinKeys::On(on) => on,
            JoinKeys::Pair { right_on, .. } => right_on,
        }
    }
}

/// Infer the output schema of joining `left` with `right`.
pub fn infer_join(
    left: &FrameType,
    right: &FrameType,
    keys: &JoinKeys,
    how: JoinHow,
) -> Result<FrameType, JoinError> {
    let left_key = keys.left();
    let right_key = keys.right();

    let left_key_type = left.column(left_key).ok_or_else(|| JoinError::LeftKeyNotFound {
        column: left_key.to_string(),
    })?;
    let right_key_type = right.column(right_key).ok_or_else(|| JoinError::RightKeyNotFound {
        column: right_key.to_string(),
    })?;

    // Keys only need matching base types; nullability may differ.
    if left_key_type.base() != right_key_type.base() {
        return Err(JoinError::KeyTypeMismatch {
            left_key: left_key.to_string(),
            left_type: left_key_type.clone(),
            right_key: right_key.to_string(),
            right_type: right_key_type.clone(),
        });
    }

    let shared_key = matches!(keys, JoinKeys::On(_));
    let mut columns: IndexMap<String, DataType> = IndexMap::new();

    for (name, ty) in left.columns() {
        let ty = if shared_key && name == left_key {
            match how {
                JoinHow::Inner | JoinHow::Left => ty.clone(),
                JoinHow::Right => right_key_type.clone(),
                JoinHow::Full => ty.clone().nullable(),
            }
        } else {
            ty.clone().with_nullability(how.left_nullable())
        };
        columns.insert(name.clone(), ty);
    }

    for (name, ty) in right.columns() {
        if shared_key && name == right_key {
            continue;
        }
        let name = if columns.contains_key(name) {
            format!("{}_right", name)
        } else {
            name.clone()
        };
        columns.insert(name, ty.clone().with_nullability(how.right_nullable()));
    }

    Ok(FrameType::new(columns))
}
