//! Column and frame type definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

/// The type of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    // Integers
    Int32,
    Int64,
    UInt32,
    UInt64,
    // Floating point
    Float32,
    Float64,
    // Text and logic
    Utf8,
    Boolean,
    // Temporal
    Date,
    Datetime(Option<String>),
    Duration,
    // Fixed point; only constructed programmatically
    Decimal { precision: u32, scale: u32 },
    Categorical,
    // Type of the null literal
    Null,
    // Complex
    Nullable(Box<DataType>),
    List(Box<DataType>),
    Struct(BTreeMap<String, DataType>),
}

impl DataType {
    /// Wrap this type in `Nullable`, unless it already is.
    pub fn nullable(self) -> DataType {
        match self {
            DataType::Nullable(_) => self,
            other => DataType::Nullable(Box::new(other)),
        }
    }

    /// Wrap in `Nullable` when `nullable` is set.
    pub fn with_nullability(self, nullable: bool) -> DataType {
        if nullable {
            self.nullable()
        } else {
            self
        }
    }

    /// Build a `List` of this type.
    pub fn list_of(self) -> DataType {
        DataType::List(Box::new(self))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, DataType::Nullable(_))
    }

    /// The type with one `Nullable` layer removed, if present.
    pub fn base(&self) -> &DataType {
        match self {
            DataType::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Split into base type and nullability.
    pub fn unwrap_nullable(&self) -> (&DataType, bool) {
        match self {
            DataType::Nullable(inner) => (inner, true),
            other => (other, false),
        }
    }

    /// Integer and floating point types, signed or unsigned.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int32
                | DataType::Int64
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Float32
                | DataType::Float64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    /// Position in the arithmetic promotion order, `None` for types that
    /// do not take part in promotion.
    pub fn promotion_rank(&self) -> Option<u8> {
        match self {
            DataType::Int32 => Some(1),
            DataType::Int64 => Some(2),
            DataType::Float32 => Some(3),
            DataType::Float64 => Some(4),
            _ => None,
        }
    }

    /// Whether a value of this type may flow where `expected` is required.
    ///
    /// `T` is compatible with `T` and with `Nullable(T)`. A nullable value
    /// is never accepted where the non-nullable type is expected.
    pub fn is_subtype_of(&self, expected: &DataType) -> bool {
        if self == expected {
            return true;
        }
        match expected {
            DataType::Nullable(inner) => **inner == *self,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int32 => write!(f, "Int32"),
            DataType::Int64 => write!(f, "Int64"),
            DataType::UInt32 => write!(f, "UInt32"),
            DataType::UInt64 => write!(f, "UInt64"),
            DataType::Float32 => write!(f, "Float32"),
            DataType::Float64 => write!(f, "Float64"),
            DataType::Utf8 => write!(f, "Utf8"),
            DataType::Boolean => write!(f, "Boolean"),
            DataType::Date => write!(f, "Date"),
            DataType::Datetime(None) => write!(f, "Datetime"),
            DataType::Datetime(Some(tz)) => write!(f, "Datetime[{}]", tz),
            DataType::Duration => write!(f, "Duration"),
            DataType::Decimal { precision, scale } => write!(f, "Decimal({}, {})", precision, scale),
            DataType::Categorical => write!(f, "Categorical"),
            DataType::Null => write!(f, "Null"),
            DataType::Nullable(inner) => write!(f, "{}?", inner),
            DataType::List(inner) => write!(f, "List[{}]", inner),
            DataType::Struct(fields) => {
                write!(f, "Struct{{")?;
                write_fields(f, fields.iter())?;
                write!(f, "}}")
            }
        }
    }
}

fn write_fields<'a>(
    f: &mut fmt::Formatter<'_>,
    fields: impl Iterator<Item = (&'a String, &'a DataType)>,
) -> fmt::Result {
    for (i, (name, ty)) in fields.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", name, ty)?;
    }
    Ok(())
}

/// Row variable for open schemas. Reserved; never populated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowVar {
    pub name: String,
}

/// The schema of a data frame: column name to type.
///
/// Column order is kept for display but ignored by equality and hashing.
#[derive(Debug, Clone, Default)]
pub struct FrameType {
    columns: IndexMap<String, DataType>,
    rest: Option<RowVar>,
}

impl FrameType {
    /// Create a closed frame type from its columns.
    pub fn new(columns: IndexMap<String, DataType>) -> Self {
        Self {
            columns,
            rest: None,
        }
    }

    pub fn columns(&self) -> &IndexMap<String, DataType> {
        &self.columns
    }

    pub fn into_columns(self) -> IndexMap<String, DataType> {
        self.columns
    }

    pub fn rest(&self) -> Option<&RowVar> {
        self.rest.as_ref()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&DataType> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Check this frame against `expected` with width subtyping.
    ///
    /// Extra columns are allowed; each expected column must be present with
    /// a compatible type. Returns one violation per offending column, in the
    /// expected frame's column order.
    pub fn subtype_violations(&self, expected: &FrameType) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        for (name, expected_ty) in &expected.columns {
            match self.columns.get(name) {
                None => violations.push(SchemaViolation::MissingColumn {
                    column: name.clone(),
                    expected: expected_ty.clone(),
                }),
                Some(actual) if !actual.is_subtype_of(expected_ty) => {
                    violations.push(SchemaViolation::IncompatibleColumn {
                        column: name.clone(),
                        expected: expected_ty.clone(),
                        actual: actual.clone(),
                    })
                }
                Some(_) => {}
            }
        }
        violations
    }

    pub fn is_subtype_of(&self, expected: &FrameType) -> bool {
        self.subtype_violations(expected).is_empty()
    }
}

impl FromIterator<(String, DataType)> for FrameType {
    fn from_iter<I: IntoIterator<Item = (String, DataType)>>(iter: I) -> Self {
        FrameType::new(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, DataType); N]> for FrameType {
    fn from(columns: [(&str, DataType); N]) -> Self {
        columns
            .into_iter()
            .map(|(name, ty)| (name.to_string(), ty))
            .collect()
    }
}

impl PartialEq for FrameType {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.rest == other.rest
    }
}

impl Eq for FrameType {}

impl Hash for FrameType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut entries: Vec<_> = self.columns.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.hash(state);
        self.rest.hash(state);
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write_fields(f, self.columns.iter())?;
        write!(f, "}}")
    }
}

/// A column-level failure of frame subtyping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    MissingColumn {
        column: String,
        expected: DataType,
    },
    IncompatibleColumn {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}
