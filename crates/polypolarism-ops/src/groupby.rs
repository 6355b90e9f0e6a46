//! Group-by and aggregation transfer functions.

use std::fmt;

use indexmap::IndexMap;
use polypolarism_types::{DataType, FrameType};

use crate::error::GroupByError;

/// An aggregation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFunction {
    Sum,
    Mean,
    Count,
    NUnique,
    List,
    First,
    Last,
    Min,
    Max,
}

impl AggFunction {
    /// Look up an aggregation by its expression method name.
    pub fn from_method(name: &str) -> Option<Self> {
        let function = match name {
            "sum" => AggFunction::Sum,
            "mean" => AggFunction::Mean,
            "count" => AggFunction::Count,
            "n_unique" => AggFunction::NUnique,
            "list" => AggFunction::List,
            "first" => AggFunction::First,
            "last" => AggFunction::Last,
            "min" => AggFunction::Min,
            "max" => AggFunction::Max,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(self) -> &'static str {
        match self {
            AggFunction::Sum => "sum",
            AggFunction::Mean => "mean",
            AggFunction::Count => "count",
            AggFunction::NUnique => "n_unique",
            AggFunction::List => "list",
            AggFunction::First => "first",
            AggFunction::Last => "last",
            AggFunction::Min => "min",
            AggFunction::Max => "max",
        }
    }

    fn requires_numeric(self) -> bool {
        matches!(self, AggFunction::Sum | AggFunction::Mean)
    }
}

impl fmt::Display for AggFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single aggregation over one source column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggExpr {
    pub column: String,
    pub function: AggFunction,
    pub alias: Option<String>,
}

impl AggExpr {
    pub fn new(column: impl Into<String>, function: AggFunction) -> Self {
        Self {
            column: column.into(),
            function,
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The result column name: the alias, or the source column.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.column)
    }
}

/// Result type of applying `function` to a column of type `input`.
pub fn infer_agg(function: AggFunction, input: &DataType) -> Result<DataType, GroupByError> {
    let (base, nullable) = input.unwrap_nullable();

    if function.requires_numeric() && !base.is_numeric() {
        return Err(GroupByError::NonNumeric {
            function,
            ty: input.clone(),
        });
    }

    let ty = match function {
        AggFunction::Mean => DataType::Float64.with_nullability(nullable),
        AggFunction::Count | AggFunction::NUnique => DataType::UInt32,
        AggFunction::List => input.clone().list_of(),
        AggFunction::Sum
        | AggFunction::First
        | AggFunction::Last
        | AggFunction::Min
        | AggFunction::Max => input.clone(),
    };
    Ok(ty)
}

/// Infer the output schema of `input.group_by(keys).agg(aggs)`.
///
/// Keys come first, in order, followed by one column per aggregation. An
/// aggregation whose output name is already taken replaces that column.
pub fn infer_group_by(
    input: &FrameType,
    keys: &[String],
    aggs: &[AggExpr],
) -> Result<FrameType, GroupByError> {
    let mut columns: IndexMap<String, DataType> = IndexMap::new();

    for key in keys {
        let ty = input
            .column(key)
            .ok_or_else(|| GroupByError::KeyNotFound { column: key.clone() })?;
        columns.insert(key.clone(), ty.clone());
    }

    for agg in aggs {
        let source = input
            .column(&agg.column)
            .ok_or_else(|| GroupByError::ColumnNotFound {
                column: agg.column.clone(),
            })?;
        let ty = infer_agg(agg.function, source)?;
        columns.insert(agg.output_name().to_string(), ty);
    }

    Ok(FrameType::new(columns))
}
