//! Column expressions inside `select`, `with_columns` and `agg`.

use polypolarism_dsl::parse_type;
use polypolarism_ops::{AggExpr, AggFunction};
use polypolarism_syntax::{Expr, Keyword, MethodCall, Operator};
use polypolarism_types::{
    cast, infer_conditional, infer_literal, lookup_column, DataType, FrameType, TypeError,
};

use crate::diagnostic::CheckError;

/// Output name of literal expressions.
const LITERAL_NAME: &str = "literal";

/// A typed column expression and the name its output gets by default.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TypedColumn {
    pub name: Option<String>,
    pub ty: DataType,
}

impl TypedColumn {
    fn new(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }
}

/// Types column expressions against one input frame, collecting lookup and
/// type errors along the way.
pub(crate) struct ColumnTyper<'f> {
    frame: &'f FrameType,
    errors: Vec<CheckError>,
}

impl<'f> ColumnTyper<'f> {
    pub fn new(frame: &'f FrameType) -> Self {
        Self {
            frame,
            errors: Vec::new(),
        }
    }

    pub fn into_errors(self) -> Vec<CheckError> {
        self.errors
    }

    /// Output column of a positional `select`/`with_columns` argument. A bare
    /// string names an input column.
    pub fn projection_arg(&mut self, expr: &Expr) -> Option<(String, DataType)> {
        if let Some(column) = expr.as_str() {
            let ty = self.column_ref(column)?;
            return Some((column.to_string(), ty));
        }
        let typed = self.column(expr)?;
        Some((typed.name?, typed.ty))
    }

    /// Output column of a `name=expr` argument.
    pub fn projection_keyword(&mut self, keyword: &Keyword) -> Option<(String, DataType)> {
        let typed = self.column(&keyword.value)?;
        Some((keyword.arg.clone(), typed.ty))
    }

    pub fn column(&mut self, expr: &Expr) -> Option<TypedColumn> {
        match expr {
            Expr::Constant { value } => Some(TypedColumn::new(LITERAL_NAME, infer_literal(value))),
            Expr::BinOp { left, op, right } => self.binary(left, *op, right),
            Expr::Call { .. } => self.call(expr),
            Expr::Name { .. } | Expr::Attribute { .. } => None,
        }
    }

    fn call(&mut self, expr: &Expr) -> Option<TypedColumn> {
        if let Some(args) = expr.as_namespaced_call("pl", "col") {
            let column = args.first()?.as_str()?;
            let ty = self.column_ref(column)?;
            return Some(TypedColumn::new(column, ty));
        }
        if let Some(args) = expr.as_namespaced_call("pl", "lit") {
            let value = args.first()?.as_literal()?;
            return Some(TypedColumn::new(LITERAL_NAME, infer_literal(value)));
        }

        let call = expr.as_method_call()?;
        match call.method {
            "alias" => {
                let output = call.args.first()?.as_str()?;
                let inner = self.column(call.receiver)?;
                Some(TypedColumn::new(output, inner.ty))
            }
            "cast" => {
                let target = cast_target(call.args.first()?)?;
                let inner = self.column(call.receiver)?;
                Some(TypedColumn {
                    name: inner.name,
                    ty: cast(&inner.ty, &target),
                })
            }
            "then" => self.conditional(call, None),
            "otherwise" => {
                let then = call.receiver.as_method_call().filter(|c| c.method == "then")?;
                self.conditional(then, Some(call.args.first()?))
            }
            _ => None,
        }
    }

    /// `pl.when(c).then(a)` with an optional `.otherwise(b)`. A missing
    /// otherwise branch produces nulls.
    fn conditional(&mut self, then: MethodCall<'_>, otherwise: Option<&Expr>) -> Option<TypedColumn> {
        let condition = then.receiver.as_namespaced_call("pl", "when")?.first()?;
        let condition = self.column(condition)?;
        let then_column = self.column(then.args.first()?)?;
        let otherwise_ty = match otherwise {
            Some(expr) => self.column(expr)?.ty,
            None => DataType::Null,
        };

        let ty = self.record(infer_conditional(&condition.ty, &then_column.ty, &otherwise_ty))?;
        Some(TypedColumn {
            name: then_column.name,
            ty,
        })
    }

    /// Arithmetic keeps the left operand's name and type. Comparisons yield
    /// booleans.
    fn binary(&mut self, left: &Expr, op: Operator, right: &Expr) -> Option<TypedColumn> {
        let left = self.column(left);
        let right = self.column(right);
        let left = left?;

        if op.is_comparison() {
            let nullable = left.ty.is_nullable() || right.is_some_and(|r| r.ty.is_nullable());
            return Some(TypedColumn {
                name: left.name,
                ty: DataType::Boolean.with_nullability(nullable),
            });
        }
        Some(left)
    }

    fn column_ref(&mut self, column: &str) -> Option<DataType> {
        self.record(lookup_column(column, self.frame))
    }

    fn record(&mut self, result: Result<DataType, TypeError>) -> Option<DataType> {
        match result {
            Ok(ty) => Some(ty),
            Err(err) => {
                self.errors.push(err.into());
                None
            }
        }
    }
}

/// Target type of `.cast(pl.T)`.
fn cast_target(expr: &Expr) -> Option<DataType> {
    let Expr::Attribute { value, attr } = expr else {
        return None;
    };
    if value.as_name() != Some("pl") {
        return None;
    }
    match parse_type(attr) {
        Ok(ty) => Some(ty),
        Err(err) => {
            tracing::debug!(dtype = %attr, %err, "unsupported cast target");
            None
        }
    }
}

/// Recognize `pl.col("x").<fn>()` with an optional `.alias("name")`.
pub(crate) fn agg_expr(expr: &Expr) -> Option<AggExpr> {
    let mut call = expr.as_method_call()?;
    let mut alias = None;
    if call.method == "alias" {
        alias = Some(call.args.first()?.as_str()?);
        call = call.receiver.as_method_call()?;
    }

    let function = AggFunction::from_method(call.method)?;
    let column = call.receiver.as_namespaced_call("pl", "col")?.first()?.as_str()?;
    let agg = AggExpr::new(column, function);
    Some(match alias {
        Some(alias) => agg.alias(alias),
        None => agg,
    })
}

/// A group key: `"k"` or `pl.col("k")`.
pub(crate) fn key_name(expr: &Expr) -> Option<&str> {
    if let Some(name) = expr.as_str() {
        return Some(name);
    }
    expr.as_namespaced_call("pl", "col")?.first()?.as_str()
}
