//! Schema flow through function bodies.
//!
//! Statements are processed top to bottom. Branches and loops are not
//! modelled: the last binding of a variable wins.

use std::collections::{HashMap, HashSet};

use polypolarism_ops::{
    infer_group_by, infer_join, infer_select, infer_with_columns, AggExpr, JoinHow, JoinKeys,
};
use polypolarism_syntax::{Expr, FunctionDef, Keyword, MethodCall, Stmt};
use polypolarism_types::{DataType, FrameType, SchemaViolation};

use crate::diagnostic::CheckError;
use crate::expr::{agg_expr, key_name, ColumnTyper};
use crate::registry::{parse_annotation, CallKey, FunctionId, FunctionInfo, FunctionRegistry, FunctionSignature};

/// What analyzing one body produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyAnalysis {
    pub inferred_return: Option<FrameType>,
    pub errors: Vec<CheckError>,
}

/// Local state of one body being analyzed.
struct Body<'d> {
    function: &'d str,
    vars: HashMap<String, FrameType>,
    errors: Vec<CheckError>,
    returned: Option<FrameType>,
}

impl Body<'_> {
    /// Keep the value of a transfer function, or record its error.
    fn record<T, E: Into<CheckError>>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err.into());
                None
            }
        }
    }
}

/// Infers frame schemas through the bodies of one unit's functions.
pub struct FlowAnalyzer<'r, 'a> {
    registry: &'r FunctionRegistry<'a>,
    /// Unannotated functions whose bodies are currently being analyzed.
    in_progress: HashSet<FunctionId<'a>>,
}

impl<'r, 'a> FlowAnalyzer<'r, 'a> {
    pub fn new(registry: &'r FunctionRegistry<'a>) -> Self {
        Self {
            registry,
            in_progress: HashSet::new(),
        }
    }

    /// Analyze `def` with its parameters bound to `params`.
    pub fn analyze(&mut self, def: &FunctionDef, params: HashMap<String, FrameType>) -> BodyAnalysis {
        tracing::debug!(function = %def.name, typed_params = params.len(), "analyzing function body");

        let mut body = Body {
            function: &def.name,
            vars: params,
            errors: Vec::new(),
            returned: None,
        };
        for stmt in &def.body {
            self.statement(&mut body, stmt);
        }

        BodyAnalysis {
            inferred_return: body.returned,
            errors: body.errors,
        }
    }

    fn statement(&mut self, body: &mut Body<'_>, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { target, value } => {
                // A failed inference keeps the previous binding.
                if let Some(frame) = self.infer(body, value) {
                    body.vars.insert(target.clone(), frame);
                }
            }
            Stmt::AnnAssign {
                target,
                annotation,
                value,
            } => {
                let inferred = value.as_ref().and_then(|value| self.infer(body, value));
                let declared = parse_annotation(body.function, target, annotation);
                if let Some(frame) = declared.or(inferred) {
                    body.vars.insert(target.clone(), frame);
                }
            }
            Stmt::Return { value } => {
                let returned = value.as_ref().and_then(|value| self.infer(body, value));
                body.returned = returned;
            }
        }
    }

    /// Infer the frame schema of an expression, if it has one.
    fn infer(&mut self, body: &mut Body<'_>, expr: &Expr) -> Option<FrameType> {
        if let Some(var) = expr.as_name() {
            return body.vars.get(var).cloned();
        }
        if let Some((callee, args, keywords)) = expr.as_function_call() {
            return self.resolve_call(body, callee, args, keywords);
        }

        let call = expr.as_method_call()?;
        if call.method == "agg" {
            return self.group_by_agg(body, call);
        }

        let input = self.infer(body, call.receiver)?;
        match call.method {
            "join" => self.join(body, &input, call),
            "select" => {
                let columns = self.project(body, &input, call);
                if columns.is_empty() {
                    return None;
                }
                Some(infer_select(columns))
            }
            "with_columns" => {
                let columns = self.project(body, &input, call);
                Some(infer_with_columns(&input, columns))
            }
            _ => None,
        }
    }

    fn join(&mut self, body: &mut Body<'_>, left: &FrameType, call: MethodCall<'_>) -> Option<FrameType> {
        let right = call.args.first().or_else(|| call.keyword("other"))?;
        let right = self.infer(body, right)?;

        let string_arg = |keyword: &str, position: usize| {
            call.keyword(keyword)
                .or_else(|| call.args.get(position))
                .and_then(Expr::as_str)
                .map(str::to_string)
        };
        let keys = JoinKeys::resolve(
            string_arg("on", 1),
            call.keyword("left_on").and_then(Expr::as_str).map(str::to_string),
            call.keyword("right_on").and_then(Expr::as_str).map(str::to_string),
        );
        let result = keys.and_then(|keys| {
            let how = match string_arg("how", 2) {
                Some(how) => how.parse::<JoinHow>()?,
                None => JoinHow::Inner,
            };
            infer_join(left, &right, &keys, how)
        });
        body.record(result)
    }

    /// `frame.group_by(keys).agg(aggs)`
    fn group_by_agg(&mut self, body: &mut Body<'_>, agg: MethodCall<'_>) -> Option<FrameType> {
        let group_by = agg
            .receiver
            .as_method_call()
            .filter(|call| matches!(call.method, "group_by" | "groupby"))?;
        let input = self.infer(body, group_by.receiver)?;

        let keys: Vec<String> = group_by
            .args
            .iter()
            .filter_map(key_name)
            .map(str::to_string)
            .collect();
        let aggs: Vec<AggExpr> = agg
            .args
            .iter()
            .filter_map(agg_expr)
            .chain(
                agg.keywords
                    .iter()
                    .filter_map(|k| agg_expr(&k.value).map(|a| a.alias(k.arg.as_str()))),
            )
            .collect();

        body.record(infer_group_by(&input, &keys, &aggs))
    }

    /// Typed output columns of a `select`/`with_columns` call.
    fn project(&mut self, body: &mut Body<'_>, input: &FrameType, call: MethodCall<'_>) -> Vec<(String, DataType)> {
        let mut typer = ColumnTyper::new(input);
        let mut columns = Vec::new();
        for arg in call.args {
            columns.extend(typer.projection_arg(arg));
        }
        for keyword in call.keywords {
            columns.extend(typer.projection_keyword(keyword));
        }
        body.errors.extend(typer.into_errors());
        columns
    }

    fn resolve_call(
        &mut self,
        body: &mut Body<'_>,
        callee: &str,
        args: &[Expr],
        keywords: &[Keyword],
    ) -> Option<FrameType> {
        let registry = self.registry;
        let Some(id) = registry.lookup(callee) else {
            tracing::debug!(caller = body.function, callee, "call to unknown function has no schema");
            return None;
        };
        let info = registry.info(id);
        let shapes = self.argument_shapes(body, info, args, keywords);

        match &info.signature {
            Some(signature) => {
                tracing::debug!(caller = body.function, callee, "resolved call to annotated function");
                check_arguments(body, info, signature, &shapes);
                signature.returns.clone()
            }
            None => self.derive_return(id, shapes),
        }
    }

    /// Infer argument schemas by parameter position. Keywords bind by
    /// parameter name; arguments without a matching parameter are dropped.
    fn argument_shapes(
        &mut self,
        body: &mut Body<'_>,
        info: &FunctionInfo<'_>,
        args: &[Expr],
        keywords: &[Keyword],
    ) -> CallKey {
        let mut shapes = vec![None; info.def.params.len()];
        for (position, arg) in args.iter().enumerate().take(shapes.len()) {
            shapes[position] = self.infer(body, arg);
        }
        for keyword in keywords {
            if let Some(position) = info.param_index(&keyword.arg) {
                shapes[position] = self.infer(body, &keyword.value);
            }
        }
        shapes
    }

    /// Return schema of an unannotated function called with `shapes`,
    /// derived by analyzing its body.
    fn derive_return(&mut self, id: FunctionId<'a>, shapes: CallKey) -> Option<FrameType> {
        let registry = self.registry;
        let info = registry.info(id);
        let callee = info.name();

        if let Some(result) = info.cached(&shapes) {
            tracing::trace!(callee, "reusing derived return schema");
            return result;
        }
        if !self.in_progress.insert(id) {
            tracing::warn!(callee, "recursive call into unannotated function has no schema");
            return None;
        }

        let params = info
            .def
            .params
            .iter()
            .zip(&shapes)
            .filter_map(|(param, shape)| shape.clone().map(|frame| (param.name.clone(), frame)))
            .collect();
        let analysis = self.analyze(info.def, params);
        self.in_progress.remove(&id);

        for err in &analysis.errors {
            tracing::debug!(callee, %err, "diagnostic inside unannotated function");
        }
        info.remember(shapes, analysis.inferred_return.clone());
        analysis.inferred_return
    }
}

/// Check argument schemas against the callee's declared parameters.
fn check_arguments(
    body: &mut Body<'_>,
    info: &FunctionInfo<'_>,
    signature: &FunctionSignature,
    shapes: &CallKey,
) {
    for ((param, expected), actual) in info.def.params.iter().zip(&signature.params).zip(shapes) {
        let (Some(expected), Some(actual)) = (expected, actual) else {
            continue;
        };
        for violation in actual.subtype_violations(expected) {
            let err = match violation {
                SchemaViolation::MissingColumn { column, expected } => {
                    CheckError::ArgumentMissingColumn {
                        function: info.name().to_string(),
                        param: param.name.clone(),
                        column,
                        expected,
                    }
                }
                SchemaViolation::IncompatibleColumn {
                    column,
                    expected,
                    actual,
                } => CheckError::ArgumentTypeMismatch {
                    function: info.name().to_string(),
                    param: param.name.clone(),
                    column,
                    expected,
                    actual,
                },
            };
            body.errors.push(err);
        }
    }
}
