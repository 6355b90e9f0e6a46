//! Declared versus inferred return schemas.

use std::collections::HashMap;

use indexmap::IndexMap;
use polypolarism_syntax::Module;
use polypolarism_types::FrameType;

use crate::diagnostic::CheckError;
use crate::flow::FlowAnalyzer;
use crate::registry::FunctionRegistry;

/// Analysis of one annotated function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionAnalysis {
    pub name: String,
    pub line: u32,
    /// Declared parameter schemas, by parameter name.
    pub input_types: IndexMap<String, FrameType>,
    pub declared_return: Option<FrameType>,
    pub inferred_return: Option<FrameType>,
    pub errors: Vec<CheckError>,
}

impl FunctionAnalysis {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// The verdict for one function.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub function_name: String,
    pub line: u32,
    pub declared: Option<FrameType>,
    pub inferred: Option<FrameType>,
    pub errors: Vec<CheckError>,
    pub passed: bool,
}

/// Analyze every function of `module` that carries a schema annotation.
pub fn analyze_module(module: &Module) -> Vec<FunctionAnalysis> {
    // First pass: register all functions and their signatures
    let registry = FunctionRegistry::build(module);
    let mut analyzer = FlowAnalyzer::new(&registry);

    // Second pass: analyze annotated bodies
    let mut analyses = Vec::new();
    for (_, info) in registry.iter() {
        let Some(signature) = &info.signature else {
            continue;
        };

        let input_types: IndexMap<String, FrameType> = info
            .def
            .params
            .iter()
            .zip(&signature.params)
            .filter_map(|(param, frame)| frame.clone().map(|frame| (param.name.clone(), frame)))
            .collect();
        let params: HashMap<String, FrameType> = input_types
            .iter()
            .map(|(name, frame)| (name.clone(), frame.clone()))
            .collect();
        let body = analyzer.analyze(info.def, params);

        analyses.push(FunctionAnalysis {
            name: info.name().to_string(),
            line: info.def.line,
            input_types,
            declared_return: signature.returns.clone(),
            inferred_return: body.inferred_return,
            errors: body.errors,
        });
    }
    analyses
}

/// Compare a function's declared return schema with the inferred one.
///
/// Analysis errors come first, followed by missing columns, extra columns
/// and type differences.
pub fn check_function(analysis: FunctionAnalysis) -> CheckResult {
    let FunctionAnalysis {
        name,
        line,
        declared_return,
        inferred_return,
        mut errors,
        ..
    } = analysis;

    match (&declared_return, &inferred_return) {
        (None, _) => {}
        (Some(_), None) => errors.push(CheckError::return_not_inferred()),
        (Some(declared), Some(inferred)) => errors.extend(compare(declared, inferred)),
    }

    CheckResult {
        function_name: name,
        line,
        declared: declared_return,
        inferred: inferred_return,
        passed: errors.is_empty(),
        errors,
    }
}

fn compare(declared: &FrameType, inferred: &FrameType) -> Vec<CheckError> {
    let mut errors = Vec::new();

    for (column, expected) in declared.columns() {
        if !inferred.has_column(column) {
            errors.push(CheckError::MissingColumn {
                column: column.clone(),
                expected: expected.clone(),
            });
        }
    }

    for (column, ty) in inferred.columns() {
        if !declared.has_column(column) {
            errors.push(CheckError::ExtraColumn {
                column: column.clone(),
                inferred: ty.clone(),
            });
        }
    }

    for (column, expected) in declared.columns() {
        if let Some(actual) = inferred.column(column) {
            if !actual.is_subtype_of(expected) {
                errors.push(CheckError::TypeDifference {
                    column: column.clone(),
                    declared: expected.clone(),
                    inferred: actual.clone(),
                });
            }
        }
    }

    errors
}

/// Check every annotated function of `module`.
pub fn check_module(module: &Module) -> Vec<CheckResult> {
    analyze_module(module)
        .into_iter()
        .map(check_function)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polypolarism_syntax::{name, pl_col, FunctionDef, Stmt};
    use polypolarism_types::DataType;

    fn schema(source: &str) -> FrameType {
        polypolarism_dsl::parse_schema(source).unwrap()
    }

    fn analysis(declared: Option<&str>, inferred: Option<&str>) -> FunctionAnalysis {
        FunctionAnalysis {
            name: "f".into(),
            line: 1,
            input_types: IndexMap::new(),
            declared_return: declared.map(schema),
            inferred_return: inferred.map(schema),
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_exact_match_passes() {
        let result = check_function(analysis(Some("{id: Int64}"), Some("{id: Int64}")));
        assert!(result.passed);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_nullable_declared_accepts_non_nullable() {
        let result = check_function(analysis(Some("{id: Int64?}"), Some("{id: Int64}")));
        assert!(result.passed);
    }

    #[test]
    fn test_nullable_inferred_rejected() {
        let result = check_function(analysis(Some("{id: Int64}"), Some("{id: Int64?}")));
        assert_eq!(
            result.errors,
            vec![CheckError::TypeDifference {
                column: "id".into(),
                declared: DataType::Int64,
                inferred: DataType::Int64.nullable(),
            }]
        );
    }

    #[test]
    fn test_error_order() {
        let result = check_function(analysis(
            Some("{a: Int64, b: Utf8, c: Int64}"),
            Some("{c: Utf8, d: Boolean, a: Int64}"),
        ));
        assert!(!result.passed);
        assert_eq!(
            result.errors,
            vec![
                CheckError::MissingColumn {
                    column: "b".into(),
                    expected: DataType::Utf8,
                },
                CheckError::ExtraColumn {
                    column: "d".into(),
                    inferred: DataType::Boolean,
                },
                CheckError::TypeDifference {
                    column: "c".into(),
                    declared: DataType::Int64,
                    inferred: DataType::Utf8,
                },
            ]
        );
    }

    #[test]
    fn test_missing_inference() {
        let result = check_function(analysis(Some("{id: Int64}"), None));
        assert!(!result.passed);
        assert_eq!(result.errors, vec![CheckError::return_not_inferred()]);
    }

    #[test]
    fn test_no_declared_return_only_uses_analysis_errors() {
        let result = check_function(analysis(None, Some("{id: Int64}")));
        assert!(result.passed);

        let mut failing = analysis(None, None);
        failing.errors.push(CheckError::return_not_inferred());
        assert!(!check_function(failing).passed);
    }

    #[test]
    fn test_unannotated_functions_are_skipped() {
        let module = Module::new(vec![
            FunctionDef::new("helper").param("df").stmt(Stmt::ret(name("df"))),
            FunctionDef::new("typed")
                .typed_param("df", "{id: Int64}")
                .at_line(4)
                .stmt(Stmt::ret(name("df").method("select", vec![pl_col("id")]))),
        ]);
        let analyses = analyze_module(&module);
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].name, "typed");
        assert_eq!(analyses[0].line, 4);
        assert_eq!(analyses[0].input_types.get("df"), Some(&schema("{id: Int64}")));
        assert!(!analyses[0].has_errors());
    }

    #[test]
    fn test_analysis_errors_fail_the_check() {
        let module = Module::new(vec![FunctionDef::new("typed")
            .typed_param("df", "{id: Int64}")
            .returns("{id: Int64}")
            .stmt(Stmt::ret(
                name("df").method("with_columns", vec![pl_col("missing").alias("m")]),
            ))]);
        let results = check_module(&module);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
        assert!(matches!(results[0].errors[0], CheckError::Type(_)));
    }
}
