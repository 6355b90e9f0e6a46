//! End-to-end checks of whole units.

use polypolarism_analyzer::{analyze_module, check_module, CheckError, CheckResult};
use polypolarism_dsl::parse_schema;
use polypolarism_ops::{GroupByError, JoinError};
use polypolarism_syntax::{
    float, int, name, pl_col, pl_lit, string, Expr, FunctionDef, Module, Operator, Stmt,
};
use polypolarism_types::{DataType, FrameType, TypeError};

fn schema(source: &str) -> FrameType {
    parse_schema(source).unwrap()
}

fn result<'a>(results: &'a [CheckResult], function: &str) -> &'a CheckResult {
    results
        .iter()
        .find(|r| r.function_name == function)
        .unwrap_or_else(|| panic!("no result for {}", function))
}

fn join(left: &str, right: &str, on: &str, how: &str) -> Expr {
    name(left).method_kw(
        "join",
        vec![name(right)],
        vec![("on", string(on)), ("how", string(how))],
    )
}

fn sum(column: &str) -> Expr {
    pl_col(column).method("sum", vec![])
}

fn count(column: &str) -> Expr {
    pl_col(column).method("count", vec![])
}

// The scenarios below use the users/orders frames throughout.
const USERS: &str = "{user_id: Int64, name: Utf8}";
const ORDERS: &str = "{order_id: Int64, user_id: Int64, amount: Float64}";

#[test]
fn identity_function_passes() {
    let module = Module::new(vec![FunctionDef::new("identity")
        .typed_param("df", "{id: Int64, name: Utf8}")
        .returns("{id: Int64, name: Utf8}")
        .stmt(Stmt::ret(name("df")))]);

    let results = check_module(&module);
    assert_eq!(results.len(), 1);
    assert!(results[0].passed);
    assert!(results[0].errors.is_empty());
    assert_eq!(results[0].inferred, Some(schema("{id: Int64, name: Utf8}")));
}

#[test]
fn inner_join_passes() {
    let module = Module::new(vec![FunctionDef::new("basic_join")
        .typed_param("users", USERS)
        .typed_param("orders", ORDERS)
        .returns("{user_id: Int64, name: Utf8, order_id: Int64, amount: Float64}")
        .stmt(Stmt::ret(join("users", "orders", "user_id", "inner")))]);

    let results = check_module(&module);
    assert!(results[0].passed, "{:?}", results[0].errors);
}

#[test]
fn left_join_makes_right_columns_nullable() {
    let module = Module::new(vec![
        FunctionDef::new("declared_nullable")
            .typed_param("users", USERS)
            .typed_param("orders", ORDERS)
            .returns("{user_id: Int64, name: Utf8, order_id: Int64?, amount: Float64?}")
            .stmt(Stmt::ret(join("users", "orders", "user_id", "left"))),
        FunctionDef::new("declared_strict")
            .typed_param("users", USERS)
            .typed_param("orders", ORDERS)
            .returns("{user_id: Int64, name: Utf8, order_id: Int64?, amount: Float64}")
            .stmt(Stmt::ret(join("users", "orders", "user_id", "left"))),
    ]);

    let results = check_module(&module);
    assert!(result(&results, "declared_nullable").passed);

    let strict = result(&results, "declared_strict");
    assert_eq!(
        strict.errors,
        vec![CheckError::TypeDifference {
            column: "amount".into(),
            declared: DataType::Float64,
            inferred: DataType::Float64.nullable(),
        }]
    );
}

#[test]
fn group_by_sum_and_count() {
    let module = Module::new(vec![FunctionDef::new("totals")
        .typed_param("sales", "{country: Utf8, amount: Float64}")
        .returns("{country: Utf8, total: Float64, n: UInt32}")
        .stmt(Stmt::assign(
            "result",
            name("sales")
                .method("group_by", vec![string("country")])
                .method(
                    "agg",
                    vec![sum("amount").alias("total"), count("amount").alias("n")],
                ),
        ))
        .stmt(Stmt::ret(name("result")))]);

    let results = check_module(&module);
    assert!(results[0].passed, "{:?}", results[0].errors);
    assert_eq!(
        results[0].inferred,
        Some(schema("{country: Utf8, total: Float64, n: UInt32}"))
    );
}

#[test]
fn sum_over_string_fails() {
    let module = Module::new(vec![FunctionDef::new("bad_sum")
        .typed_param("df", "{id: Int64, label: Utf8}")
        .returns("{id: Int64, label_sum: Utf8}")
        .stmt(Stmt::ret(
            name("df")
                .method("group_by", vec![string("id")])
                .method("agg", vec![sum("label").alias("label_sum")]),
        ))]);

    let results = check_module(&module);
    let failed = &results[0];
    assert!(!failed.passed);
    assert!(matches!(
        &failed.errors[0],
        CheckError::GroupBy(GroupByError::NonNumeric { ty: DataType::Utf8, .. })
    ));
    let message = failed.errors[0].to_string();
    assert!(message.contains("sum"));
    assert!(message.contains("Utf8"));
    // The failed group-by leaves nothing to compare against.
    assert_eq!(failed.errors[1], CheckError::return_not_inferred());
}

#[test]
fn untyped_callee_is_analyzed_with_caller_schema() {
    let module = Module::new(vec![
        FunctionDef::new("untyped_add_column").param("df").stmt(Stmt::ret(
            name("df").method("with_columns", vec![pl_lit(100).alias("new_col")]),
        )),
        FunctionDef::new("caller")
            .typed_param("data", "{id: Int64}")
            .returns("{id: Int64, new_col: Int64}")
            .stmt(Stmt::ret(name("untyped_add_column").call(vec![name("data")]))),
    ]);

    let results = check_module(&module);
    assert_eq!(results.len(), 1);
    assert!(results[0].passed, "{:?}", results[0].errors);
}

#[test]
fn untyped_passthrough() {
    let module = Module::new(vec![
        FunctionDef::new("passthrough")
            .param("df")
            .stmt(Stmt::ret(name("df"))),
        FunctionDef::new("caller")
            .typed_param("data", "{id: Int64, name: Utf8}")
            .returns("{id: Int64, name: Utf8}")
            .stmt(Stmt::ret(name("passthrough").call(vec![name("data")]))),
    ]);
    assert!(check_module(&module)[0].passed);
}

#[test]
fn untyped_external_call_cannot_be_inferred() {
    let module = Module::new(vec![
        FunctionDef::new("external_function").param("df").stmt(Stmt::ret(
            name("some_external_lib").method("process", vec![name("df")]),
        )),
        FunctionDef::new("caller")
            .typed_param("data", "{id: Int64}")
            .returns("{id: Int64}")
            .stmt(Stmt::ret(name("external_function").call(vec![name("data")]))),
    ]);

    let results = check_module(&module);
    assert_eq!(results[0].errors, vec![CheckError::return_not_inferred()]);
}

#[test]
fn forward_reference_to_typed_function() {
    let module = Module::new(vec![
        FunctionDef::new("caller")
            .typed_param("df", "{x: Int64}")
            .returns("{x: Int64, y: Int64}")
            .stmt(Stmt::ret(name("defined_later").call(vec![name("df")]))),
        FunctionDef::new("defined_later")
            .typed_param("df", "{x: Int64}")
            .returns("{x: Int64, y: Int64}")
            .stmt(Stmt::ret(name("df").method(
                "with_columns",
                vec![pl_col("x").alias("y")],
            ))),
    ]);

    let results = check_module(&module);
    assert!(results.iter().all(|r| r.passed));
}

#[test]
fn chained_typed_calls() {
    let module = Module::new(vec![
        FunctionDef::new("add_b")
            .typed_param("df", "{a: Int64}")
            .returns("{a: Int64, b: Int64}")
            .stmt(Stmt::ret(
                name("df").method("with_columns", vec![pl_lit(1).alias("b")]),
            )),
        FunctionDef::new("add_c")
            .typed_param("df", "{a: Int64, b: Int64}")
            .returns("{a: Int64, b: Int64, c: Utf8}")
            .stmt(Stmt::ret(
                name("df").method("with_columns", vec![pl_lit("x").alias("c")]),
            )),
        FunctionDef::new("pipeline")
            .typed_param("df", "{a: Int64}")
            .returns("{a: Int64, b: Int64, c: Utf8}")
            .stmt(Stmt::ret(
                name("add_c").call(vec![name("add_b").call(vec![name("df")])]),
            )),
    ]);

    let analyses = analyze_module(&module);
    let pipeline = analyses.iter().find(|a| a.name == "pipeline").unwrap();
    assert_eq!(
        pipeline.inferred_return.as_ref().map(FrameType::column_names),
        Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
    assert!(check_module(&module).iter().all(|r| r.passed));
}

#[test]
fn typed_call_followed_by_select() {
    let module = Module::new(vec![
        FunctionDef::new("normalize")
            .typed_param("df", "{id: Int64, value: Float64}")
            .returns("{id: Int64, norm: Float64}")
            .stmt(Stmt::ret(name("df").method(
                "select",
                vec![
                    pl_col("id"),
                    pl_col("value").binop(Operator::Div, float(100.0)).alias("norm"),
                ],
            ))),
        FunctionDef::new("process_and_filter")
            .typed_param("data", "{id: Int64, value: Float64}")
            .returns("{id: Int64, norm: Float64}")
            .stmt(Stmt::assign(
                "normalized",
                name("normalize").call(vec![name("data")]),
            ))
            .stmt(Stmt::ret(
                name("normalized").method("select", vec![pl_col("id"), pl_col("norm")]),
            )),
    ]);

    assert!(check_module(&module).iter().all(|r| r.passed));
}

#[test]
fn argument_missing_column() {
    let module = Module::new(vec![
        FunctionDef::new("requires_two_columns")
            .typed_param("df", "{id: Int64, name: Utf8}")
            .returns("{id: Int64, name: Utf8}")
            .stmt(Stmt::ret(name("df"))),
        FunctionDef::new("caller")
            .typed_param("data", "{id: Int64}")
            .returns("{id: Int64, name: Utf8}")
            .stmt(Stmt::ret(
                name("requires_two_columns").call(vec![name("data")]),
            )),
    ]);

    let results = check_module(&module);
    let caller = result(&results, "caller");
    assert_eq!(
        caller.errors,
        vec![CheckError::ArgumentMissingColumn {
            function: "requires_two_columns".into(),
            param: "df".into(),
            column: "name".into(),
            expected: DataType::Utf8,
        }]
    );
}

#[test]
fn argument_nullable_mismatch() {
    let module = Module::new(vec![
        FunctionDef::new("expects_non_nullable")
            .typed_param("df", "{id: Int64, value: Int64}")
            .returns("{id: Int64, value: Int64}")
            .stmt(Stmt::ret(name("df"))),
        FunctionDef::new("caller")
            .typed_param("data", "{id: Int64, value: Int64?}")
            .returns("{id: Int64, value: Int64}")
            .stmt(Stmt::ret(
                name("expects_non_nullable").call(vec![name("data")]),
            )),
    ]);

    let results = check_module(&module);
    let caller = result(&results, "caller");
    assert!(!caller.passed);
    assert!(matches!(
        &caller.errors[..],
        [CheckError::ArgumentTypeMismatch { column, .. }] if column == "value"
    ));
}

#[test]
fn variable_annotation_then_select() {
    let module = Module::new(vec![FunctionDef::new("process")
        .returns("{id: Int64, doubled: Int64}")
        .stmt(Stmt::ann_assign(
            "df",
            "{id: Int64, value: Int64}",
            name("get_external_data").call(vec![]),
        ))
        .stmt(Stmt::assign(
            "result",
            name("df").method(
                "select",
                vec![
                    pl_col("id"),
                    pl_col("value").binop(Operator::Mult, int(2)).alias("doubled"),
                ],
            ),
        ))
        .stmt(Stmt::ret(name("result")))]);

    let results = check_module(&module);
    assert!(results[0].passed, "{:?}", results[0].errors);
}

#[test]
fn column_not_found_in_select() {
    let module = Module::new(vec![FunctionDef::new("bad_select")
        .typed_param("df", "{id: Int64, name: Utf8}")
        .returns("{id: Int64, email: Utf8}")
        .stmt(Stmt::ret(
            name("df").method("select", vec![pl_col("id"), pl_col("email")]),
        ))]);

    let results = check_module(&module);
    let errors = &results[0].errors;
    assert!(matches!(
        &errors[0],
        CheckError::Type(TypeError::ColumnNotFound { column, .. }) if column == "email"
    ));
    assert!(errors.contains(&CheckError::MissingColumn {
        column: "email".into(),
        expected: DataType::Utf8,
    }));
}

#[test]
fn join_errors_surface() {
    let module = Module::new(vec![
        FunctionDef::new("missing_key")
            .typed_param("users", "{id: Int64, name: Utf8}")
            .typed_param("orders", ORDERS)
            .returns("{user_id: Int64}")
            .stmt(Stmt::ret(join("users", "orders", "user_id", "inner"))),
        FunctionDef::new("key_mismatch")
            .typed_param("users", "{user_id: Utf8, name: Utf8}")
            .typed_param("orders", ORDERS)
            .returns("{user_id: Int64}")
            .stmt(Stmt::ret(join("users", "orders", "user_id", "inner"))),
    ]);

    let results = check_module(&module);
    assert!(matches!(
        result(&results, "missing_key").errors[0],
        CheckError::Join(JoinError::LeftKeyNotFound { .. })
    ));
    assert!(matches!(
        result(&results, "key_mismatch").errors[0],
        CheckError::Join(JoinError::KeyTypeMismatch { .. })
    ));
}

#[test]
fn group_by_unknown_column() {
    let module = Module::new(vec![FunctionDef::new("bad_group")
        .typed_param("df", "{country: Utf8, amount: Float64}")
        .returns("{region: Utf8, total: Float64}")
        .stmt(Stmt::ret(
            name("df")
                .method("group_by", vec![string("region")])
                .method("agg", vec![sum("amount").alias("total")]),
        ))]);

    let results = check_module(&module);
    assert_eq!(
        results[0].errors[0],
        CheckError::GroupBy(GroupByError::KeyNotFound {
            column: "region".into()
        })
    );
}

#[test]
fn malformed_annotation_is_ignored() {
    let module = Module::new(vec![
        FunctionDef::new("only_bad")
            .typed_param("df", "{id: Int64")
            .stmt(Stmt::ret(name("df"))),
        FunctionDef::new("bad_param")
            .typed_param("df", "{id: Integer}")
            .returns("{id: Int64}")
            .stmt(Stmt::ret(name("df"))),
    ]);

    let results = check_module(&module);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].function_name, "bad_param");
    assert_eq!(results[0].errors, vec![CheckError::return_not_inferred()]);
}

#[test]
fn conditional_and_cast_columns() {
    let module = Module::new(vec![FunctionDef::new("label")
        .typed_param("df", "{id: Int64, score: Float64?}")
        .returns("{id: Int64, score: Int32?, grade: Utf8}")
        .stmt(Stmt::ret(name("df").method(
            "with_columns",
            vec![
                pl_col("score").method("cast", vec![name("pl").attr("Int32")]),
                polypolarism_syntax::pl_when(pl_col("id").binop(Operator::Gt, int(10)))
                    .method("then", vec![pl_lit("high")])
                    .method("otherwise", vec![pl_lit("low")])
                    .alias("grade"),
            ],
        )))]);

    let results = check_module(&module);
    assert!(results[0].passed, "{:?}", results[0].errors);
}
