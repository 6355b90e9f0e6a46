//! Syntax tree for host source units.
//!
//! Only the shapes the checker understands are represented. Anything else
//! a front end meets should be lowered to an expression the checker will
//! treat as opaque, such as a call to an unknown name.

use polypolarism_types::Literal;
use serde::{Deserialize, Serialize};

use crate::span::Span;

/// One host source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Module {
    /// Path of the host file this unit was extracted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Function definitions in source order.
    #[serde(default)]
    pub functions: Vec<FunctionDef>,
}

impl Module {
    pub fn new(functions: Vec<FunctionDef>) -> Self {
        Self {
            path: None,
            functions,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// A function definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    /// Raw schema string of the return annotation, if it is a frame schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    /// 1-based line of the definition.
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub span: Span,
}

/// A positional parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    /// Raw schema string of the annotation, if it is a frame schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

/// A statement in a function body.
///
/// Control flow is flattened away by the front end; statements inside
/// branches and loops appear in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    Assign {
        target: String,
        value: Expr,
    },
    AnnAssign {
        target: String,
        /// Raw schema string of the annotation.
        annotation: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Expr>,
    },
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Expr>,
    },
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Name {
        id: String,
    },
    Constant {
        value: Literal,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Call {
        func: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        keywords: Vec<Keyword>,
    },
    BinOp {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },
}

/// A `name=value` call argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub arg: String,
    pub value: Expr,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Sub,
    Mult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
}

impl Operator {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::NotEq
                | Operator::Lt
                | Operator::LtE
                | Operator::Gt
                | Operator::GtE
        )
    }
}

/// A method call `receiver.method(args, keywords)`, borrowed from an
/// [`Expr::Call`].
#[derive(Debug, Clone, Copy)]
pub struct MethodCall<'a> {
    pub receiver: &'a Expr,
    pub method: &'a str,
    pub args: &'a [Expr],
    pub keywords: &'a [Keyword],
}

impl<'a> MethodCall<'a> {
    /// Value of the keyword argument `name`.
    pub fn keyword(&self, name: &str) -> Option<&'a Expr> {
        find_keyword(self.keywords, name)
    }
}

impl Expr {
    /// The identifier of a bare name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Expr::Name { id } => Some(id),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Expr::Constant { value } => Some(value),
            _ => None,
        }
    }

    /// The value of a string constant.
    pub fn as_str(&self) -> Option<&str> {
        self.as_literal().and_then(Literal::as_str)
    }

    /// View this expression as `receiver.method(...)`.
    pub fn as_method_call(&self) -> Option<MethodCall<'_>> {
        match self {
            Expr::Call {
                func,
                args,
                keywords,
            } => match func.as_ref() {
                Expr::Attribute { value, attr } => Some(MethodCall {
                    receiver: value,
                    method: attr,
                    args,
                    keywords,
                }),
                _ => None,
            },
            _ => None,
        }
    }

    /// View this expression as a plain call `name(args, keywords)`.
    pub fn as_function_call(&self) -> Option<(&str, &[Expr], &[Keyword])> {
        match self {
            Expr::Call {
                func,
                args,
                keywords,
            } => func
                .as_name()
                .map(|name| (name, args.as_slice(), keywords.as_slice())),
            _ => None,
        }
    }

    /// View this expression as `namespace.function(...)`, such as `pl.col("x")`.
    pub fn as_namespaced_call(&self, namespace: &str, function: &str) -> Option<&[Expr]> {
        let call = self.as_method_call()?;
        (call.receiver.as_name() == Some(namespace) && call.method == function)
            .then_some(call.args)
    }
}

fn find_keyword<'a>(keywords: &'a [Keyword], name: &str) -> Option<&'a Expr> {
    keywords.iter().find(|k| k.arg == name).map(|k| &k.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{int, name, pl_col, string};

    #[test]
    fn test_method_call_view() {
        let expr = name("df").method_kw("join", vec![name("other")], vec![("on", string("id"))]);
        let call = expr.as_method_call().unwrap();
        assert_eq!(call.receiver.as_name(), Some("df"));
        assert_eq!(call.method, "join");
        assert_eq!(call.args.len(), 1);
        assert_eq!(call.keyword("on").and_then(Expr::as_str), Some("id"));
        assert!(call.keyword("how").is_none());
    }

    #[test]
    fn test_namespaced_call_view() {
        let expr = pl_col("x");
        let args = expr.as_namespaced_call("pl", "col").unwrap();
        assert_eq!(args[0].as_str(), Some("x"));
        assert!(expr.as_namespaced_call("pl", "lit").is_none());
        assert!(name("x").as_namespaced_call("pl", "col").is_none());
    }

    #[test]
    fn test_function_call_view() {
        let expr = name("helper").call(vec![name("df")]);
        let (callee, args, keywords) = expr.as_function_call().unwrap();
        assert_eq!(callee, "helper");
        assert_eq!(args.len(), 1);
        assert!(keywords.is_empty());
        assert!(pl_col("x").as_function_call().is_none());
    }

    #[test]
    fn test_comparison_operators() {
        assert!(Operator::GtE.is_comparison());
        assert!(!Operator::Mult.is_comparison());
        assert!(int(1).as_str().is_none());
    }
}
