//! Shorthand constructors for syntax trees.
//!
//! ```
//! use polypolarism_syntax::{name, pl_col, FunctionDef, Stmt};
//!
//! let def = FunctionDef::new("ids")
//!     .typed_param("df", "{id: Int64, name: Utf8}")
//!     .returns("{id: Int64}")
//!     .stmt(Stmt::ret(name("df").method("select", vec![pl_col("id")])));
//! assert_eq!(def.params.len(), 1);
//! ```

use polypolarism_types::Literal;

use crate::ast::{Expr, FunctionDef, Keyword, Operator, Param, Stmt};
use crate::span::Span;

pub fn name(id: impl Into<String>) -> Expr {
    Expr::Name { id: id.into() }
}

pub fn constant(value: impl Into<Literal>) -> Expr {
    Expr::Constant {
        value: value.into(),
    }
}

pub fn string(value: impl Into<String>) -> Expr {
    constant(Literal::Str(value.into()))
}

pub fn int(value: i64) -> Expr {
    constant(value)
}

pub fn float(value: f64) -> Expr {
    constant(value)
}

pub fn null() -> Expr {
    constant(Literal::Null)
}

/// `pl.col(name)`
pub fn pl_col(column: impl Into<String>) -> Expr {
    name("pl").method("col", vec![string(column)])
}

/// `pl.lit(value)`
pub fn pl_lit(value: impl Into<Literal>) -> Expr {
    name("pl").method("lit", vec![constant(value)])
}

/// `pl.when(condition)`; chain `.then(..)` and `.otherwise(..)` with
/// [`Expr::method`].
pub fn pl_when(condition: Expr) -> Expr {
    name("pl").method("when", vec![condition])
}

pub fn kw(arg: impl Into<String>, value: Expr) -> Keyword {
    Keyword {
        arg: arg.into(),
        value,
    }
}

impl Expr {
    pub fn attr(self, attr: impl Into<String>) -> Expr {
        Expr::Attribute {
            value: Box::new(self),
            attr: attr.into(),
        }
    }

    pub fn call(self, args: Vec<Expr>) -> Expr {
        Expr::Call {
            func: Box::new(self),
            args,
            keywords: Vec::new(),
        }
    }

    pub fn call_kw(self, args: Vec<Expr>, keywords: Vec<(&str, Expr)>) -> Expr {
        Expr::Call {
            func: Box::new(self),
            args,
            keywords: keywords
                .into_iter()
                .map(|(arg, value)| kw(arg, value))
                .collect(),
        }
    }

    /// `self.method(args)`
    pub fn method(self, method: impl Into<String>, args: Vec<Expr>) -> Expr {
        self.attr(method).call(args)
    }

    /// `self.method(args, key=value, ...)`
    pub fn method_kw(
        self,
        method: impl Into<String>,
        args: Vec<Expr>,
        keywords: Vec<(&str, Expr)>,
    ) -> Expr {
        self.attr(method).call_kw(args, keywords)
    }

    /// `self.alias(output)`
    pub fn alias(self, output: impl Into<String>) -> Expr {
        self.method("alias", vec![string(output)])
    }

    pub fn binop(self, op: Operator, right: Expr) -> Expr {
        Expr::BinOp {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }
}

impl Stmt {
    pub fn assign(target: impl Into<String>, value: Expr) -> Stmt {
        Stmt::Assign {
            target: target.into(),
            value,
        }
    }

    pub fn ann_assign(target: impl Into<String>, annotation: impl Into<String>, value: Expr) -> Stmt {
        Stmt::AnnAssign {
            target: target.into(),
            annotation: annotation.into(),
            value: Some(value),
        }
    }

    pub fn ret(value: Expr) -> Stmt {
        Stmt::Return { value: Some(value) }
    }
}

impl FunctionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: None,
            body: Vec::new(),
            line: 0,
            span: Span::default(),
        }
    }

    /// Add an unannotated parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            annotation: None,
        });
        self
    }

    /// Add a parameter annotated with a schema string.
    pub fn typed_param(mut self, name: impl Into<String>, schema: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            annotation: Some(schema.into()),
        });
        self
    }

    pub fn returns(mut self, schema: impl Into<String>) -> Self {
        self.returns = Some(schema.into());
        self
    }

    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.body.push(stmt);
        self
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }
}
