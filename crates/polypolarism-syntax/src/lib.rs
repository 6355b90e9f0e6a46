//! Front-end representation of host source units.
//!
//! A front end parses host source files and hands each unit to the checker
//! as a [`Module`]. Schema annotations arrive as raw DSL strings; the checker
//! parses them itself.

pub mod ast;
pub mod build;
pub mod span;

pub use ast::{Expr, FunctionDef, Keyword, MethodCall, Module, Operator, Param, Stmt};
pub use build::{constant, float, int, kw, name, null, pl_col, pl_lit, pl_when, string};
pub use span::Span;
