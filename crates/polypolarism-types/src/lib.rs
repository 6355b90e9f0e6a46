//! Type system for polypolarism.
//!
//! This crate provides:
//! - Column and frame types (`types`)
//! - Literal values (`literal`)
//! - The column type algebra (`inference`)

pub mod types;
pub mod literal;
pub mod error;
pub mod inference;

pub use error::TypeError;
pub use inference::{cast, infer_conditional, infer_literal, lookup_column, promote, unify};
pub use literal::Literal;
pub use types::{DataType, FrameType, RowVar, SchemaViolation};
