//! Schema DSL for polypolarism.
//!
//! Parses annotation strings such as `{id: Int64, tags: List[Utf8]?}` into
//! frame and column types.

pub mod token;
pub mod lexer;
pub mod error;
pub mod parser;

pub use error::ParseError;
pub use parser::{parse_schema, parse_type};
