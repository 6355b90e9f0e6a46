//! Schema analysis for data frame functions.
//!
//! Checking a [`Module`](polypolarism_syntax::Module) happens in two passes:
//! 1. Register every function and parse its schema annotations (`registry`)
//! 2. Analyze each annotated body and compare against its declared return
//!    schema (`flow`, `checker`)

pub mod batch;
pub mod checker;
pub mod diagnostic;
mod expr;
pub mod flow;
pub mod registry;

pub use batch::{check_units, UnitReport};
pub use checker::{analyze_module, check_function, check_module, CheckResult, FunctionAnalysis};
pub use diagnostic::CheckError;
pub use flow::{BodyAnalysis, FlowAnalyzer};
pub use registry::{FunctionId, FunctionInfo, FunctionRegistry, FunctionSignature};
