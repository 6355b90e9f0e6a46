//! Schema transfer functions for data frame operations.
//!
//! Each function takes input frame types and operation parameters and
//! returns a new frame type describing the operation's output.

pub mod error;
pub mod join;
pub mod groupby;
pub mod projection;

pub use error::{GroupByError, JoinError};
pub use groupby::{infer_agg, infer_group_by, AggExpr, AggFunction};
pub use join::{infer_join, JoinHow, JoinKeys};
pub use projection::{infer_select, infer_with_columns};
