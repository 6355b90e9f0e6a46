//! Select and with_columns transfer functions.
//!
//! Expression typing happens in the analyzer; these take the already typed
//! output columns.

use polypolarism_types::{DataType, FrameType};

/// Output schema of `select`: only the produced columns survive.
pub fn infer_select<I>(columns: I) -> FrameType
where
    I: IntoIterator<Item = (String, DataType)>,
{
    columns.into_iter().collect()
}

/// Output schema of `with_columns`: the input overlaid with the produced
/// columns. Replaced columns keep their position.
pub fn infer_with_columns<I>(input: &FrameType, columns: I) -> FrameType
where
    I: IntoIterator<Item = (String, DataType)>,
{
    let mut result = input.columns().clone();
    for (name, ty) in columns {
        result.insert(name, ty);
    }
    FrameType::new(result)
}
