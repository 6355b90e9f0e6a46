//! Locations of functions in the host file.

use serde::{Deserialize, Serialize};

/// A byte range in the host source file, end exclusive. Front ends that do
/// not track offsets leave it empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
