//! The one fallible outcome this crate exposes: an out-of-range ordinal.

use std::fmt;

/// Returned by the checked accessors (`at`, `at_mut`, ...) when the
/// requested index is not less than the container's length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexOutOfBounds {
    index: usize,
    len: usize,
}

impl IndexOutOfBounds {
    pub(crate) fn new(index: usize, len: usize) -> Self {
        IndexOutOfBounds { index, len }
    }

    /// The index that was requested.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The container length at the time of the request.
    pub fn len(&self) -> usize {
        self.len
    }
}

impl fmt::Display for IndexOutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index {} out of bounds for a container of length {}", self.index, self.len)
    }
}

impl std::error::Error for IndexOutOfBounds {}
