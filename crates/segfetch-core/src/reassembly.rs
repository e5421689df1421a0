//! Ordered reassembly of out-of-order segment results.

use std::collections::BTreeMap;

use crate::error::DownloadError;

/// Collects parts keyed by segment index, in any order, and hands them back
/// in ascending index order once all `expected` indices are present.
#[derive(Debug)]
pub struct Reassembler<T> {
    expected: usize,
    parts: BTreeMap<usize, T>,
}

impl<T> Reassembler<T> {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            parts: BTreeMap::new(),
        }
    }

    /// Records the part for `index`. A second part for the same index replaces the first.
    pub fn insert(&mut self, index: usize, part: T) {
        self.parts.insert(index, part);
    }

    /// Parts in index order. Fails with the lowest missing index, or if a
    /// part was inserted outside `0..expected`.
    pub fn into_ordered(self) -> Result<Vec<T>, DownloadError> {
        if let Some(index) = (0..self.expected).find(|i| !self.parts.contains_key(i)) {
            return Err(DownloadError::MissingSegment { index });
        }
        if let Some((&index, _)) = self.parts.range(self.expected..).next() {
            return Err(DownloadError::MissingSegment { index });
        }
        Ok(self.parts.into_values().collect())
    }
}
