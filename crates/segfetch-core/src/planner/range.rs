//! Segment type and HTTP Range bounds.

/// A single segment: ordinal `index` and byte range [start, end) (half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Position in the reassembled output.
    pub index: usize,
    /// Start offset (inclusive).
    pub start: u64,
    /// End offset (exclusive).
    pub end: u64,
}

impl Segment {
    /// Length of this segment in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Last byte covered by this segment (inclusive).
    pub fn last_byte(&self) -> u64 {
        self.end.saturating_sub(1)
    }

    /// Range in the form curl expects: `start-end`, inclusive, without the `bytes=` unit.
    pub fn curl_range(&self) -> String {
        if self.is_empty() {
            "0-0".to_string()
        } else {
            format!("{}-{}", self.start, self.last_byte())
        }
    }
}
