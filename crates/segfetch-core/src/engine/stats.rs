//! Per-invocation statistics.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// What one download did and how long it took. Filled in by the engine only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub url: String,
    /// Probed `Content-Length` (None if unknown or probing was disabled).
    pub content_length: Option<u64>,
    /// Whether the server advertised range support.
    pub accept_ranges: bool,
    /// Whether the chunked (ranged) path was taken.
    pub ranged: bool,
    pub segment_count: usize,
    pub segment_size: u64,
    pub total_time: Duration,
    pub slowest_segment_time: Duration,
    /// Per-segment fetch times, in index order.
    pub segment_times: Vec<Duration>,
}

impl Statistics {
    pub(crate) fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn record_segment(&mut self, elapsed: Duration) {
        self.segment_times.push(elapsed);
        if elapsed > self.slowest_segment_time {
            self.slowest_segment_time = elapsed;
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let length = self
            .content_length
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        write!(
            f,
            "Url = {}; ContentLength = {}; AcceptRanges = {}; Ranged = {}; Chunks = {}; ChunkSize = {}; TotalTime = {:?}; SlowestChunkTime = {:?}",
            self.url,
            length,
            self.accept_ranges,
            self.ranged,
            self.segment_count,
            self.segment_size,
            self.total_time,
            self.slowest_segment_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slowest_segment_tracks_maximum() {
        let mut s = Statistics::new("http://x/f");
        s.record_segment(Duration::from_millis(30));
        s.record_segment(Duration::from_millis(90));
        s.record_segment(Duration::from_millis(10));
        assert_eq!(s.slowest_segment_time, Duration::from_millis(90));
        assert_eq!(s.segment_times.len(), 3);
    }

    #[test]
    fn display_is_single_line() {
        let mut s = Statistics::new("http://x/f");
        s.content_length = Some(250_000);
        s.segment_count = 2;
        s.segment_size = 100_000;
        let line = s.to_string();
        assert!(line.starts_with("Url = http://x/f; ContentLength = 250000;"));
        assert!(line.contains("Chunks = 2; ChunkSize = 100000;"));
        assert!(!line.contains('\n'));
    }
}
