//! HTTP fetchers.
//!
//! `fetch_whole` issues one unranged GET. `fetch_segments` runs one ranged GET
//! per planned segment on the configured backend and, once every transfer has
//! finished, returns each segment's outcome keyed by index. A failing segment
//! never cancels its siblings. Body bytes go to a `BodySink` as they arrive.

mod multi;
mod segment;
mod threads;
mod transfer;
mod whole;

pub use segment::fetch_segment;
pub use transfer::BodySink;
pub use whole::{fetch_whole, WholeBody};

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::{EngineConfig, FetchBackend};
use crate::error::DownloadError;
use crate::planner::Segment;
use crate::progress::Progress;
use crate::stage::SegmentStage;

/// Per-request settings taken from the engine config.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: String,
    pub connect_timeout: Duration,
    /// Notified for every accepted body chunk.
    pub progress: Option<Progress>,
}

impl From<&EngineConfig> for RequestOptions {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            method: cfg.method.clone(),
            connect_timeout: cfg.connect_timeout(),
            progress: None,
        }
    }
}

/// A successfully fetched segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSegment {
    pub index: usize,
    /// Bytes received for the segment's range.
    pub len: u64,
    /// The payload, or `None` when it was streamed to a staged file.
    pub bytes: Option<Vec<u8>>,
    /// Time from request start to last byte.
    pub elapsed: Duration,
}

/// Result of a single segment download.
pub type SegmentOutcome = Result<FetchedSegment, DownloadError>;

/// Fetches every segment concurrently and waits for all of them.
///
/// Each segment's body goes to the sink `stage` opens for it. Only a failure
/// of the multi handle itself aborts early; per-segment failures are returned
/// in the map.
pub fn fetch_segments(
    backend: FetchBackend,
    url: &str,
    opts: &RequestOptions,
    segments: &[Segment],
    stage: &SegmentStage,
) -> Result<BTreeMap<usize, SegmentOutcome>, DownloadError> {
    tracing::debug!(?backend, segments = segments.len(), "fetching segments");
    match backend {
        FetchBackend::Multi => multi::run_multi(url, opts, segments, stage),
        FetchBackend::Threads => Ok(threads::run_threads(url, opts, segments, stage)),
    }
}
