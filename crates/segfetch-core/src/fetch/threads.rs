//! One scoped thread per segment, each with its own easy handle.

use std::collections::BTreeMap;

use crate::error::DownloadError;
use crate::planner::Segment;
use crate::stage::SegmentStage;

use super::segment::fetch_segment;
use super::{RequestOptions, SegmentOutcome};

/// Spawns every segment at once and joins them all before returning.
pub(super) fn run_threads(
    url: &str,
    opts: &RequestOptions,
    segments: &[Segment],
    stage: &SegmentStage,
) -> BTreeMap<usize, SegmentOutcome> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = segments
            .iter()
            .map(|&segment| {
                let handle = scope.spawn(move || {
                    let sink = stage.sink(&segment)?;
                    fetch_segment(url, opts, segment, sink)
                });
                (segment.index, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(index, handle)| {
                let outcome = handle
                    .join()
                    .unwrap_or_else(|_| Err(DownloadError::Join { index }));
                (index, outcome)
            })
            .collect()
    })
}
