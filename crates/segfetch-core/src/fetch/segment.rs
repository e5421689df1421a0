//! Single-segment HTTP Range GET.

use std::time::{Duration, Instant};

use curl::easy::Easy2;

use crate::error::DownloadError;
use crate::planner::Segment;

use super::transfer::{new_easy, BodyHandler, BodySink, Rejection};
use super::{FetchedSegment, RequestOptions, SegmentOutcome};

/// Downloads one segment on the calling thread into `sink`.
pub fn fetch_segment(
    url: &str,
    opts: &RequestOptions,
    segment: Segment,
    sink: BodySink<'_>,
) -> SegmentOutcome {
    let easy = new_easy(url, opts, Some(&segment), sink).map_err(|source| {
        DownloadError::Transport {
            index: Some(segment.index),
            source,
        }
    })?;
    let started = Instant::now();
    let result = easy.perform();
    finish_segment(segment, easy, result, started.elapsed())
}

/// Turns a finished transfer into a segment outcome: transport or sink error,
/// wrong status or Content-Range, empty or short body, or the fetched segment.
pub(crate) fn finish_segment(
    segment: Segment,
    mut easy: Easy2<BodyHandler<'_>>,
    result: Result<(), curl::Error>,
    elapsed: Duration,
) -> SegmentOutcome {
    let index = segment.index;
    let expected = (segment.start, segment.last_byte());
    let handler = easy.get_mut();

    if let Some(source) = handler.sink_error.take() {
        let location = handler.location().unwrap_or_default().to_string();
        return Err(DownloadError::storage(location, source));
    }
    match handler.rejected {
        Some(Rejection::Status(status)) => {
            return Err(DownloadError::RangeUnsupported { index, status })
        }
        Some(Rejection::ContentRange(received)) => {
            return Err(DownloadError::ContentRangeMismatch {
                index,
                expected,
                received,
            })
        }
        None => {}
    }
    if let Err(source) = result {
        return Err(DownloadError::Transport {
            index: Some(index),
            source,
        });
    }

    let status = easy.response_code().map_err(|source| DownloadError::Transport {
        index: Some(index),
        source,
    })?;
    if status != 206 {
        return Err(DownloadError::RangeUnsupported { index, status });
    }

    let handler = easy.get_mut();
    let received = handler.received;
    if received == 0 {
        return Err(DownloadError::EmptyResult { index: Some(index) });
    }
    if handler.content_range != Some(expected) {
        return Err(DownloadError::ContentRangeMismatch {
            index,
            expected,
            received: handler.content_range,
        });
    }
    if received != segment.len() {
        return Err(DownloadError::ShortSegment {
            index,
            expected: segment.len(),
            received,
        });
    }
    let location = handler.location().map(str::to_string);
    let bytes = handler.finish().map_err(|e| {
        DownloadError::storage(location.unwrap_or_else(|| format!("segment {}", index)), e)
    })?;

    tracing::trace!(index, bytes = received, ?elapsed, "segment fetched");
    Ok(FetchedSegment {
        index,
        len: received,
        bytes,
        elapsed,
    })
}
