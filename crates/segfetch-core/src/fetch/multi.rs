//! Curl multi backend: one event loop, one connection pool, all segments in flight.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use curl::multi::{Easy2Handle, Multi};

use crate::error::DownloadError;
use crate::planner::Segment;
use crate::stage::SegmentStage;

use super::segment::finish_segment;
use super::transfer::{new_easy, BodyHandler};
use super::{RequestOptions, SegmentOutcome};

type Active = (Easy2Handle<BodyHandler<'static>>, Segment, Instant);

/// Adds an Easy2 handle per segment to a single multi handle and drives
/// perform/messages/wait until every transfer has completed.
pub(super) fn run_multi(
    url: &str,
    opts: &RequestOptions,
    segments: &[Segment],
    stage: &SegmentStage,
) -> Result<BTreeMap<usize, SegmentOutcome>, DownloadError> {
    let multi = Multi::new();
    let mut outcomes = BTreeMap::new();
    let mut active: Vec<Active> = Vec::with_capacity(segments.len());

    for &segment in segments {
        let easy = stage.sink(&segment).and_then(|sink| {
            new_easy(url, opts, Some(&segment), sink).map_err(|source| DownloadError::Transport {
                index: Some(segment.index),
                source,
            })
        });
        match easy {
            Ok(easy) => active.push((multi.add2(easy)?, segment, Instant::now())),
            Err(e) => {
                outcomes.insert(segment.index, Err(e));
            }
        }
    }

    while !active.is_empty() {
        let running = multi.perform()?;

        let mut done: Vec<(usize, Result<(), curl::Error>)> = Vec::new();
        multi.messages(|msg| {
            for (i, (handle, ..)) in active.iter().enumerate() {
                if let Some(result) = msg.result_for2(handle) {
                    done.push((i, result));
                    break;
                }
            }
        });

        if done.is_empty() && running == 0 {
            // libcurl reports nothing left to drive but some handles never completed.
            for (handle, segment, _) in active.drain(..) {
                let _ = multi.remove2(handle);
                outcomes.insert(
                    segment.index,
                    Err(DownloadError::MissingSegment {
                        index: segment.index,
                    }),
                );
            }
            break;
        }

        // Remove from the back so earlier positions stay valid.
        done.sort_by(|a, b| b.0.cmp(&a.0));
        for (i, result) in done {
            let (handle, segment, started) = active.remove(i);
            let easy = multi.remove2(handle)?;
            let outcome = finish_segment(segment, easy, result, started.elapsed());
            outcomes.insert(segment.index, outcome);
        }

        if running > 0 {
            multi.wait(&mut [], Duration::from_millis(100))?;
        }
    }

    Ok(outcomes)
}
