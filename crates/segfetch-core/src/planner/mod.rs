//! Chunk planning.
//!
//! Splits a resource of known length into contiguous segments of a preferred
//! size, capping the segment count at `max_workers` by growing the chunk size.
//! Whatever does not divide evenly is folded into the last segment.

mod range;

pub use range::Segment;

/// Result of planning a chunked download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub content_length: u64,
    /// Number of segments, 1..=max_workers.
    pub worker_count: usize,
    /// Bytes per segment (the last one additionally gets `remainder`).
    pub chunk_size: u64,
    /// Bytes appended to the last segment.
    pub remainder: u64,
}

/// Computes the segment count and effective chunk size.
///
/// Returns `None` when chunking does not apply: zero inputs, or a resource
/// that fits in a single preferred chunk (`content_length <= chunk_size`).
pub fn plan(content_length: u64, chunk_size: u64, max_workers: usize) -> Option<ChunkPlan> {
    if chunk_size == 0 || max_workers == 0 || content_length <= chunk_size {
        return None;
    }

    let max = max_workers as u64;
    let naive = content_length / chunk_size;
    let (worker_count, chunk_size) = if naive > max {
        (max, content_length / max)
    } else {
        (naive, chunk_size)
    };

    Some(ChunkPlan {
        content_length,
        worker_count: worker_count as usize,
        chunk_size,
        remainder: content_length - worker_count * chunk_size,
    })
}

impl ChunkPlan {
    /// The segment at `index`. The last segment ends at `content_length`.
    pub fn segment(&self, index: usize) -> Segment {
        let start = index as u64 * self.chunk_size;
        let end = if index + 1 == self.worker_count {
            self.content_length
        } else {
            start + self.chunk_size
        };
        Segment { index, start, end }
    }

    pub fn segments(&self) -> Vec<Segment> {
        (0..self.worker_count).map(|i| self.segment(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(plan: &ChunkPlan) {
        let segs = plan.segments();
        assert_eq!(segs.len(), plan.worker_count);
        assert_eq!(segs[0].start, 0);
        for pair in segs.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "segments must be contiguous");
        }
        assert_eq!(segs.last().unwrap().end, plan.content_length);
        let total: u64 = segs.iter().map(|s| s.len()).sum();
        assert_eq!(total, plan.content_length);
        assert!(segs.iter().all(|s| !s.is_empty()));
        for (i, s) in segs.iter().enumerate() {
            assert_eq!(s.index, i);
        }
    }

    #[test]
    fn remainder_folds_into_last_segment() {
        let p = plan(250_000, 100_000, 20).unwrap();
        assert_eq!(p.worker_count, 2);
        assert_eq!(p.chunk_size, 100_000);
        assert_eq!(p.remainder, 50_000);
        let segs = p.segments();
        assert_eq!((segs[0].start, segs[0].last_byte()), (0, 99_999));
        assert_eq!((segs[1].start, segs[1].last_byte()), (100_000, 249_999));
    }

    #[test]
    fn small_resource_is_not_chunked() {
        assert_eq!(plan(500, 100_000, 20), None);
        assert_eq!(plan(100_000, 100_000, 20), None);
    }

    #[test]
    fn zero_inputs_yield_no_plan() {
        assert_eq!(plan(1000, 0, 4), None);
        assert_eq!(plan(1000, 10, 0), None);
        assert_eq!(plan(0, 10, 4), None);
    }

    #[test]
    fn worker_cap_grows_chunk_size() {
        let p = plan(1_000_000, 1_000, 20).unwrap();
        assert_eq!(p.worker_count, 20);
        assert_eq!(p.chunk_size, 50_000);
        assert_eq!(p.remainder, 0);
        assert_partition(&p);
    }

    #[test]
    fn recomputed_chunk_size_keeps_trailing_bytes() {
        // 10 / 1 = 10 segments > 4, so chunk becomes 10 / 4 = 2 and 2 bytes are left.
        let p = plan(10, 1, 4).unwrap();
        assert_eq!(p.worker_count, 4);
        assert_eq!(p.chunk_size, 2);
        assert_eq!(p.remainder, 2);
        assert_eq!(p.segment(3).start, 6);
        assert_eq!(p.segment(3).end, 10);
        assert_partition(&p);
    }

    #[test]
    fn partition_and_worker_bound_hold_across_inputs() {
        for content_length in [2u64, 3, 17, 999, 1024, 65_537, 250_000, 1_000_003] {
            for chunk_size in [1u64, 2, 7, 100, 4096, 100_000] {
                for max_workers in [1usize, 2, 3, 8, 20] {
                    if content_length <= chunk_size {
                        assert!(plan(content_length, chunk_size, max_workers).is_none());
                        continue;
                    }
                    let p = plan(content_length, chunk_size, max_workers).unwrap();
                    assert!(p.worker_count >= 1);
                    assert!(p.worker_count <= max_workers);
                    assert!(p.chunk_size > 0);
                    assert_partition(&p);
                }
            }
        }
    }
}
