//! Download engine.
//!
//! Probes the resource, decides between one whole GET and a chunked fetch,
//! runs every segment concurrently, and writes the reassembled bytes to the
//! final storer in index order. Any failure leaves the final storer untouched:
//! output is written under a `.part` name and renamed into place only after
//! every byte is there.

mod state;
mod stats;

pub use state::EngineState;
pub use stats::Statistics;

use std::io::BufWriter;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::error::DownloadError;
use crate::fetch::{self, BodySink, RequestOptions};
use crate::planner::{self, ChunkPlan};
use crate::probe::{self, ResourceInfo};
use crate::progress::{Progress, ProgressEvent};
use crate::reassembly::Reassembler;
use crate::stage::SegmentStage;
use crate::storage::{self, AppendWriter, FileStorer, Storer};
use crate::url_model::resolve_output_name;

use state::StateTracker;

/// Chunk size used when streaming a whole-resource body into the storer.
const STORE_CHUNK: usize = 64 * 1024;

/// Outcome of a successful download.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    /// Resolved output name (caller-supplied or derived from the URL).
    pub name: String,
    /// Where the storer put it, e.g. the file path.
    pub location: String,
    pub stats: Statistics,
}

/// Segmented download engine bound to one final storer.
#[derive(Debug, Clone)]
pub struct DownloadEngine<S> {
    config: EngineConfig,
    storer: S,
    progress: Option<Progress>,
}

/// One `download` call: what to fetch, where it lands, and how to ask for it.
struct Job<'a> {
    url: &'a str,
    name: &'a str,
    opts: RequestOptions,
}

/// Downloads `url` into a file under `config.download_folder`.
pub fn download(
    config: &EngineConfig,
    url: &str,
    output_name: Option<&str>,
) -> Result<DownloadReport, DownloadError> {
    let storer = FileStorer::new(config.download_folder.clone());
    DownloadEngine::new(config.clone(), storer).download(url, output_name)
}

impl<S: Storer> DownloadEngine<S> {
    pub fn new(config: EngineConfig, storer: S) -> Self {
        Self {
            config: config.normalized(),
            storer,
            progress: None,
        }
    }

    /// Reports the probed size and every accepted body chunk to `progress`.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn storer(&self) -> &S {
        &self.storer
    }

    /// Downloads `url` into the storer under `output_name` (or a name derived
    /// from the URL) and returns the resolved name with statistics.
    pub fn download(
        &self,
        url: &str,
        output_name: Option<&str>,
    ) -> Result<DownloadReport, DownloadError> {
        let started = Instant::now();
        let name = resolve_output_name(url, output_name);
        let mut state = StateTracker::new();
        let job = Job {
            url,
            name: &name,
            opts: RequestOptions {
                progress: self.progress.clone(),
                ..RequestOptions::from(&self.config)
            },
        };

        match self.run(&job, &mut state) {
            Ok(mut stats) => {
                stats.total_time = started.elapsed();
                state.advance(EngineState::Done);
                tracing::info!(
                    url,
                    name = %name,
                    ranged = stats.ranged,
                    segments = stats.segment_count,
                    elapsed = ?stats.total_time,
                    "download complete"
                );
                Ok(DownloadReport {
                    location: self.storer.location(&name),
                    name,
                    stats,
                })
            }
            Err(e) => {
                state.advance(EngineState::Errored);
                Err(e)
            }
        }
    }

    fn run(&self, job: &Job<'_>, state: &mut StateTracker) -> Result<Statistics, DownloadError> {
        let mut stats = Statistics::new(job.url);

        let info = if self.config.enable_range_probing {
            state.advance(EngineState::Probing);
            probe::probe(job.url, self.config.connect_timeout())?
        } else {
            ResourceInfo::default()
        };
        stats.content_length = info.content_length;
        stats.accept_ranges = info.accepts_ranges;
        if let Some(progress) = &self.progress {
            progress.emit(ProgressEvent::Started {
                total: info.content_length,
            });
        }

        match self.chunk_plan(&info) {
            Some(plan) => {
                state.advance(EngineState::ChunkedFetch);
                stats.ranged = true;
                self.fetch_chunked(job, plan, &mut stats, state)?;
            }
            None => {
                state.advance(EngineState::WholeFetch);
                self.fetch_whole(job, &info, &mut stats, state)?;
            }
        }
        Ok(stats)
    }

    /// Chunked iff ranges are accepted and the length exceeds one chunk.
    fn chunk_plan(&self, info: &ResourceInfo) -> Option<ChunkPlan> {
        if !info.accepts_ranges {
            return None;
        }
        planner::plan(
            info.content_length?,
            self.config.chunk_size,
            self.config.max_workers,
        )
    }

    /// Streams the body straight into `<name>.part`, then renames it.
    fn fetch_whole(
        &self,
        job: &Job<'_>,
        info: &ResourceInfo,
        stats: &mut Statistics,
        state: &mut StateTracker,
    ) -> Result<(), DownloadError> {
        let started = Instant::now();
        let mut received = 0;
        self.write_target(job.name, |temp| {
            let sink = BodySink::Stream {
                out: Box::new(BufWriter::with_capacity(
                    STORE_CHUNK,
                    AppendWriter::new(&self.storer, temp),
                )),
                location: self.storer.location(temp),
            };
            let body = fetch::fetch_whole(job.url, &job.opts, sink)?;
            check_whole_length(info.content_length, body.len)?;
            received = body.len;
            state.advance(EngineState::Reassembling);
            state.advance(EngineState::Storing);
            Ok(())
        })?;

        stats.segment_count = 1;
        stats.segment_size = received;
        stats.record_segment(started.elapsed());
        Ok(())
    }

    fn fetch_chunked(
        &self,
        job: &Job<'_>,
        plan: ChunkPlan,
        stats: &mut Statistics,
        state: &mut StateTracker,
    ) -> Result<(), DownloadError> {
        stats.segment_count = plan.worker_count;
        stats.segment_size = plan.chunk_size;
        tracing::debug!(
            workers = plan.worker_count,
            chunk_size = plan.chunk_size,
            remainder = plan.remainder,
            "chunk plan"
        );

        let stage = SegmentStage::new(
            self.config.stage_segments,
            &self.config.download_folder,
            job.name,
        );
        let result = self.fetch_and_merge(job, &plan, &stage, stats, state);
        let cleaned = stage.cleanup();
        result?;
        cleaned
    }

    fn fetch_and_merge(
        &self,
        job: &Job<'_>,
        plan: &ChunkPlan,
        stage: &SegmentStage,
        stats: &mut Statistics,
        state: &mut StateTracker,
    ) -> Result<(), DownloadError> {
        let segments = plan.segments();
        let outcomes =
            fetch::fetch_segments(self.config.backend, job.url, &job.opts, &segments, stage)?;

        // Ascending index order, so the reported failure is the lowest failing segment.
        let mut reassembler = Reassembler::new(plan.worker_count);
        for (index, outcome) in outcomes {
            let fetched = outcome?;
            stats.record_segment(fetched.elapsed);
            reassembler.insert(index, fetched);
        }

        state.advance(EngineState::Reassembling);
        let ordered = reassembler.into_ordered()?;

        state.advance(EngineState::Storing);
        let parts = ordered.into_iter().map(|mut fetched| stage.take(&mut fetched));
        self.store(job.name, parts)
    }

    /// Writes `parts` in order to `<name>.part`, then renames it to `name`.
    fn store<I>(&self, name: &str, parts: I) -> Result<(), DownloadError>
    where
        I: IntoIterator<Item = Result<Vec<u8>, DownloadError>>,
    {
        self.write_target(name, |temp| {
            for part in parts {
                let bytes = part?;
                self.storer
                    .append(temp, &bytes)
                    .map_err(|e| DownloadError::storage(self.storer.location(temp), e))?;
            }
            Ok(())
        })
    }

    /// Runs `write` against a fresh `<name>.part` and renames it to `name` on
    /// success. On failure the temporary target is removed and `name` is left
    /// as it was.
    fn write_target<F>(&self, name: &str, write: F) -> Result<(), DownloadError>
    where
        F: FnOnce(&str) -> Result<(), DownloadError>,
    {
        let temp = storage::temp_name(name);
        let storage_err = |target: &str, e| DownloadError::storage(self.storer.location(target), e);

        let result = self
            .storer
            .remove(&temp)
            .map_err(|e| storage_err(&temp, e))
            .and_then(|()| write(&temp))
            .and_then(|()| self.storer.rename(&temp, name).map_err(|e| storage_err(name, e)));
        if result.is_err() {
            let _ = self.storer.remove(&temp);
        }
        result
    }
}

/// An empty body is only valid for a resource probed as empty; a probed
/// length must match what arrived.
fn check_whole_length(probed: Option<u64>, received: u64) -> Result<(), DownloadError> {
    match probed {
        Some(expected) if expected != received => {
            if received == 0 {
                Err(DownloadError::EmptyResult { index: None })
            } else {
                Err(DownloadError::LengthMismatch { expected, received })
            }
        }
        None if received == 0 => Err(DownloadError::EmptyResult { index: None }),
        _ => Ok(()),
    }
}

impl<S: Storer + Clone + 'static> DownloadEngine<S> {
    /// Runs `download` on tokio's blocking pool, for async callers.
    pub async fn download_async(
        &self,
        url: String,
        output_name: Option<String>,
    ) -> Result<DownloadReport, DownloadError> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.download(&url, output_name.as_deref())).await?
    }
}
