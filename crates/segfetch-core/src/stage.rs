//! Per-segment staging.
//!
//! With staging enabled each transfer streams its body to
//! `<folder>/<name>.download/<name>.<index>` as the bytes arrive and keeps
//! only the length in memory. Reassembly reads the files back in index order;
//! the directory is removed afterwards whether the download succeeded or not.

use std::path::Path;

use crate::error::DownloadError;
use crate::fetch::{BodySink, FetchedSegment};
use crate::planner::Segment;
use crate::storage::{FileStorer, Storer};

/// Suffix of the staging directory next to the output file.
pub const STAGE_DIR_SUFFIX: &str = ".download";

/// Where fetched segment bytes live until reassembly. Shared by all workers.
#[derive(Debug, Clone)]
pub enum SegmentStage {
    InMemory,
    Disk(StagedSegments),
}

impl SegmentStage {
    /// Staging for output `name` under `folder`, or in-memory when `enabled` is false.
    pub fn new(enabled: bool, folder: &Path, name: &str) -> Self {
        if enabled {
            SegmentStage::Disk(StagedSegments::new(folder, name))
        } else {
            SegmentStage::InMemory
        }
    }

    /// Sink for `segment`'s body: a fresh staged file, or a memory buffer.
    pub fn sink(&self, segment: &Segment) -> Result<BodySink<'static>, DownloadError> {
        match self {
            SegmentStage::Disk(staged) => staged.create(segment.index),
            SegmentStage::InMemory => Ok(BodySink::memory(segment.len())),
        }
    }

    /// The segment's bytes, from memory or from its staged file.
    pub fn take(&self, segment: &mut FetchedSegment) -> Result<Vec<u8>, DownloadError> {
        match (segment.bytes.take(), self) {
            (Some(bytes), _) => Ok(bytes),
            (None, SegmentStage::Disk(staged)) => staged.read(segment.index),
            (None, SegmentStage::InMemory) => Err(DownloadError::MissingSegment {
                index: segment.index,
            }),
        }
    }

    /// Removes anything staged on disk.
    pub fn cleanup(&self) -> Result<(), DownloadError> {
        match self {
            SegmentStage::Disk(staged) => staged.cleanup(),
            SegmentStage::InMemory => Ok(()),
        }
    }
}

/// Staged segment files for one output name.
#[derive(Debug, Clone)]
pub struct StagedSegments {
    storer: FileStorer,
    name: String,
}

impl StagedSegments {
    pub fn new(folder: &Path, name: &str) -> Self {
        Self {
            storer: FileStorer::new(folder.join(format!("{}{}", name, STAGE_DIR_SUFFIX))),
            name: name.to_string(),
        }
    }

    pub fn part_name(&self, index: usize) -> String {
        format!("{}.{}", self.name, index)
    }

    fn create(&self, index: usize) -> Result<BodySink<'static>, DownloadError> {
        let part = self.part_name(index);
        let location = self.storer.location(&part);
        match self.storer.create(&part) {
            Ok(file) => Ok(BodySink::Stream {
                out: Box::new(file),
                location,
            }),
            Err(e) => Err(DownloadError::storage(location, e)),
        }
    }

    fn read(&self, index: usize) -> Result<Vec<u8>, DownloadError> {
        let part = self.part_name(index);
        self.storer
            .get(&part)
            .map_err(|e| DownloadError::storage(self.storer.location(&part), e))
    }

    fn cleanup(&self) -> Result<(), DownloadError> {
        self.storer
            .remove_folder()
            .map_err(|e| DownloadError::storage(self.storer.folder().display().to_string(), e))
    }
}
