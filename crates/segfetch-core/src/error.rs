//! Download error type.
//!
//! Every failure in the pipeline is fatal for the invocation and surfaces to the
//! caller of `download`; nothing is retried. `DownloadError::kind` groups the
//! variants so callers can decide, e.g., to re-run with range probing disabled
//! after a `RangeUnsupported` failure.

use std::fmt;

/// Coarse error category for a failed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Metadata request failed or returned a non-success status.
    Probe,
    /// A request failed at the network layer (or the whole GET was rejected).
    Transport,
    /// A ranged GET did not come back as 206 Partial Content.
    RangeUnsupported,
    /// The sink could not be created, written or read back.
    Storage,
    /// A segment or whole body was empty (or short) when bytes were expected.
    EmptyResult,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Probe => "probe",
            ErrorKind::Transport => "transport",
            ErrorKind::RangeUnsupported => "range unsupported",
            ErrorKind::Storage => "storage",
            ErrorKind::EmptyResult => "empty result",
        };
        f.write_str(s)
    }
}

/// Error returned by the download engine and its components.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("probe {url} failed: {reason}")]
    Probe { url: String, reason: String },

    #[error("{}transport failure: {source}", segment_prefix(*index))]
    Transport {
        index: Option<usize>,
        #[source]
        source: curl::Error,
    },

    #[error("curl multi handle: {0}")]
    Multi(#[from] curl::MultiError),

    #[error("GET {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u32 },

    #[error("segment {index}: server answered a range request with HTTP {status}")]
    RangeUnsupported { index: usize, status: u32 },

    #[error(
        "segment {index}: expected Content-Range bytes {}-{}, got {}",
        expected.0,
        expected.1,
        describe_range(*received)
    )]
    ContentRangeMismatch {
        index: usize,
        /// Requested range, inclusive.
        expected: (u64, u64),
        received: Option<(u64, u64)>,
    },

    #[error("storage {name}: {source}")]
    Storage {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}empty response body", segment_prefix(*index))]
    EmptyResult { index: Option<usize> },

    #[error("segment {index}: partial transfer: expected {expected} bytes, got {received}")]
    ShortSegment {
        index: usize,
        expected: u64,
        received: u64,
    },

    #[error("body length {received} does not match probed length {expected}")]
    LengthMismatch { expected: u64, received: u64 },

    #[error("segment {index}: worker thread panicked")]
    Join { index: usize },

    #[error("no segment result for index {index}")]
    MissingSegment { index: usize },

    #[error("download task: {0}")]
    Task(#[from] tokio::task::JoinError),
}

fn segment_prefix(index: Option<usize>) -> String {
    match index {
        Some(i) => format!("segment {}: ", i),
        None => String::new(),
    }
}

fn describe_range(range: Option<(u64, u64)>) -> String {
    match range {
        Some((start, end)) => format!("bytes {}-{}", start, end),
        None => "none".to_string(),
    }
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DownloadError::Probe { .. } => ErrorKind::Probe,
            DownloadError::Transport { .. }
            | DownloadError::Multi(_)
            | DownloadError::HttpStatus { .. }
            | DownloadError::Join { .. }
            | DownloadError::Task(_) => ErrorKind::Transport,
            DownloadError::RangeUnsupported { .. } | DownloadError::ContentRangeMismatch { .. } => {
                ErrorKind::RangeUnsupported
            }
            DownloadError::Storage { .. } => ErrorKind::Storage,
            DownloadError::EmptyResult { .. }
            | DownloadError::ShortSegment { .. }
            | DownloadError::LengthMismatch { .. }
            | DownloadError::MissingSegment { .. } => ErrorKind::EmptyResult,
        }
    }

    pub(crate) fn storage(name: impl Into<String>, source: std::io::Error) -> Self {
        DownloadError::Storage {
            name: name.into(),
            source,
        }
    }

    /// Index of the segment this error belongs to, if any.
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            DownloadError::Transport { index, .. } | DownloadError::EmptyResult { index } => *index,
            DownloadError::RangeUnsupported { index, .. }
            | DownloadError::ContentRangeMismatch { index, .. }
            | DownloadError::ShortSegment { index, .. }
            | DownloadError::Join { index }
            | DownloadError::MissingSegment { index } => Some(*index),
            _ => None,
        }
    }
}
