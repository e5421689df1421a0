//! Segmented HTTP download engine.
//!
//! Splits a large remote object into byte-range segments, fetches them
//! concurrently with libcurl, and reassembles them in order into a storer.
//! Resources without range support, of unknown length, or no larger than one
//! chunk are fetched with a single GET.

pub mod config;
pub mod logging;

pub mod engine;
pub mod error;
pub mod fetch;
pub mod planner;
pub mod probe;
pub mod progress;
pub mod reassembly;
pub mod stage;
pub mod storage;
pub mod url_model;

pub use config::{configure, EngineConfig, FetchBackend};
pub use engine::{download, DownloadEngine, DownloadReport, EngineState, Statistics};
pub use error::{DownloadError, ErrorKind};
pub use progress::{Progress, ProgressEvent, ProgressTally};
pub use storage::{FileStorer, MemoryStorer, Storer};
