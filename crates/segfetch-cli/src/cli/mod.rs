//! CLI for the segfetch segmented downloader.

mod download;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use segfetch_core::config::{self, FetchBackend};
use std::path::PathBuf;

pub use download::run_download;

/// Top-level CLI: download one URL, chunked when the server allows it.
#[derive(Debug, Parser)]
#[command(name = "segfetch")]
#[command(about = "segfetch: segmented HTTP downloader", long_about = None)]
pub struct Cli {
    /// Direct HTTP/HTTPS URL to download.
    pub url: String,

    /// Output file name (default: last path segment of the URL).
    #[arg(short = 'o', long = "output", value_name = "NAME")]
    pub output: Option<String>,

    /// Folder to write into (overrides `download_folder` from the config).
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Preferred bytes per segment.
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<u64>,

    /// Maximum number of segments fetched at once.
    #[arg(long, value_name = "N")]
    pub max_workers: Option<usize>,

    /// HTTP method for the data requests.
    #[arg(long, value_name = "M")]
    pub method: Option<String>,

    /// Skip the HEAD probe and fetch with a single GET.
    #[arg(long)]
    pub no_range: bool,

    /// Stage each segment on disk before reassembly.
    #[arg(long)]
    pub stage: bool,

    /// Transfer backend for segments.
    #[arg(long, value_enum, value_name = "B")]
    pub backend: Option<BackendArg>,

    /// Print statistics as JSON instead of a single line.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// One curl multi handle for all segments.
    Multi,
    /// One thread per segment.
    Threads,
}

impl From<BackendArg> for FetchBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Multi => FetchBackend::Multi,
            BackendArg::Threads => FetchBackend::Threads,
        }
    }
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        run_download(&cli, cfg).await
    }
}

#[cfg(test)]
mod tests;
