use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Preferred bytes per segment.
pub const DEFAULT_CHUNK_SIZE: u64 = 100 * 1024;
/// Upper bound on concurrent segment requests.
pub const DEFAULT_MAX_WORKERS: usize = 20;

/// How segment transfers are driven.
///
/// Multi = one curl multi handle for all segments (shared connection pool);
/// Threads = one scoped thread with its own easy handle per segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchBackend {
    #[default]
    Multi,
    Threads,
}

/// Engine configuration, loaded from `~/.config/segfetch/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// HTTP method for the data requests (the probe is always HEAD).
    pub method: String,
    /// Preferred segment size in bytes; resources at or under it are fetched whole.
    pub chunk_size: u64,
    /// Maximum number of segments fetched at once.
    pub max_workers: usize,
    /// Folder for the output file and the staging directory. Empty = current directory.
    pub download_folder: PathBuf,
    /// Send a HEAD request first. When off, every download is a single GET.
    pub enable_range_probing: bool,
    /// Persist each segment to `<name>.download/<name>.<index>` before reassembly.
    pub stage_segments: bool,
    pub backend: FetchBackend,
    pub connect_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_workers: DEFAULT_MAX_WORKERS,
            download_folder: PathBuf::new(),
            enable_range_probing: true,
            stage_segments: false,
            backend: FetchBackend::default(),
            connect_timeout_secs: 30,
        }
    }
}

/// Builds a config from the five caller-facing knobs; everything else defaults.
pub fn configure(
    method: &str,
    chunk_size: u64,
    max_workers: usize,
    download_folder: impl Into<PathBuf>,
    enable_range_probing: bool,
) -> EngineConfig {
    EngineConfig {
        method: method.to_string(),
        chunk_size,
        max_workers,
        download_folder: download_folder.into(),
        enable_range_probing,
        ..EngineConfig::default()
    }
}

impl EngineConfig {
    /// Zero chunk size falls back to the default; `max_workers` is at least 1;
    /// an empty method means GET.
    pub fn normalized(mut self) -> Self {
        if self.chunk_size == 0 {
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        self.max_workers = self.max_workers.max(1);
        if self.method.trim().is_empty() {
            self.method = "GET".to_string();
        }
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("segfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<EngineConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = EngineConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: EngineConfig = toml::from_str(&data)?;
    Ok(cfg)
}
