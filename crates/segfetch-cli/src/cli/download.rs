//! The download command: merge flags into the config, run the engine, print stats.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use segfetch_core::{
    DownloadEngine, DownloadReport, EngineConfig, FileStorer, Progress, ProgressEvent,
    ProgressTally,
};

use super::Cli;

/// Applies command-line overrides on top of the loaded config.
pub(crate) fn apply_overrides(cli: &Cli, mut cfg: EngineConfig) -> EngineConfig {
    if let Some(dir) = &cli.dir {
        cfg.download_folder = dir.clone();
    }
    if let Some(n) = cli.chunk_size {
        cfg.chunk_size = n;
    }
    if let Some(n) = cli.max_workers {
        cfg.max_workers = n;
    }
    if let Some(method) = &cli.method {
        cfg.method = method.clone();
    }
    if cli.no_range {
        cfg.enable_range_probing = false;
    }
    if cli.stage {
        cfg.stage_segments = true;
    }
    if let Some(backend) = cli.backend {
        cfg.backend = backend.into();
    }
    cfg
}

pub(crate) fn render_report(report: &DownloadReport, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(&report.stats).context("serialize statistics");
    }
    Ok(format!("{}\nSaved to {}", report.stats, report.location))
}

/// Logs every tenth of the download at debug level.
pub(crate) fn progress_logger() -> Progress {
    let tally = ProgressTally::new();
    let logged = AtomicU64::new(0);
    Progress::new(move |event| {
        tally.record(event);
        if let ProgressEvent::Started { total } = event {
            logged.store(0, Ordering::Relaxed);
            tracing::debug!(?total, "transfer started");
            return;
        }
        let Some(fraction) = tally.fraction() else {
            return;
        };
        let tenth = (fraction * 10.0) as u64;
        if logged.fetch_max(tenth, Ordering::Relaxed) < tenth {
            tracing::debug!(
                bytes = tally.bytes_done(),
                percent = tenth * 10,
                "download progress"
            );
        }
    })
}

pub async fn run_download(cli: &Cli, cfg: EngineConfig) -> Result<()> {
    let cfg = apply_overrides(cli, cfg);
    let storer = FileStorer::new(cfg.download_folder.clone());
    let engine = DownloadEngine::new(cfg, storer).with_progress(progress_logger());

    let report = engine
        .download_async(cli.url.clone(), cli.output.clone())
        .await
        .with_context(|| format!("download {}", cli.url))?;

    println!("{}", render_report(&report, cli.json)?);
    Ok(())
}
