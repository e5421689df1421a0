use std::path::PathBuf;
use std::time::Duration;

use super::parse;
use crate::cli::download::{apply_overrides, render_report};
use segfetch_core::config::{EngineConfig, FetchBackend};
use segfetch_core::{DownloadReport, Statistics};

#[test]
fn no_flags_keep_config() {
    let cfg = EngineConfig {
        chunk_size: 4096,
        stage_segments: true,
        ..EngineConfig::default()
    };
    let cli = parse(&["segfetch", "https://example.com/x"]);
    assert_eq!(apply_overrides(&cli, cfg.clone()), cfg);
}

#[test]
fn flags_override_config() {
    let cli = parse(&[
        "segfetch",
        "https://example.com/x",
        "-d",
        "/srv/dl",
        "--chunk-size",
        "1000",
        "--max-workers",
        "3",
        "--no-range",
        "--backend",
        "threads",
    ]);
    let cfg = apply_overrides(&cli, EngineConfig::default());
    assert_eq!(cfg.download_folder, PathBuf::from("/srv/dl"));
    assert_eq!(cfg.chunk_size, 1000);
    assert_eq!(cfg.max_workers, 3);
    assert!(!cfg.enable_range_probing);
    assert_eq!(cfg.backend, FetchBackend::Threads);
    assert_eq!(cfg.method, "GET");
}

fn report() -> DownloadReport {
    let stats = Statistics {
        url: "https://example.com/x".to_string(),
        content_length: Some(250_000),
        accept_ranges: true,
        ranged: true,
        segment_count: 2,
        segment_size: 100_000,
        total_time: Duration::from_millis(40),
        slowest_segment_time: Duration::from_millis(30),
        segment_times: vec![Duration::from_millis(30), Duration::from_millis(20)],
    };
    DownloadReport {
        name: "x".to_string(),
        location: "/tmp/x".to_string(),
        stats,
    }
}

#[test]
fn render_text_report() {
    let text = render_report(&report(), false).unwrap();
    assert!(text.starts_with("Url = https://example.com/x; ContentLength = 250000;"));
    assert!(text.ends_with("Saved to /tmp/x"));
}

#[test]
fn render_json_report() {
    let text = render_report(&report(), true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["segment_count"], 2);
    assert_eq!(value["ranged"], true);
    assert_eq!(value["content_length"], 250_000);
}
