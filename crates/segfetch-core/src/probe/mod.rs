//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to fetch response headers and determine the
//! total size and whether the server accepts byte ranges.

mod parse;

use std::str;
use std::time::Duration;

use crate::error::DownloadError;

/// Probed metadata for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceInfo {
    /// Total size in bytes; `None` if `Content-Length` is absent or invalid.
    pub content_length: Option<u64>,
    /// True if `Accept-Ranges` is present and not `none`.
    pub accepts_ranges: bool,
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows redirects. Transport failures and non-2xx statuses are reported as
/// `DownloadError::Probe`; there is no fallback to guessing.
pub fn probe(url: &str, connect_timeout: Duration) -> Result<ResourceInfo, DownloadError> {
    let fail = |reason: String| DownloadError::Probe {
        url: url.to_string(),
        reason,
    };
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(|e| fail(format!("invalid URL: {}", e)))?;
    easy.nobody(true).map_err(|e| fail(e.to_string()))?;
    easy.follow_location(true).map_err(|e| fail(e.to_string()))?;
    easy.connect_timeout(connect_timeout)
        .map_err(|e| fail(e.to_string()))?;
    easy.timeout(Duration::from_secs(60))
        .map_err(|e| fail(e.to_string()))?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(|e| fail(e.to_string()))?;
        transfer
            .perform()
            .map_err(|e| fail(format!("HEAD request failed: {}", e)))?;
    }

    let code = easy
        .response_code()
        .map_err(|e| fail(format!("no response code: {}", e)))?;
    if !(200..300).contains(&code) {
        return Err(fail(format!("HEAD returned HTTP {}", code)));
    }

    let info = parse::parse_headers(&headers);
    tracing::debug!(
        url,
        content_length = ?info.content_length,
        accepts_ranges = info.accepts_ranges,
        "probed resource"
    );
    Ok(info)
}
