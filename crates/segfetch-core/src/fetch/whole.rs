//! Single-stream HTTP GET (non-Range fallback).

use crate::error::DownloadError;

use super::transfer::{new_easy, BodySink};
use super::RequestOptions;

/// Outcome of a whole fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WholeBody {
    /// Bytes received.
    pub len: u64,
    /// The body for an in-memory sink; `None` when it was streamed.
    pub bytes: Option<Vec<u8>>,
}

/// Downloads `url` with one request and no `Range` header into `sink`.
pub fn fetch_whole(
    url: &str,
    opts: &RequestOptions,
    sink: BodySink<'_>,
) -> Result<WholeBody, DownloadError> {
    let transport = |source| DownloadError::Transport {
        index: None,
        source,
    };
    let mut easy = new_easy(url, opts, None, sink).map_err(transport)?;
    let result = easy.perform();

    let handler = easy.get_mut();
    let location = handler.location().unwrap_or_default().to_string();
    if let Some(source) = handler.sink_error.take() {
        return Err(DownloadError::storage(location, source));
    }
    result.map_err(transport)?;

    let status = easy.response_code().map_err(transport)?;
    if !(200..300).contains(&status) {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status,
        });
    }

    let handler = easy.get_mut();
    let len = handler.received;
    let bytes = handler
        .finish()
        .map_err(|e| DownloadError::storage(location, e))?;
    Ok(WholeBody { len, bytes })
}
