//! Easy2 handler and request setup shared by every GET the engine issues.
//! Validates 206 and Content-Range before accepting a ranged body, then
//! streams each chunk into the transfer's sink.

use std::io::{self, Write};
use std::str;
use std::time::Duration;

use curl::easy::{Easy2, Handler, WriteError};

use crate::planner::Segment;
use crate::progress::{Progress, ProgressEvent};

use super::RequestOptions;

/// Upper bound on the buffer reserved up front for an in-memory body.
const MAX_PREALLOC: u64 = 1 << 20;

/// Initial capacity for an in-memory body of `len` advertised bytes. The
/// length comes from the server, so it is only a hint.
pub(crate) fn capacity_hint(len: u64) -> usize {
    usize::try_from(len.min(MAX_PREALLOC)).unwrap_or(0)
}

/// Where the accepted body bytes of one transfer go.
pub enum BodySink<'a> {
    /// Kept in memory and handed back when the transfer finishes.
    Memory(Vec<u8>),
    /// Written through as each chunk arrives. `location` names the target in errors.
    Stream {
        out: Box<dyn Write + Send + 'a>,
        location: String,
    },
}

impl BodySink<'_> {
    /// Empty in-memory sink sized for `len` advertised bytes.
    pub fn memory(len: u64) -> Self {
        BodySink::Memory(Vec::with_capacity(capacity_hint(len)))
    }
}

/// Why a ranged body was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    /// Status other than 206.
    Status(u32),
    /// 206 for a different (or unstated) range.
    ContentRange(Option<(u64, u64)>),
}

/// Body handler for one transfer. For ranged requests the first body chunk is
/// refused (aborting the transfer) unless the response is a 206 whose
/// Content-Range is exactly the requested range.
pub(crate) struct BodyHandler<'a> {
    /// Segment index, for progress events.
    index: Option<usize>,
    /// Requested range, inclusive; `None` for a whole fetch.
    expected: Option<(u64, u64)>,
    /// Status of the most recent response (redirects reset it).
    pub(crate) status: Option<u32>,
    pub(crate) content_range: Option<(u64, u64)>,
    /// None = not yet checked; Some(true) = accepted.
    range_ok: Option<bool>,
    pub(crate) rejected: Option<Rejection>,
    sink: BodySink<'a>,
    pub(crate) received: u64,
    /// Set when the sink failed; the transfer was aborted because of it.
    pub(crate) sink_error: Option<io::Error>,
    progress: Option<Progress>,
}

impl<'a> BodyHandler<'a> {
    pub(crate) fn whole(sink: BodySink<'a>, progress: Option<Progress>) -> Self {
        Self::new(None, None, sink, progress)
    }

    pub(crate) fn ranged(segment: &Segment, sink: BodySink<'a>, progress: Option<Progress>) -> Self {
        Self::new(
            Some(segment.index),
            Some((segment.start, segment.last_byte())),
            sink,
            progress,
        )
    }

    fn new(
        index: Option<usize>,
        expected: Option<(u64, u64)>,
        sink: BodySink<'a>,
        progress: Option<Progress>,
    ) -> Self {
        Self {
            index,
            expected,
            status: None,
            content_range: None,
            range_ok: None,
            rejected: None,
            sink,
            received: 0,
            sink_error: None,
            progress,
        }
    }

    /// Where streamed bytes went, if the sink is not in memory.
    pub(crate) fn location(&self) -> Option<&str> {
        match &self.sink {
            BodySink::Memory(_) => None,
            BodySink::Stream { location, .. } => Some(location),
        }
    }

    /// Flushes a streaming sink and returns the in-memory body, if any.
    pub(crate) fn finish(&mut self) -> io::Result<Option<Vec<u8>>> {
        match std::mem::replace(&mut self.sink, BodySink::Memory(Vec::new())) {
            BodySink::Memory(body) => Ok(Some(body)),
            BodySink::Stream { mut out, .. } => out.flush().map(|()| None),
        }
    }

    fn check_range(&mut self) -> bool {
        let Some(expected) = self.expected else {
            return true;
        };
        if self.range_ok.is_none() {
            self.rejected = if self.status != Some(206) {
                Some(Rejection::Status(self.status.unwrap_or(0)))
            } else if self.content_range != Some(expected) {
                Some(Rejection::ContentRange(self.content_range))
            } else {
                None
            };
            self.range_ok = Some(self.rejected.is_none());
        }
        self.range_ok == Some(true)
    }
}

pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    let line = line.trim();
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

/// Parses a `Content-Range: bytes start-end/total` header line into `(start, end)`.
pub(crate) fn parse_content_range(line: &str) -> Option<(u64, u64)> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-range") {
        return None;
    }
    let bounds = value.trim().strip_prefix("bytes")?.trim_start();
    let (range, _total) = bounds.split_once('/')?;
    let (start, end) = range.split_once('-')?;
    let start = start.trim().parse().ok()?;
    let end = end.trim().parse().ok()?;
    (start <= end).then_some((start, end))
}

impl Handler for BodyHandler<'_> {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            if let Some(code) = parse_status_line(s) {
                self.status = Some(code);
                self.content_range = None;
            } else if let Some(range) = parse_content_range(s) {
                self.content_range = Some(range);
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        if !self.check_range() {
            return Ok(0);
        }
        match &mut self.sink {
            BodySink::Memory(body) => body.extend_from_slice(data),
            BodySink::Stream { out, .. } => {
                if let Err(e) = out.write_all(data) {
                    self.sink_error = Some(e);
                    return Ok(0);
                }
            }
        }
        let n = data.len();
        self.received += n as u64;
        if let Some(progress) = &self.progress {
            progress.emit(ProgressEvent::Received {
                index: self.index,
                bytes: n as u64,
            });
        }
        Ok(n)
    }
}

/// Builds a GET (or `opts.method`) handle for `url`, optionally restricted to `segment`.
pub(crate) fn new_easy<'a>(
    url: &str,
    opts: &RequestOptions,
    segment: Option<&Segment>,
    sink: BodySink<'a>,
) -> Result<Easy2<BodyHandler<'a>>, curl::Error> {
    let progress = opts.progress.clone();
    let handler = match segment {
        Some(s) => BodyHandler::ranged(s, sink, progress),
        None => BodyHandler::whole(sink, progress),
    };
    let mut easy = Easy2::new(handler);
    easy.url(url)?;
    if !opts.method.eq_ignore_ascii_case("GET") {
        easy.custom_request(&opts.method)?;
    }
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    // Abort if throughput stays under 1 KiB/s for a minute.
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    if let Some(s) = segment {
        // curl expects "start-end" (inclusive), not "bytes=start-end".
        easy.range(&s.curl_range())?;
    }
    Ok(easy)
}
