//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body under any path. Every request is recorded so
//! tests can assert on what the engine actually sent. Options simulate servers
//! that block HEAD, misreport the length, disclaim or lie about range support,
//! answer ranges from the wrong offset, stall a segment, or fail one segment.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// What the server says in `Accept-Ranges`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptRanges {
    Bytes,
    None,
    Omit,
}

/// How a request for the failing range is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    /// Respond with this status and no body.
    Status(u16),
    /// Close the connection without responding.
    Hangup,
    /// 206 with an empty body.
    Empty,
}

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, HEAD returns 405.
    pub head_allowed: bool,
    /// Content-Length announced by HEAD instead of the real body length.
    pub head_length: Option<u64>,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub honor_ranges: bool,
    /// If true, every ranged GET is answered with 206 for the same length
    /// starting at offset 0.
    pub misplaced_ranges: bool,
    pub accept_ranges: AcceptRanges,
    /// Ranged GETs starting at this offset fail with `fail_mode`.
    pub fail_range_start: Option<u64>,
    pub fail_mode: FailMode,
    /// Ranged GETs starting at this offset wait this long before answering.
    pub slow_range: Option<(u64, Duration)>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            head_length: None,
            honor_ranges: true,
            misplaced_ranges: false,
            accept_ranges: AcceptRanges::Bytes,
            fail_range_start: None,
            fail_mode: FailMode::Status(500),
            slow_range: None,
        }
    }
}

/// One request as seen by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Parsed `Range: bytes=start-end` (inclusive), if sent.
    pub range: Option<(u64, u64)>,
    /// True if any `Range` header was present, parsable or not.
    pub had_range_header: bool,
}

pub struct RangeServer {
    base: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RangeServer {
    /// URL of `path` on this server (e.g. `url("dir/file.bin")`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method.eq_ignore_ascii_case(method))
            .count()
    }

    /// Ranges of all ranged GETs, sorted by start offset.
    pub fn ranged_gets(&self) -> Vec<(u64, u64)> {
        let mut ranges: Vec<(u64, u64)> = self
            .requests()
            .iter()
            .filter(|r| r.method == "GET")
            .filter_map(|r| r.range)
            .collect();
        ranges.sort();
        ranges
    }
}

/// Starts a server with default options (HEAD allowed, `Accept-Ranges: bytes`, 206 on Range).
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Starts a server in a background thread serving `body`. Runs until the process exits.
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &body, opts, &log));
        }
    });
    RangeServer {
        base: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8(data).ok().filter(|s| !s.is_empty())
}

fn accept_ranges_line(opts: &RangeServerOptions) -> &'static str {
    match opts.accept_ranges {
        AcceptRanges::Bytes => "Accept-Ranges: bytes\r\n",
        AcceptRanges::None => "Accept-Ranges: none\r\n",
        AcceptRanges::Omit => "",
    }
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    opts: RangeServerOptions,
    log: &Mutex<Vec<RecordedRequest>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let recorded = parse_request(&request);
    log.lock().unwrap().push(recorded.clone());

    let total = body.len() as u64;
    let ranges = accept_ranges_line(&opts);

    if recorded.method.eq_ignore_ascii_case("HEAD") {
        if !opts.head_allowed {
            let _ = stream
                .write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            return;
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            opts.head_length.unwrap_or(total),
            ranges
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if !recorded.method.eq_ignore_ascii_case("GET") {
        let _ = stream
            .write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let range = recorded.range.filter(|_| opts.honor_ranges);
    let Some((start, end_incl)) = range else {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            total, ranges
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(body);
        return;
    };

    if let Some((slow_start, delay)) = opts.slow_range {
        if slow_start == start {
            thread::sleep(delay);
        }
    }

    if opts.fail_range_start == Some(start) {
        match opts.fail_mode {
            FailMode::Hangup => {}
            FailMode::Status(code) => {
                let response = format!(
                    "HTTP/1.1 {} Injected Failure\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    code
                );
                let _ = stream.write_all(response.as_bytes());
            }
            FailMode::Empty => {
                let response = format!(
                    "HTTP/1.1 206 Partial Content\r\nContent-Length: 0\r\nContent-Range: bytes {}-{}/{}\r\nConnection: close\r\n\r\n",
                    start, end_incl, total
                );
                let _ = stream.write_all(response.as_bytes());
            }
        }
        return;
    }

    let end_incl = end_incl.min(total.saturating_sub(1));
    let (start, end_incl) = if opts.misplaced_ranges && start <= end_incl {
        (0, end_incl - start)
    } else {
        (start, end_incl)
    };
    if start > end_incl {
        let response = format!(
            "HTTP/1.1 416 Range Not Satisfiable\r\nContent-Range: bytes */{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            total
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    let slice = &body[start as usize..=end_incl as usize];
    let response = format!(
        "HTTP/1.1 206 Partial Content\r\nContent-Length: {}\r\nContent-Range: bytes {}-{}/{}\r\n{}Connection: close\r\n\r\n",
        slice.len(),
        start,
        end_incl,
        total,
        ranges
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(slice);
}

fn parse_request(request: &str) -> RecordedRequest {
    let mut method = String::new();
    let mut range = None;
    let mut had_range_header = false;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            method = line.split_whitespace().next().unwrap_or("").to_string();
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("range") {
            continue;
        }
        had_range_header = true;
        let value = value.trim();
        if let Some(bounds) = value.strip_prefix("bytes=") {
            if let Some((a, b)) = bounds.split_once('-') {
                let start = a.trim().parse::<u64>().unwrap_or(0);
                let end = b.trim().parse::<u64>().unwrap_or(u64::MAX);
                range = Some((start, end));
            }
        }
    }
    RecordedRequest {
        method,
        range,
        had_range_header,
    }
}
