//! Parse HTTP response header lines into ResourceInfo.

use super::ResourceInfo;

/// Parse collected header lines into ResourceInfo.
///
/// When redirects were followed the lines of every response are present; only
/// the block after the last status line counts.
pub(crate) fn parse_headers(lines: &[String]) -> ResourceInfo {
    let start = lines
        .iter()
        .rposition(|l| l.trim_start().starts_with("HTTP/"))
        .unwrap_or(0);

    let mut content_length = None;
    let mut advertised = false;
    let mut disclaimed = false;

    for line in &lines[start..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse::<u64>().ok();
            }
            if name.eq_ignore_ascii_case("accept-ranges") {
                advertised = true;
                if value.eq_ignore_ascii_case("none") {
                    disclaimed = true;
                }
            }
        }
    }

    ResourceInfo {
        content_length,
        accepts_ranges: advertised && !disclaimed,
    }
}
