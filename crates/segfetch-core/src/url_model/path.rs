//! Output name extraction from a URL path.

/// Returns the last non-empty path segment of `url`.
///
/// Query and fragment never contribute. Strings that do not parse as an
/// absolute URL are split on `/` directly. Returns `None` for an empty or
/// root path, `.` and `..`.
pub fn last_path_segment(url: &str) -> Option<String> {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()?
            .filter(|s| !s.is_empty())
            .last()?
            .to_string(),
        Err(_) => {
            let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or("");
            path.rsplit('/').find(|s| !s.is_empty())?.to_string()
        }
    };
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}
