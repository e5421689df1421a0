//! Output name derivation.
//!
//! When the caller does not name the output, it is taken from the URL's final
//! path segment and sanitized for use as a Linux filename.

mod path;
mod sanitize;

pub use path::last_path_segment;
pub use sanitize::sanitize_filename_for_linux;

/// Name used when the URL yields nothing usable.
pub const DEFAULT_OUTPUT_NAME: &str = "download.bin";

/// Resolves the output name: `explicit` when given and non-blank, otherwise
/// derived from `url`.
///
/// # Examples
///
/// - `resolve_output_name("https://example.com/dir/file.txt", None)` → `"file.txt"`
/// - `resolve_output_name("https://example.com/", None)` → `"download.bin"`
pub fn resolve_output_name(url: &str, explicit: Option<&str>) -> String {
    let candidate = explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| last_path_segment(url));

    let Some(raw) = candidate else {
        return DEFAULT_OUTPUT_NAME.to_string();
    };

    let sanitized = sanitize_filename_for_linux(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_OUTPUT_NAME.to_string()
    } else {
        sanitized
    }
}
