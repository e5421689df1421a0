//! Filename sanitization for output names.

/// Linux NAME_MAX, in bytes.
const NAME_MAX: usize = 255;

/// Makes `name` safe to use as a single Linux path component.
///
/// Separators, NUL, whitespace and control characters become `_` (runs of
/// them collapse to one), leading/trailing dots and underscores are dropped so
/// the result can neither climb out of the folder nor be hidden, and the
/// result is cut to NAME_MAX bytes on a char boundary.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let unsafe_char = matches!(c, '/' | '\\' | '\0') || c.is_control() || c.is_whitespace();
        if !unsafe_char {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }

    let trimmed = out.trim_matches(|c: char| c == '.' || c == '_');
    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
