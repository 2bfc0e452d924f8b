use regex::Regex;
use std::sync::OnceLock;

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_.]").unwrap())
}

/// Normalize a repository or branch name into a URL/filesystem-safe token.
///
/// Lower-cases the input, turns spaces and hyphens into `_`, and replaces any
/// other character outside `[a-z0-9_.]` with `_` as well.
/// Returns `None` when nothing usable remains.
pub fn normalize_name(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase().replace([' ', '-'], "_");
    let cleaned = unsafe_chars().replace_all(&lowered, "_").into_owned();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned)
    }
}
