//! Case-insensitive matching helpers shared by the search adapters.

/// Unicode-aware, case-insensitive substring test.
///
/// `needle_lower` must already be lowercased with [`str::to_lowercase`].
pub fn contains_case_insensitive(haystack: &str, needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(needle_lower)
}

/// Escape `LIKE` wildcards so the needle is matched literally with `ESCAPE '\'`.
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
