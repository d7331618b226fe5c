//! String utilities for the domain layer.

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis when anything was cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Split text into consecutive pieces of at most `max_chars` characters.
///
/// Pieces never split a UTF-8 character. Empty input yields no pieces.
/// A `max_chars` of zero is treated as one.
pub fn split_chunks(s: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in s.char_indices() {
        if count == max_chars {
            chunks.push(&s[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < s.len() {
        chunks.push(&s[start..]);
    }
    chunks
}
