//! Message display wrapping.
//!
//! Chat bodies have no whitespace guarantees (single 100-char words are
//! legal), so the view breaks lines at a fixed character count.

use salon_shared::constants::WRAP_CHARS_PER_LINE;

/// Split `text` into lines of at most `chars_per_line` characters.
/// Character-based, so multi-byte text wraps at the same visual density.
pub fn insert_line_breaks(text: &str, chars_per_line: usize) -> Vec<String> {
    if chars_per_line == 0 || text.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chars_per_line)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Wrap with the feed's default line width.
pub fn wrap_message(text: &str) -> Vec<String> {
    insert_line_breaks(text, WRAP_CHARS_PER_LINE)
}
