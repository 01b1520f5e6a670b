// src/utils/text.rs

//! Text clean-up helpers.

use unicode_segmentation::UnicodeSegmentation;

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace inside each line and drop blank lines.
pub fn collapse_lines(s: &str) -> String {
    s.lines()
        .map(normalize_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut `s` to at most `max` grapheme clusters.
///
/// Counts user-perceived characters so Hangul and emoji are never split.
pub fn truncate_graphemes(s: &str, max: usize) -> String {
    match s.grapheme_indices(true).nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
