//! Label sanitization and word-boundary-aware truncation.
//!
//! Labels come from free text. Before they are placed in a mindmap line, characters that the
//! mindmap syntax treats as node delimiters are removed and whitespace is flattened so a label can
//! never open a shape, start a comment, start a new line, or break indentation.

use regex::Regex;
use std::sync::OnceLock;

/// Marker appended to truncated labels.
pub const ELLIPSIS: &str = "...";

/// A truncation may back off to the last space only if that keeps at least this percentage of
/// the limit.
pub const WORD_BOUNDARY_PERCENT: usize = 60;

fn pictographic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Pictographs plus the joiners/selectors/modifiers that glue emoji sequences together.
        Regex::new(
            r"[\p{Extended_Pictographic}\u{200D}\u{20E3}\u{FE0E}\u{FE0F}\u{1F1E6}-\u{1F1FF}\u{1F3FB}-\u{1F3FF}]",
        )
        .expect("valid regex")
    })
}

/// `%%` starts a comment in mindmap text.
fn comment_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%{2,}").expect("valid regex"))
}

fn is_structural(ch: char) -> bool {
    matches!(ch, '[' | ']' | '(' | ')' | '{' | '}' | '<' | '>' | '|' | '`')
}

fn straighten_quote(ch: char) -> char {
    match ch {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
        other => other,
    }
}

/// Makes arbitrary label text safe to embed as a single mindmap node line.
///
/// Removes delimiter characters (`[]`, `()`, `{}`, `<>`, `|`) and backticks, straightens curly
/// quotes, drops emoji, collapses every whitespace run (newlines and tabs included) into a
/// single space and shortens `%%` runs to a single `%`.
pub fn sanitize_label(input: &str) -> String {
    let without_emoji = pictographic_regex().replace_all(input, "");
    let cleaned: String = without_emoji
        .chars()
        .filter(|&ch| !is_structural(ch))
        .map(straighten_quote)
        .collect();
    let flat = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    comment_marker_regex().replace_all(&flat, "%").into_owned()
}

/// Truncates `text` to at most `limit` characters plus [`ELLIPSIS`].
///
/// When the hard cut would land inside a word and a space exists in the last 40% of the limit,
/// the cut moves back to that space instead.
pub fn truncate_label(text: &str, limit: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= limit {
        return text.to_string();
    }

    let min_cut = (limit * WORD_BOUNDARY_PERCENT).div_ceil(100);
    let boundary = chars[..=limit]
        .iter()
        .rposition(|c| c.is_whitespace())
        .filter(|&i| i >= min_cut);
    let cut = boundary.unwrap_or(limit);

    let head: String = chars[..cut].iter().collect();
    let mut out = head.trim_end().to_string();
    out.push_str(ELLIPSIS);
    out
}

/// Sanitizes, then truncates.
pub fn tier_label(input: &str, limit: usize) -> String {
    truncate_label(&sanitize_label(input), limit)
}
