//! Deterministic label measurement and wrapping.
//!
//! There is no font backend in a headless render, so widths are estimated from terminal column
//! widths: each column counts as `0.6em`. Wide (CJK) glyphs take two columns.

use unicode_width::UnicodeWidthStr;

pub const CHAR_WIDTH_EM: f64 = 0.6;

pub fn line_width_px(text: &str, font_size: f64) -> f64 {
    text.width() as f64 * font_size.max(1.0) * CHAR_WIDTH_EM
}

/// Greedy word wrap to `max_width_px`.
///
/// Words are never split: a word wider than the limit gets a line of its own and overflows it, so
/// joining the lines with single spaces gives back the whitespace-collapsed label. Always returns
/// at least one line.
pub fn wrap_label(text: &str, max_width_px: f64, font_size: f64) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![String::new()];
    }
    if !(max_width_px.is_finite() && max_width_px > 0.0) {
        return vec![words.join(" ")];
    }

    let mut out: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in words {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if line_width_px(&candidate, font_size) <= max_width_px {
            cur = candidate;
            continue;
        }
        if !cur.is_empty() {
            out.push(std::mem::take(&mut cur));
        }
        cur = word.to_string();
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}
