//! Candidate text cleanup for reconciliation.
//!
//! Renderers sometimes emit a label twice inside one group (a visible run plus an accessibility
//! or measurement copy), truncate it with an ellipsis, or wrap it over several runs. These
//! helpers undo that before comparing against concept labels.

use regex::Regex;
use std::sync::OnceLock;

fn multi_space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}").expect("valid regex"))
}

fn punctuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// `"A B A B"` → `"A B"`.
fn collapse_repeated_words(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || words.len() % 2 != 0 {
        return None;
    }
    let (a, b) = words.split_at(words.len() / 2);
    (a == b).then(|| a.join(" "))
}

/// `"Label   Label"` → `"Label"`.
fn collapse_spaced_halves(text: &str) -> Option<String> {
    let parts: Vec<&str> = multi_space_re().split(text.trim()).collect();
    match parts.as_slice() {
        [a, b] if !a.is_empty() && a == b => Some((*a).to_string()),
        _ => None,
    }
}

/// `"LabelLabel"` → `"Label"`.
fn collapse_char_halves(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || chars.len() % 2 != 0 {
        return None;
    }
    let (a, b) = chars.split_at(chars.len() / 2);
    (a == b).then(|| a.iter().collect())
}

/// Applies the three duplicate-collapsing checks in order; each sees the previous result.
pub fn dedupe(text: &str) -> String {
    let checks: [fn(&str) -> Option<String>; 3] = [
        collapse_repeated_words,
        collapse_spaced_halves,
        collapse_char_halves,
    ];
    let mut cur = text.to_string();
    for check in checks {
        if let Some(next) = check(&cur) {
            cur = next;
        }
    }
    cur
}

/// Removes a trailing `...` or `…` left by label truncation.
pub fn strip_ellipsis(text: &str) -> &str {
    let t = text.trim_end();
    let t = t
        .strip_suffix("...")
        .or_else(|| t.strip_suffix('…'))
        .unwrap_or(t);
    t.trim_end()
}

/// Lowercases, drops everything except word characters, whitespace and hyphens, then collapses
/// whitespace. Idempotent.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = punctuation_re().replace_all(&lower, "");
    whitespace_re()
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Full candidate pipeline: dedupe, strip ellipsis, normalize.
pub fn candidate(text: &str) -> String {
    normalize(strip_ellipsis(&dedupe(text)))
}
