//! Indentation-based mindmap text parser.
//!
//! Accepts the subset of the mindmap grammar the generator emits, plus the common bracketed node
//! shapes: `id((circle))`, `id(rounded)`, `id[rect]`. Blank lines and `%%` comments are ignored.

use crate::tree::ShapeKind;
use crate::{RenderError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct MindmapNode {
    /// 0 for the root.
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub label: String,
    pub shape: ShapeKind,
    /// 1-based source line.
    pub line: usize,
    indent: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MindmapDoc {
    /// Nodes in source order; index 0 is the root.
    pub nodes: Vec<MindmapNode>,
}

impl MindmapDoc {
    pub fn root(&self) -> Option<&MindmapNode> {
        self.nodes.first()
    }

    /// Index of the depth-1 ancestor of `idx` (the branch it belongs to), or `None` for the root.
    pub fn branch_of(&self, mut idx: usize) -> Option<usize> {
        loop {
            let node = self.nodes.get(idx)?;
            match node.parent {
                None => return None,
                Some(p) if self.nodes[p].parent.is_none() => return Some(idx),
                Some(p) => idx = p,
            }
        }
    }
}

fn syntax(line: usize, message: impl Into<String>) -> RenderError {
    RenderError::Syntax {
        line,
        message: message.into(),
    }
}

pub fn parse_mindmap(text: &str) -> Result<MindmapDoc> {
    let mut doc = MindmapDoc::default();
    let mut saw_header = false;
    let mut last_line = 0usize;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let (indent, rest) = split_indent(strip_comment(raw));
        let rest = rest.trim_end();
        if rest.is_empty() {
            continue;
        }

        if !saw_header {
            if !rest.eq_ignore_ascii_case("mindmap") {
                return Err(syntax(
                    line_no,
                    format!("expected `mindmap` header, found {rest:?}"),
                ));
            }
            saw_header = true;
            continue;
        }

        let (label, shape) = parse_node(rest).map_err(|m| syntax(line_no, m))?;
        let parent = doc.nodes.iter().rposition(|n| n.indent < indent);
        let depth = match (parent, doc.nodes.is_empty()) {
            (_, true) => 0,
            (Some(p), false) => doc.nodes[p].depth + 1,
            (None, false) => {
                return Err(syntax(
                    line_no,
                    format!("there can be only one root; no parent found for {label:?}"),
                ));
            }
        };
        let id = doc.nodes.len();
        if let Some(p) = parent.filter(|_| depth > 0) {
            doc.nodes[p].children.push(id);
        }
        doc.nodes.push(MindmapNode {
            depth,
            parent: parent.filter(|_| depth > 0),
            children: Vec::new(),
            label,
            shape,
            line: line_no,
            indent,
        });
    }

    if !saw_header {
        return Err(syntax(last_line.max(1), "empty diagram"));
    }
    if doc.nodes.is_empty() {
        return Err(syntax(last_line, "mindmap has no root node"));
    }
    Ok(doc)
}

fn split_indent(line: &str) -> (usize, &str) {
    let trimmed = line.trim_start();
    let indent = line[..line.len() - trimmed.len()].chars().count();
    (indent, trimmed)
}

fn strip_comment(line: &str) -> &str {
    match line.find("%%") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_node(raw: &str) -> std::result::Result<(String, ShapeKind), String> {
    let Some(open_at) = raw.find(['(', '[']) else {
        return Ok((unquote(raw).to_string(), ShapeKind::RoundedRect));
    };
    let delimited = &raw[open_at..];
    let (open, close, shape) = if delimited.starts_with("((") {
        ("((", "))", ShapeKind::Circle)
    } else if delimited.starts_with('(') {
        ("(", ")", ShapeKind::RoundedRect)
    } else {
        ("[", "]", ShapeKind::Rect)
    };
    let inner = delimited[open.len()..]
        .strip_suffix(close)
        .ok_or_else(|| format!("unterminated node delimiter `{open}`"))?;
    let label = unquote(inner.trim());
    if label.is_empty() && raw[..open_at].trim().is_empty() {
        return Err("expected node label".to_string());
    }
    if label.is_empty() {
        return Ok((raw[..open_at].trim().to_string(), shape));
    }
    Ok((label.to_string(), shape))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}
