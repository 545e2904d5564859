//! Tiered left-to-right tree layout.
//!
//! Each depth gets a column at least `maxNodeWidth` wide, widened to its widest node; leaves are stacked top to bottom and every parent is
//! centred on the span of its children. Coordinates are node centres, shifted so the drawing
//! starts at `(padding, padding)`.

use super::parse::MindmapDoc;
use crate::text::{line_width_px, wrap_label};
use crate::tree::ShapeKind;
use conceptmap_core::Theme;

pub const LINE_HEIGHT_EM: f64 = 1.5;

/// Mindmap sections cycle after this many branches.
pub const MAX_SECTIONS: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub lines: Vec<String>,
    /// Branch index for non-root nodes.
    pub section: Option<usize>,
}

impl LayoutNode {
    pub fn section_class(&self) -> String {
        match self.section {
            None => "section-root".to_string(),
            Some(s) => format!("section-{}", s % MAX_SECTIONS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MindmapLayout {
    pub nodes: Vec<LayoutNode>,
    pub width: f64,
    pub height: f64,
}

pub fn layout_mindmap(doc: &MindmapDoc, theme: &Theme) -> MindmapLayout {
    let font_size = theme.font_size;
    let line_height = font_size * LINE_HEIGHT_EM;
    let min_column = theme.max_node_width + theme.padding * 2.0;

    let mut nodes: Vec<LayoutNode> = doc
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, n)| {
            let lines = wrap_label(&n.label, theme.max_node_width, font_size);
            let text_w = lines
                .iter()
                .map(|l| line_width_px(l, font_size))
                .fold(0.0, f64::max);
            let mut width = text_w + theme.padding * 2.0;
            let mut height = lines.len() as f64 * line_height + theme.padding * 2.0;
            if n.shape == ShapeKind::Circle {
                let d = width.max(height);
                width = d;
                height = d;
            }
            let section = doc
                .branch_of(idx)
                .zip(doc.root())
                .and_then(|(b, root)| root.children.iter().position(|&c| c == b));
            LayoutNode {
                x: 0.0,
                y: 0.0,
                width,
                height,
                lines,
                section,
            }
        })
        .collect();

    if nodes.is_empty() {
        return MindmapLayout::default();
    }

    let depth_count = doc.nodes.iter().map(|n| n.depth + 1).max().unwrap_or(0);
    let mut columns = vec![min_column; depth_count];
    for (n, l) in doc.nodes.iter().zip(&nodes) {
        columns[n.depth] = columns[n.depth].max(l.width);
    }
    let mut centres = Vec::with_capacity(depth_count);
    let mut right = 0.0;
    for w in &columns {
        let left = if centres.is_empty() { 0.0 } else { right + theme.level_gap };
        centres.push(left + w / 2.0);
        right = left + w;
    }
    for (n, l) in doc.nodes.iter().zip(nodes.iter_mut()) {
        l.x = centres[n.depth];
    }

    let mut cursor = 0.0;
    place(doc, &mut nodes, 0, &mut cursor, theme.sibling_gap);

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for n in &nodes {
        min_x = min_x.min(n.x - n.width / 2.0);
        min_y = min_y.min(n.y - n.height / 2.0);
        max_x = max_x.max(n.x + n.width / 2.0);
        max_y = max_y.max(n.y + n.height / 2.0);
    }
    let dx = theme.padding - min_x;
    let dy = theme.padding - min_y;
    for n in &mut nodes {
        n.x += dx;
        n.y += dy;
    }

    MindmapLayout {
        width: max_x - min_x + theme.padding * 2.0,
        height: max_y - min_y + theme.padding * 2.0,
        nodes,
    }
}

/// Assigns `y` for the subtree at `idx`, consuming vertical space from `cursor`.
fn place(doc: &MindmapDoc, nodes: &mut [LayoutNode], idx: usize, cursor: &mut f64, gap: f64) {
    let children = &doc.nodes[idx].children;
    if children.is_empty() {
        nodes[idx].y = *cursor + nodes[idx].height / 2.0;
        *cursor += nodes[idx].height + gap;
        return;
    }
    for &c in children {
        place(doc, nodes, c, cursor, gap);
    }
    let first = nodes[children[0]].y;
    let last = nodes[children[children.len() - 1]].y;
    nodes[idx].y = (first + last) / 2.0;
}
