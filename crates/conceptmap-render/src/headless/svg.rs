//! SVG markup and visual tree emission for a laid-out mindmap.

use super::layout::MindmapLayout;
use super::parse::MindmapDoc;
use crate::tree::{Shape, ShapeKind, VisualTree};
use conceptmap_core::{ConceptType, Theme};
use std::fmt::Write as _;

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Formats a coordinate with at most two decimals.
pub fn fmt(v: f64) -> String {
    let v = (v * 100.0).round() / 100.0;
    if v == 0.0 {
        return "0".to_string();
    }
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn tier(depth: usize) -> ConceptType {
    match depth {
        0 => ConceptType::Main,
        1 => ConceptType::Secondary,
        _ => ConceptType::Tertiary,
    }
}

fn mindmap_css(id: &str, theme: &Theme) -> String {
    let font = theme.font_family.replace('<', "");
    let mut css = String::new();
    let _ = write!(
        &mut css,
        "#{id}{{font-family:{font};font-size:{}px;}}",
        fmt(theme.font_size)
    );
    let _ = write!(
        &mut css,
        "#{id} .mindmap-node-label{{text-anchor:middle;dominant-baseline:central;}}"
    );
    let _ = write!(
        &mut css,
        "#{id} .mindmap-edge{{fill:none;stroke:#9e9e9e;stroke-width:2;}}"
    );
    css
}

/// Emits SVG markup and the matching visual tree.
///
/// Group layout: `mindmap-edges`, then `mindmap-nodes` whose children are one
/// `mindmap-node section-*` group per node, in source order.
pub fn render_svg(
    doc: &MindmapDoc,
    layout: &MindmapLayout,
    theme: &Theme,
    diagram_id: &str,
) -> VisualTree {
    let id = escape_xml(diagram_id);
    let line_height = theme.font_size * super::layout::LINE_HEIGHT_EM;
    let mut tree = VisualTree::new(String::new());
    let mut out = String::new();

    let _ = write!(
        &mut out,
        r#"<svg id="{id}" width="100%" xmlns="http://www.w3.org/2000/svg" class="mindmap" style="max-width: {w}px;" viewBox="0 0 {w} {h}" role="graphics-document document" aria-roledescription="mindmap">"#,
        w = fmt(layout.width),
        h = fmt(layout.height),
    );
    let _ = write!(&mut out, "<style>{}</style>", mindmap_css(&id, theme));

    tree.add_group(None, ["mindmap-edges"]);
    out.push_str(r#"<g class="mindmap-edges">"#);
    for (idx, node) in doc.nodes.iter().enumerate() {
        let Some(parent) = node.parent else {
            continue;
        };
        let (p, c) = (&layout.nodes[parent], &layout.nodes[idx]);
        let (x1, y1) = (p.x + p.width / 2.0, p.y);
        let (x2, y2) = (c.x - c.width / 2.0, c.y);
        let mx = (x1 + x2) / 2.0;
        let _ = write!(
            &mut out,
            r#"<path class="mindmap-edge edge-depth-{depth} {section}" d="M{x1},{y1} C{mx},{y1} {mx},{y2} {x2},{y2}"/>"#,
            depth = node.depth,
            section = c.section_class().replace("section-", "section-edge-"),
            x1 = fmt(x1),
            y1 = fmt(y1),
            mx = fmt(mx),
            x2 = fmt(x2),
            y2 = fmt(y2),
        );
    }
    out.push_str("</g>");

    let nodes_group = tree.add_group(None, ["mindmap-nodes"]);
    out.push_str(r#"<g class="mindmap-nodes">"#);
    for (idx, node) in doc.nodes.iter().enumerate() {
        let l = &layout.nodes[idx];
        let palette = theme.palette(tier(node.depth));
        let section = l.section_class();
        let dom_id = format!("{id}-node-{idx}");

        let group = tree.add_group(Some(nodes_group), ["mindmap-node".to_string(), section.clone()]);
        if let Some(g) = tree.group_mut(group) {
            g.dom_id = Some(dom_id.clone());
            g.text_runs = l.lines.clone();
            g.label_style.set("fill", palette.text.clone());
            let mut shape = Shape::new(node.shape);
            shape.style.set("fill", palette.fill.clone());
            g.shape = Some(shape);
        }

        let _ = write!(
            &mut out,
            r#"<g class="mindmap-node {section}" id="{dom_id}" transform="translate({x}, {y})">"#,
            x = fmt(l.x),
            y = fmt(l.y),
        );
        let fill = escape_xml(&palette.fill);
        match node.shape {
            ShapeKind::Circle => {
                let _ = write!(
                    &mut out,
                    r#"<circle class="node-bkg" r="{}" fill="{fill}"/>"#,
                    fmt(l.width / 2.0)
                );
            }
            ShapeKind::Rect | ShapeKind::RoundedRect => {
                let rx = if node.shape == ShapeKind::RoundedRect { 5.0 } else { 0.0 };
                let _ = write!(
                    &mut out,
                    r#"<rect class="node-bkg" x="{x}" y="{y}" width="{w}" height="{h}" rx="{rx}" fill="{fill}"/>"#,
                    x = fmt(-l.width / 2.0),
                    y = fmt(-l.height / 2.0),
                    w = fmt(l.width),
                    h = fmt(l.height),
                    rx = fmt(rx),
                );
            }
        }
        let _ = write!(
            &mut out,
            r#"<text class="mindmap-node-label" fill="{}">"#,
            escape_xml(&palette.text)
        );
        let top = -(l.lines.len().saturating_sub(1) as f64) * line_height / 2.0;
        for (i, line) in l.lines.iter().enumerate() {
            let _ = write!(
                &mut out,
                r#"<tspan x="0" y="{}">{}</tspan>"#,
                fmt(top + i as f64 * line_height),
                escape_xml(line)
            );
        }
        out.push_str("</text></g>");
    }
    out.push_str("</g></svg>");

    tree.set_markup(out);
    tree
}
