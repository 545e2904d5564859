//! Built-in renderer: mindmap text → SVG markup plus a [`VisualTree`], without a browser.

pub mod layout;
pub mod parse;
pub mod svg;

use crate::engine::DiagramRenderer;
use crate::tree::VisualTree;
use crate::Result;
use conceptmap_core::Theme;
use futures::future::LocalBoxFuture;
use std::sync::Arc;

pub const DEFAULT_DIAGRAM_ID: &str = "conceptmap";

#[derive(Debug, Clone)]
pub struct HeadlessMindmapRenderer {
    theme: Arc<Theme>,
    diagram_id: String,
}

impl Default for HeadlessMindmapRenderer {
    fn default() -> Self {
        Self::new(Arc::new(Theme::default()))
    }
}

impl HeadlessMindmapRenderer {
    pub fn new(theme: Arc<Theme>) -> Self {
        Self {
            theme,
            diagram_id: DEFAULT_DIAGRAM_ID.to_string(),
        }
    }

    pub fn with_diagram_id(mut self, id: impl Into<String>) -> Self {
        self.diagram_id = id.into();
        self
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn render_sync(&self, text: &str) -> Result<VisualTree> {
        let doc = parse::parse_mindmap(text)?;
        let layout = layout::layout_mindmap(&doc, &self.theme);
        let tree = svg::render_svg(&doc, &layout, &self.theme, &self.diagram_id);
        tracing::debug!(
            nodes = doc.nodes.len(),
            width = layout.width,
            height = layout.height,
            "rendered mindmap"
        );
        Ok(tree)
    }
}

impl DiagramRenderer for HeadlessMindmapRenderer {
    fn name(&self) -> &str {
        "headless-mindmap"
    }

    fn submit<'a>(&'a self, text: &'a str) -> LocalBoxFuture<'a, Result<VisualTree>> {
        Box::pin(async move { self.render_sync(text) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderError;
    use futures::executor::block_on;

    const AI: &str = "mindmap\n  root((Artificial Intelligence))\n    Machine Learning\n      Neural Networks\n";

    #[test]
    fn markup_is_well_formed_svg() {
        let tree = HeadlessMindmapRenderer::default().render_sync(AI).unwrap();
        let doc = roxmltree::Document::parse(tree.markup()).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "svg");
        assert_eq!(root.attribute("aria-roledescription"), Some("mindmap"));
        let node_groups = doc
            .descendants()
            .filter(|n| {
                n.attribute("class")
                    .is_some_and(|c| c.split_whitespace().any(|c| c == "mindmap-node"))
            })
            .count();
        assert_eq!(node_groups, 3);
    }

    #[test]
    fn tree_mirrors_markup_nodes() {
        let tree = HeadlessMindmapRenderer::default().render_sync(AI).unwrap();
        let nodes: Vec<_> = tree
            .groups()
            .iter()
            .filter(|g| g.has_class("mindmap-node"))
            .collect();
        assert_eq!(nodes.len(), 3);
        assert!(nodes[0].has_class("section-root"));
        assert!(nodes[1].has_class("section-0"));
        assert_eq!(tree.text_of(nodes[1].id()), "Machine Learning");
        assert!(nodes.iter().all(|g| g.shape.is_some()));
    }

    #[test]
    fn labels_are_escaped_in_markup() {
        let tree = HeadlessMindmapRenderer::default()
            .render_sync("mindmap\n  root((R & D))\n")
            .unwrap();
        assert!(tree.markup().contains("R &amp; D"));
        assert_eq!(tree.text_of(tree.groups()[2].id()), "R & D");
    }

    #[test]
    fn submit_reports_syntax_errors() {
        let r = HeadlessMindmapRenderer::default();
        let err = block_on(r.submit("graph TD\n")).unwrap_err();
        assert!(matches!(err, RenderError::Syntax { .. }));
    }
}
