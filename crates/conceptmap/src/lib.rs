#![forbid(unsafe_code)]

//! `conceptmap` turns a typed concept graph into an interactive mindmap.
//!
//! The core (always available) generates deterministic mindmap diagram text from a
//! [`ConceptGraph`]. The optional renderer turns that text into SVG, maps rendered nodes back to
//! concepts and wires hover/click behaviour.
//!
//! # Features
//!
//! - `render`: headless SVG rendering, reconciliation and the render coordinator
//!   (`conceptmap::render`)

pub use conceptmap_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use conceptmap_render::coordinator::{
        Completion, PendingRender, RenderCoordinator, RenderFailure, RenderOutput, RenderState,
        SurfaceSize,
    };
    pub use conceptmap_render::engine::DiagramRenderer;
    pub use conceptmap_render::headless::HeadlessMindmapRenderer;
    pub use conceptmap_render::reconcile::{
        MappedGroup, Mapping, ReconcileReport, Reconciler, UnmatchedGroup, reconcile,
    };
    pub use conceptmap_render::tree::{GroupId, NodeGroup, PointerEvent, VisualTree};
    pub use conceptmap_render::view::{ExportArtifact, Modifiers, ViewControls};
    pub use conceptmap_render::{RenderError, text};

    use crate::{ConceptGraph, GeneratorOptions, SiteConfig, Theme};
    use std::rc::Rc;
    use std::sync::Arc;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Config(#[from] crate::Error),
        #[error(transparent)]
        Render(#[from] RenderError),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Converts an arbitrary string (usually a map title) into an SVG `id` token.
    ///
    /// Internal ids (node ids, CSS selectors) are prefixed with the diagram id, so inlining two
    /// maps with the same id would make their styles collide.
    pub fn sanitize_svg_id(raw: &str) -> String {
        let mut out = String::new();
        for ch in raw.trim().chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                out.push(ch);
            } else if !out.ends_with('-') {
                out.push('-');
            }
        }
        let out = out.trim_matches('-');
        match out.chars().next() {
            None => "cm-untitled".to_string(),
            Some(c) if c.is_ascii_alphabetic() => out.to_string(),
            Some(_) => format!("cm-{out}"),
        }
    }

    /// One finished headless render.
    #[derive(Debug, Clone)]
    pub struct RenderedMap {
        pub text: String,
        pub tree: VisualTree,
        pub report: ReconcileReport,
    }

    impl RenderedMap {
        pub fn svg(&self) -> &str {
            self.tree.markup()
        }
    }

    /// Bundles theme, generator options and the headless renderer.
    ///
    /// Runtime-agnostic; all work is CPU-bound and does no I/O.
    #[derive(Debug, Clone)]
    pub struct ConceptMapRenderer {
        pub theme: Arc<Theme>,
        pub options: GeneratorOptions,
        renderer: HeadlessMindmapRenderer,
    }

    impl Default for ConceptMapRenderer {
        fn default() -> Self {
            let theme = Arc::new(Theme::default());
            Self {
                renderer: HeadlessMindmapRenderer::new(Arc::clone(&theme)),
                theme,
                options: GeneratorOptions::default(),
            }
        }
    }

    impl ConceptMapRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn from_site_config(config: &SiteConfig) -> Result<Self> {
            let theme = Arc::new(Theme::from_config(config)?);
            Ok(Self {
                renderer: HeadlessMindmapRenderer::new(Arc::clone(&theme)),
                theme,
                options: GeneratorOptions::from_config(config)?,
            })
        }

        pub fn with_diagram_id(mut self, id: &str) -> Self {
            self.renderer = self.renderer.with_diagram_id(sanitize_svg_id(id));
            self
        }

        pub fn generate(&self, graph: &ConceptGraph, title: &str) -> String {
            crate::generate_with_options(graph, title, &self.options)
        }

        /// Generate, render and reconcile synchronously (executor-free).
        pub fn render_sync(&self, graph: &ConceptGraph, title: &str) -> Result<RenderedMap> {
            let text = self.generate(graph, title);
            let tree = self.renderer.render_sync(&text)?;
            let report = reconcile(graph, &tree);
            Ok(RenderedMap { text, tree, report })
        }

        pub fn render_svg_sync(&self, graph: &ConceptGraph, title: &str) -> Result<String> {
            let text = self.generate(graph, title);
            Ok(self.renderer.render_sync(&text)?.markup().to_string())
        }

        /// A coordinator sharing this renderer's theme and generator options.
        pub fn coordinator(&self, surface: SurfaceSize) -> RenderCoordinator {
            RenderCoordinator::new(Rc::new(self.renderer.clone()))
                .with_generator_options(self.options.clone())
                .with_surface(surface)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::{Concept, ConceptType};

        fn graph() -> ConceptGraph {
            ConceptGraph::new(vec![
                Concept::new("c1", "Artificial Intelligence", ConceptType::Main)
                    .with_connections(["c2"]),
                Concept::new("c2", "Machine Learning", ConceptType::Secondary),
            ])
        }

        #[test]
        fn sanitize_svg_id_produces_safe_tokens() {
            assert_eq!(sanitize_svg_id("AI Overview!"), "AI-Overview");
            assert_eq!(sanitize_svg_id("  "), "cm-untitled");
            assert_eq!(sanitize_svg_id("2024 plan"), "cm-2024-plan");
        }

        #[test]
        fn render_sync_returns_text_svg_and_mapping() {
            let map = ConceptMapRenderer::new().render_sync(&graph(), "AI").unwrap();
            assert!(map.text.starts_with("mindmap\n"));
            assert!(map.svg().starts_with("<svg id=\"conceptmap\""));
            assert_eq!(map.report.mapping.len(), 2);
        }

        #[test]
        fn site_config_flows_into_generator_and_theme() {
            let cfg = SiteConfig::from_json_str(
                r##"{"themeVariables": {"root": {"fill": "#123456"}}, "generator": {"placeholder": "Start here"}}"##,
            )
            .unwrap();
            let r = ConceptMapRenderer::from_site_config(&cfg)
                .unwrap()
                .with_diagram_id("My Map");
            assert_eq!(r.theme.root.fill, "#123456");
            let svg = r.render_svg_sync(&ConceptGraph::default(), "T").unwrap();
            let doc = roxmltree::Document::parse(&svg).unwrap();
            assert_eq!(doc.root_element().attribute("id"), Some("My-Map"));
            assert!(svg.contains("Start here"));
            assert!(svg.contains("#123456"));
        }

        #[test]
        fn coordinator_shares_options() {
            let mut coord = ConceptMapRenderer::new().coordinator(SurfaceSize::new(640.0, 480.0));
            let done = futures::executor::block_on(coord.render(graph(), "AI"));
            assert!(matches!(done, Completion::Applied { matched: 2, .. }));
        }
    }
}
