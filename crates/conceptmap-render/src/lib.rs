#![forbid(unsafe_code)]

//! Headless rendering pipeline for concept mindmaps.
//!
//! The pieces, in the order a render flows through them:
//!
//! - [`engine::DiagramRenderer`]: asynchronous text → [`tree::VisualTree`] boundary, with
//!   [`headless::HeadlessMindmapRenderer`] as the built-in implementation.
//! - [`reconcile`]: recovers which concept each rendered node group displays.
//! - [`interaction`]: hover/click wiring for mapped groups, attached per render generation.
//! - [`coordinator::RenderCoordinator`]: sequences the above and discards stale results.
//! - [`view`]: zoom/pan state and SVG export.

pub mod coordinator;
pub mod engine;
pub mod headless;
pub mod interaction;
pub mod reconcile;
pub mod text;
pub mod tree;
pub mod view;

pub use coordinator::{
    Completion, PendingRender, RenderCoordinator, RenderFailure, RenderOutput, RenderState,
    SurfaceSize,
};
pub use engine::DiagramRenderer;
pub use headless::HeadlessMindmapRenderer;
pub use reconcile::{Mapping, ReconcileReport, Reconciler, reconcile};
pub use tree::{GroupId, NodeGroup, PointerEvent, VisualTree};
pub use view::{ExportArtifact, Modifiers, ViewControls};

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("diagram syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("renderer failed: {message}")]
    Engine { message: String },

    #[error("render timed out")]
    TimedOut,
}

impl RenderError {
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }
}
