//! Render request sequencing.
//!
//! Each request gets a new generation number. Renders resolve asynchronously and possibly out of
//! order; a completion is applied only if its generation is still the latest issued, so late
//! results never overwrite a newer map. The coordinator exclusively owns the visual tree and the
//! interaction batch attached to it.
//!
//! ```text
//! request ──► (surface not ready) ──► Deferred ──surface_resized──┐
//!    │                                                            │
//!    └──────────────► Rendering{g} ◄──────────────────────────────┘
//!                         │ complete(g)
//!              ┌──────────┴──────────┐
//!           Ready{g}              Failed
//! ```

use crate::engine::DiagramRenderer;
use crate::interaction::InteractionManager;
use crate::reconcile::{Mapping, ReconcileReport, Reconciler};
use crate::tree::{DispatchResult, GroupId, PointerEvent, VisualTree};
use crate::view::{ExportArtifact, ViewControls, export_svg};
use crate::{RenderError, Result};
use conceptmap_core::{Concept, ConceptGraph, GeneratorOptions, generate_with_options};
use futures::future::{self, Either};
use std::future::Future;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A surface with zero (or invalid) extent cannot host a layout.
    pub fn is_ready(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFailure {
    pub generation: u64,
    /// User-facing description.
    pub message: String,
    pub error: RenderError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    Idle,
    /// Waiting for a usable surface size.
    Deferred,
    Rendering {
        generation: u64,
    },
    Ready {
        generation: u64,
        matched: usize,
        unmatched: usize,
    },
    Failed(RenderFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied { generation: u64, matched: usize },
    Failed { generation: u64 },
    /// Superseded by a newer request; nothing changed.
    Stale,
    /// Held until the surface has a size.
    Deferred,
}

/// Result of one submission, tagged with the generation that issued it.
#[derive(Debug)]
pub struct RenderOutput {
    pub generation: u64,
    pub result: Result<VisualTree>,
}

/// A submitted render that has not been resolved yet.
///
/// Resolving does not touch the coordinator; hand the output to
/// [`RenderCoordinator::complete`].
#[must_use = "a pending render does nothing unless resolved"]
pub struct PendingRender {
    generation: u64,
    text: String,
    renderer: Rc<dyn DiagramRenderer>,
}

impl std::fmt::Debug for PendingRender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRender")
            .field("generation", &self.generation)
            .field("renderer", &self.renderer.name())
            .finish_non_exhaustive()
    }
}

impl PendingRender {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Diagram text being rendered.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub async fn resolve(self) -> RenderOutput {
        let result = self.renderer.submit(&self.text).await;
        RenderOutput {
            generation: self.generation,
            result,
        }
    }

    /// Like [`PendingRender::resolve`], but fails with [`RenderError::TimedOut`] if `deadline`
    /// finishes first. There is no built-in deadline.
    pub async fn resolve_until<D>(self, deadline: D) -> RenderOutput
    where
        D: Future<Output = ()>,
    {
        let generation = self.generation;
        let render = Box::pin(self.resolve());
        let deadline = Box::pin(deadline);
        match future::select(render, deadline).await {
            Either::Left((output, _)) => output,
            Either::Right(((), _)) => RenderOutput {
                generation,
                result: Err(RenderError::TimedOut),
            },
        }
    }
}

struct Request {
    graph: Rc<ConceptGraph>,
    title: String,
}

struct Rendered {
    tree: VisualTree,
    graph: Rc<ConceptGraph>,
    title: String,
    report: ReconcileReport,
}

type ClickHandler = Box<dyn FnMut(&Concept)>;

pub struct RenderCoordinator {
    renderer: Rc<dyn DiagramRenderer>,
    options: GeneratorOptions,
    reconciler: Reconciler,
    generation: u64,
    surface: SurfaceSize,
    state: RenderState,
    in_flight: Option<(u64, Request)>,
    deferred: Option<Request>,
    current: Option<Rendered>,
    interactions: InteractionManager,
    on_click: Option<ClickHandler>,
    view: ViewControls,
}

impl RenderCoordinator {
    pub fn new(renderer: Rc<dyn DiagramRenderer>) -> Self {
        Self {
            renderer,
            options: GeneratorOptions::default(),
            reconciler: Reconciler::default(),
            generation: 0,
            surface: SurfaceSize::default(),
            state: RenderState::Idle,
            in_flight: None,
            deferred: None,
            current: None,
            interactions: InteractionManager::default(),
            on_click: None,
            view: ViewControls::default(),
        }
    }

    pub fn with_surface(mut self, surface: SurfaceSize) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_generator_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Called with the concept behind a clicked node.
    pub fn on_concept_click(&mut self, handler: impl FnMut(&Concept) + 'static) {
        self.on_click = Some(Box::new(handler));
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Latest generation issued.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn tree(&self) -> Option<&VisualTree> {
        self.current.as_ref().map(|r| &r.tree)
    }

    pub fn report(&self) -> Option<&ReconcileReport> {
        self.current.as_ref().map(|r| &r.report)
    }

    pub fn mapping(&self) -> Option<&Mapping> {
        self.report().map(|r| &r.mapping)
    }

    pub fn view(&self) -> &ViewControls {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewControls {
        &mut self.view
    }

    /// Starts a render of `graph`. Returns `None` when the surface is not ready yet; the request
    /// is then held (replacing any older held request) until [`Self::surface_resized`].
    ///
    /// Interaction handlers of the currently displayed map are removed immediately.
    pub fn request(
        &mut self,
        graph: impl Into<Rc<ConceptGraph>>,
        title: &str,
    ) -> Option<PendingRender> {
        self.generation += 1;
        self.detach_interactions();
        let request = Request {
            graph: graph.into(),
            title: title.to_string(),
        };
        if !self.surface.is_ready() {
            tracing::debug!(
                generation = self.generation,
                "surface has no size yet; deferring render"
            );
            self.in_flight = None;
            self.deferred = Some(request);
            self.state = RenderState::Deferred;
            return None;
        }
        self.deferred = None;
        Some(self.issue(request))
    }

    /// Records the new surface size and re-issues a held request once it is usable.
    pub fn surface_resized(&mut self, size: SurfaceSize) -> Option<PendingRender> {
        self.surface = size;
        if !size.is_ready() {
            return None;
        }
        let request = self.deferred.take()?;
        self.generation += 1;
        Some(self.issue(request))
    }

    fn issue(&mut self, request: Request) -> PendingRender {
        let generation = self.generation;
        let text = generate_with_options(&request.graph, &request.title, &self.options);
        tracing::debug!(
            generation,
            renderer = self.renderer.name(),
            bytes = text.len(),
            "submitting mindmap"
        );
        self.in_flight = Some((generation, request));
        self.state = RenderState::Rendering { generation };
        PendingRender {
            generation,
            text,
            renderer: Rc::clone(&self.renderer),
        }
    }

    /// Applies a finished render if it is still the latest one.
    pub fn complete(&mut self, output: RenderOutput) -> Completion {
        let request = match self.in_flight.take() {
            Some((generation, request)) if generation == output.generation => request,
            other => {
                self.in_flight = other;
                tracing::debug!(
                    generation = output.generation,
                    latest = self.generation,
                    "discarding stale render result"
                );
                return Completion::Stale;
            }
        };
        let generation = output.generation;
        let _span = tracing::info_span!("render", generation).entered();

        // The previous tree goes away before the new one is exposed.
        self.detach_interactions();
        self.current = None;

        match output.result {
            Ok(mut tree) => {
                let report = self.reconciler.reconcile(&request.graph, &tree);
                self.interactions
                    .attach(&mut tree, &report.mapping, generation);
                let matched = report.mapping.len();
                let unmatched = report.unmatched.len();
                self.state = RenderState::Ready {
                    generation,
                    matched,
                    unmatched,
                };
                tracing::info!(matched, unmatched, "render applied");
                self.current = Some(Rendered {
                    tree,
                    graph: request.graph,
                    title: request.title,
                    report,
                });
                Completion::Applied {
                    generation,
                    matched,
                }
            }
            Err(error) => {
                tracing::warn!(generation, %error, "render failed");
                self.state = RenderState::Failed(RenderFailure {
                    generation,
                    message: format!("Could not render the concept map: {error}"),
                    error,
                });
                Completion::Failed { generation }
            }
        }
    }

    /// Requests, resolves and completes in one step.
    pub async fn render(
        &mut self,
        graph: impl Into<Rc<ConceptGraph>>,
        title: &str,
    ) -> Completion {
        match self.request(graph, title) {
            Some(pending) => {
                let output = pending.resolve().await;
                self.complete(output)
            }
            None => Completion::Deferred,
        }
    }

    /// Routes a pointer event into the displayed tree; a node click reaches the click handler.
    pub fn dispatch(&mut self, group: GroupId, event: PointerEvent) -> DispatchResult {
        let Some(current) = self.current.as_mut() else {
            return DispatchResult::default();
        };
        let result = current.tree.dispatch(group, event);
        if let Some(id) = result.selected.as_ref() {
            match (current.graph.get(id.as_str()), self.on_click.as_mut()) {
                (Some(concept), Some(handler)) => handler(concept),
                (None, _) => tracing::debug!(concept = %id, "clicked concept is not in the graph"),
                _ => {}
            }
        }
        result
    }

    /// The displayed map as an SVG file, or `None` before the first successful render.
    pub fn export(&self) -> Option<ExportArtifact> {
        let current = self.current.as_ref()?;
        export_svg(Some(&current.tree), &current.title)
    }

    /// Drops the displayed map and all handlers, and invalidates any in-flight render.
    pub fn teardown(&mut self) {
        self.detach_interactions();
        self.current = None;
        self.in_flight = None;
        self.deferred = None;
        self.generation += 1;
        self.state = RenderState::Idle;
    }

    fn detach_interactions(&mut self) {
        match self.current.as_mut() {
            Some(current) => {
                self.interactions.detach(&mut current.tree);
            }
            None => self.interactions.forget(),
        }
    }
}
