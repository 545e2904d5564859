use conceptmap_core::{Concept, ConceptGraph, ConceptType};
use conceptmap_render::engine::DiagramRenderer;
use conceptmap_render::{
    Completion, HeadlessMindmapRenderer, PointerEvent, RenderCoordinator, RenderError, RenderState,
    SurfaceSize, VisualTree,
};
use futures::executor::block_on;
use futures::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type RenderResult = conceptmap_render::Result<VisualTree>;

fn c(id: &str, label: &str, ty: ConceptType, connections: &[&str]) -> Concept {
    Concept::new(id, label, ty).with_connections(connections.iter().copied())
}

fn ai_graph() -> ConceptGraph {
    ConceptGraph::new(vec![
        c("c1", "Artificial Intelligence", ConceptType::Main, &["c2"]),
        c("c2", "Machine Learning", ConceptType::Secondary, &["c3"]),
        c("c3", "Neural Networks", ConceptType::Tertiary, &[]),
        c("c4", "Expert Systems", ConceptType::Tertiary, &[]),
    ])
}

fn biology_graph() -> ConceptGraph {
    ConceptGraph::new(vec![
        c("b1", "Biology", ConceptType::Main, &["b2"]),
        c("b2", "Genetics", ConceptType::Secondary, &[]),
    ])
}

fn surface() -> SurfaceSize {
    SurfaceSize::new(800.0, 600.0)
}

fn coordinator() -> RenderCoordinator {
    RenderCoordinator::new(Rc::new(HeadlessMindmapRenderer::default())).with_surface(surface())
}

/// Fails on demand, otherwise renders headlessly.
#[derive(Default)]
struct FlakyRenderer {
    fail: Cell<bool>,
    inner: HeadlessMindmapRenderer,
}

impl DiagramRenderer for FlakyRenderer {
    fn submit<'a>(&'a self, text: &'a str) -> LocalBoxFuture<'a, RenderResult> {
        if self.fail.get() {
            let failed: RenderResult =
                Err(RenderError::engine("layout engine crashed"));
            return Box::pin(futures::future::ready(failed));
        }
        self.inner.submit(text)
    }
}

struct NeverRenderer;

impl DiagramRenderer for NeverRenderer {
    fn submit<'a>(&'a self, _text: &'a str) -> LocalBoxFuture<'a, RenderResult> {
        Box::pin(futures::future::pending::<RenderResult>())
    }
}

#[test]
fn successful_render_maps_and_wires_nodes() {
    let mut coord = coordinator();
    let done = block_on(coord.render(ai_graph(), "AI Overview"));
    assert_eq!(
        done,
        Completion::Applied {
            generation: 1,
            matched: 3
        }
    );
    assert_eq!(
        coord.state(),
        &RenderState::Ready {
            generation: 1,
            matched: 3,
            unmatched: 0
        }
    );
    let tree = coord.tree().unwrap();
    assert_eq!(tree.listener_count(), 9);
    assert!(!tree.markup().contains("Expert Systems"));
}

#[test]
fn later_request_wins_even_if_it_resolves_first() {
    let mut coord = coordinator();
    let first = coord.request(ai_graph(), "AI").unwrap();
    let second = coord.request(biology_graph(), "Bio").unwrap();
    assert_eq!((first.generation(), second.generation()), (1, 2));

    let second_out = block_on(second.resolve());
    assert!(matches!(
        coord.complete(second_out),
        Completion::Applied { generation: 2, .. }
    ));
    let before = coord.tree().unwrap().markup().to_string();

    let first_out = block_on(first.resolve());
    assert_eq!(coord.complete(first_out), Completion::Stale);
    assert_eq!(coord.tree().unwrap().markup(), before);
    assert!(before.contains("Biology"));
    assert_eq!(coord.mapping().unwrap().groups_for("b2").len(), 1);
}

#[test]
fn older_result_arriving_first_is_discarded() {
    let mut coord = coordinator();
    let first = coord.request(ai_graph(), "AI").unwrap();
    let second = coord.request(biology_graph(), "Bio").unwrap();

    assert_eq!(coord.complete(block_on(first.resolve())), Completion::Stale);
    assert_eq!(coord.state(), &RenderState::Rendering { generation: 2 });
    assert!(coord.tree().is_none());

    assert!(matches!(
        coord.complete(block_on(second.resolve())),
        Completion::Applied { generation: 2, .. }
    ));
}

#[test]
fn failure_clears_the_previous_map() {
    let renderer = Rc::new(FlakyRenderer::default());
    let mut coord = RenderCoordinator::new(renderer.clone()).with_surface(surface());
    block_on(coord.render(ai_graph(), "AI"));
    assert!(coord.tree().is_some());

    renderer.fail.set(true);
    assert_eq!(
        block_on(coord.render(biology_graph(), "Bio")),
        Completion::Failed { generation: 2 }
    );
    assert!(coord.tree().is_none());
    assert!(coord.export().is_none());
    match coord.state() {
        RenderState::Failed(failure) => {
            assert_eq!(failure.generation, 2);
            assert!(failure.message.contains("layout engine crashed"));
            assert!(matches!(failure.error, RenderError::Engine { .. }));
        }
        other => panic!("unexpected state: {other:?}"),
    }

    renderer.fail.set(false);
    assert!(matches!(
        block_on(coord.render(biology_graph(), "Bio")),
        Completion::Applied { .. }
    ));
}

#[test]
fn syntax_errors_surface_as_failures() {
    let mut coord = coordinator();
    let out = conceptmap_render::RenderOutput {
        generation: coord.request(ai_graph(), "AI").unwrap().generation(),
        result: HeadlessMindmapRenderer::default().render_sync("not a mindmap"),
    };
    assert_eq!(coord.complete(out), Completion::Failed { generation: 1 });
}

#[test]
fn zero_sized_surface_defers_until_resized() {
    let mut coord = RenderCoordinator::new(Rc::new(HeadlessMindmapRenderer::default()));
    assert!(coord.request(ai_graph(), "AI").is_none());
    assert_eq!(coord.state(), &RenderState::Deferred);
    // A newer request replaces the held one.
    assert!(coord.request(biology_graph(), "Bio").is_none());

    assert!(coord.surface_resized(SurfaceSize::new(0.0, 400.0)).is_none());
    let pending = coord.surface_resized(surface()).unwrap();
    assert!(pending.text().contains("root((Biology))"));
    assert!(coord.surface_resized(surface()).is_none());

    assert!(matches!(
        coord.complete(block_on(pending.resolve())),
        Completion::Applied { .. }
    ));
    assert_eq!(
        block_on(coord.render(ai_graph(), "AI")),
        Completion::Applied {
            generation: 4,
            matched: 3
        }
    );
}

#[test]
fn render_reports_deferral() {
    let mut coord = RenderCoordinator::new(Rc::new(HeadlessMindmapRenderer::default()));
    assert_eq!(block_on(coord.render(ai_graph(), "AI")), Completion::Deferred);
}

#[test]
fn deadline_turns_a_hung_render_into_a_timeout() {
    let mut coord = RenderCoordinator::new(Rc::new(NeverRenderer)).with_surface(surface());
    let pending = coord.request(ai_graph(), "AI").unwrap();
    let out = block_on(pending.resolve_until(futures::future::ready(())));
    assert!(matches!(out.result, Err(RenderError::TimedOut)));
    assert_eq!(coord.complete(out), Completion::Failed { generation: 1 });
}

#[test]
fn clicking_a_node_reports_its_concept() {
    let clicked: Rc<RefCell<Vec<String>>> = Rc::default();
    let mut coord = coordinator();
    let sink = Rc::clone(&clicked);
    coord.on_concept_click(move |concept| sink.borrow_mut().push(concept.id.to_string()));
    block_on(coord.render(ai_graph(), "AI"));

    let group = coord.mapping().unwrap().groups_for("c2")[0];
    let hover = coord.dispatch(group, PointerEvent::Enter);
    assert_eq!(hover.handled, 1);
    let g = coord.tree().unwrap().group(group).unwrap();
    assert_eq!(g.label_style.get("font-weight"), Some("bold"));

    let click = coord.dispatch(group, PointerEvent::Click);
    assert!(click.propagation_stopped);
    assert_eq!(clicked.borrow().as_slice(), ["c2"]);
}

#[test]
fn new_request_detaches_previous_handlers_immediately() {
    let mut coord = coordinator();
    block_on(coord.render(ai_graph(), "AI"));
    assert_eq!(coord.tree().unwrap().listener_count(), 9);

    let pending = coord.request(biology_graph(), "Bio").unwrap();
    assert_eq!(coord.tree().unwrap().listener_count(), 0);

    coord.complete(block_on(pending.resolve()));
    // Only the new tree's two mapped nodes carry listeners.
    assert_eq!(coord.tree().unwrap().listener_count(), 6);
}

#[test]
fn teardown_invalidates_in_flight_renders() {
    let mut coord = coordinator();
    block_on(coord.render(ai_graph(), "AI"));
    let pending = coord.request(biology_graph(), "Bio").unwrap();
    coord.teardown();
    assert_eq!(coord.state(), &RenderState::Idle);
    assert!(coord.tree().is_none());
    assert_eq!(coord.complete(block_on(pending.resolve())), Completion::Stale);
    assert!(coord.tree().is_none());
}

#[test]
fn export_is_byte_identical_to_renderer_markup() {
    let mut coord = coordinator();
    assert!(coord.export().is_none());
    block_on(coord.render(ai_graph(), "AI Overview"));
    let expected = HeadlessMindmapRenderer::default()
        .render_sync(&conceptmap_core::generate(&ai_graph(), "AI Overview"))
        .unwrap();

    // Hover state must not leak into the export.
    let group = coord.mapping().unwrap().groups_for("c1")[0];
    coord.dispatch(group, PointerEvent::Enter);

    let artifact = coord.export().unwrap();
    assert_eq!(artifact.file_name, "ai-overview.svg");
    assert_eq!(artifact.mime_type, "image/svg+xml");
    assert_eq!(artifact.bytes, expected.markup().as_bytes());
}
