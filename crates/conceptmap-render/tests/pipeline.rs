use conceptmap_core::{ConceptGraph, generate};
use conceptmap_render::{HeadlessMindmapRenderer, reconcile};

fn fixture(json: &str) -> ConceptGraph {
    ConceptGraph::from_json_str(json).unwrap()
}

#[test]
fn json_graph_round_trips_through_headless_render() {
    let graph = fixture(
        r#"{"concepts": [
            {"id": "c1", "label": "Artificial Intelligence", "type": "main", "connections": ["c2", "c5"]},
            {"id": "c2", "label": "Machine Learning", "type": "secondary", "connections": ["c3", "c4"]},
            {"id": "c3", "label": "Neural Networks", "type": "tertiary"},
            {"id": "c4", "label": "Decision Trees", "type": "tertiary"},
            {"id": "c5", "label": "Robotics", "type": "secondary", "connections": ["c3"]},
            {"id": "c6", "label": "Expert Systems", "type": "tertiary"}
        ]}"#,
    );
    let text = generate(&graph, "AI Overview");
    let tree = HeadlessMindmapRenderer::default().render_sync(&text).unwrap();
    let report = reconcile(&graph, &tree);

    // Neural Networks is listed under both secondaries.
    assert_eq!(report.mapping.len(), 6);
    assert_eq!(report.mapping.groups_for("c3").len(), 2);
    assert!(report.mapping.groups_for("c6").is_empty());
    assert!(report.unmatched.is_empty());

    let svg = roxmltree::Document::parse(tree.markup()).unwrap();
    let sections: Vec<_> = svg
        .descendants()
        .filter_map(|n| n.attribute("class"))
        .filter(|c| c.starts_with("mindmap-node "))
        .collect();
    assert_eq!(
        sections,
        [
            "mindmap-node section-root",
            "mindmap-node section-0",
            "mindmap-node section-0",
            "mindmap-node section-0",
            "mindmap-node section-1",
            "mindmap-node section-1",
        ]
    );
}

#[test]
fn truncated_and_wrapped_labels_still_map() {
    let graph = fixture(
        r#"[
            {"id": "r", "label": "Learning Systems", "type": "main", "connections": ["s"]},
            {"id": "s", "label": "Reinforcement Learning Algorithms", "type": "secondary", "connections": ["t"]},
            {"id": "t", "label": "An Extraordinarilylongword Here", "type": "tertiary"}
        ]"#,
    );
    let text = generate(&graph, "t");
    assert!(text.contains("    Reinforcement Learning...\n"));
    assert!(text.contains("      An Extraordinarilylo...\n"));

    let tree = HeadlessMindmapRenderer::default().render_sync(&text).unwrap();
    let wrapped = tree
        .groups()
        .iter()
        .find(|g| g.text_runs.len() > 1)
        .expect("a label wider than the node width wraps");
    assert!(wrapped.has_class("mindmap-node"));

    let report = reconcile(&graph, &tree);
    let by_concept: Vec<_> = report
        .mapping
        .iter()
        .map(|m| (m.concept.as_str(), m.strategy))
        .collect();
    assert_eq!(
        by_concept,
        [("r", "exact"), ("s", "prefix"), ("t", "prefix")]
    );
}

#[test]
fn empty_graph_renders_placeholder_without_mappings() {
    let graph = fixture("[]");
    let text = generate(&graph, "Nothing Yet");
    let tree = HeadlessMindmapRenderer::default().render_sync(&text).unwrap();
    assert!(tree.markup().contains("No concepts yet"));
    let report = reconcile(&graph, &tree);
    assert!(report.mapping.is_empty());
    assert_eq!(report.unmatched.len(), 2);
}

#[test]
fn overlong_words_and_cjk_labels_keep_their_interaction() {
    let graph = fixture(
        r#"[
            {"id": "n", "label": "Neuroscience", "type": "main", "connections": ["e"]},
            {"id": "e", "label": "Electroencephalography", "type": "secondary", "connections": ["u"]},
            {"id": "u", "label": "東京大学大学院情報理工学系研究科", "type": "tertiary"}
        ]"#,
    );
    let text = generate(&graph, "Brain");
    let tree = HeadlessMindmapRenderer::default().render_sync(&text).unwrap();
    let report = reconcile(&graph, &tree);

    assert!(report.unmatched.is_empty(), "{:?}", report.unmatched);
    let by_concept: Vec<_> = report
        .mapping
        .iter()
        .map(|m| (m.concept.as_str(), m.text.as_str(), m.strategy))
        .collect();
    assert_eq!(
        by_concept,
        [
            ("n", "Neuroscience", "exact"),
            ("e", "Electroencephalography", "exact"),
            ("u", "東京大学大学院情報理工学系研究科", "exact"),
        ]
    );
}

#[test]
fn percent_signs_in_labels_render_every_node() {
    let graph = fixture(
        r#"[
            {"id": "r", "label": "Growth 50%%", "type": "main", "connections": ["s"]},
            {"id": "s", "label": "Margin %% notes", "type": "secondary", "connections": ["t"]},
            {"id": "t", "label": "%%", "type": "tertiary"}
        ]"#,
    );
    let text = generate(&graph, "Finance");
    let tree = HeadlessMindmapRenderer::default()
        .render_sync(&text)
        .expect("labels with percent signs render");

    let shown: Vec<_> = tree
        .groups()
        .iter()
        .filter(|g| g.has_class("mindmap-node"))
        .map(|g| tree.text_of(g.id()))
        .collect();
    assert_eq!(shown, ["Growth 50%", "Margin % notes", "%"]);

    let report = reconcile(&graph, &tree);
    assert_eq!(report.mapping.len(), 2);
    assert_eq!(report.mapping.groups_for("s").len(), 1);
}
