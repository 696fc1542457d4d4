use serde_json::json;
use std::collections::HashSet;
use uniplan_kg::{GraphView, KgError, KnowledgeGraph, NodeAction};

fn abc_json() -> serde_json::Value {
    json!({
        "nodes": [
            {"data": {"id": "A", "label": "UNIVERSITY", "name": "MIT", "description": "Cambridge, MA"}},
            {"data": {"id": "B", "label": "MAJOR", "name": "Computer Science", "description": "Course 6"}},
            {"data": {"id": "C", "label": "LOCATION", "name": "Boston", "description": "Metro area"}}
        ],
        "edges": [
            {"data": {"id": "A-B", "source": "A", "target": "B", "label": "OFFERS", "description": ""}},
            {"data": {"id": "B-C", "source": "B", "target": "C", "label": "STUDIED_IN", "description": ""}}
        ]
    })
}

fn ids<'a>(items: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    items.into_iter().map(str::to_string).collect()
}

/// Edge visible iff both endpoints visible, for every universe edge
fn assert_edge_invariant(view: &GraphView) {
    let nodes = view.visible_node_ids();
    for edge in &view.universe().edges {
        let expected = nodes.contains(edge.source()) && nodes.contains(edge.target());
        assert_eq!(
            view.visible_edge_ids().contains(edge.id()),
            expected,
            "edge {} visibility out of sync",
            edge.id()
        );
    }
    assert!(nodes.iter().all(|id| view.universe().nodes.iter().any(|n| n.id() == id)));
}

#[test]
fn test_round_trip_without_actions() {
    let text = abc_json().to_string();
    let view = GraphView::load(text.as_str());
    assert!(view.load_error().is_none());

    let expected: KnowledgeGraph = serde_json::from_value(abc_json()).unwrap();
    let elements = view.get_elements();
    let nodes: Vec<_> = elements.nodes.into_iter().cloned().collect();
    let edges: Vec<_> = elements.edges.into_iter().cloned().collect();
    assert_eq!(nodes, expected.nodes);
    assert_eq!(edges, expected.edges);

    let serialized = serde_json::to_value(view.get_elements()).unwrap();
    assert_eq!(serialized, abc_json());
}

#[test]
fn test_remove_middle_node_drops_both_edges() {
    let mut view = GraphView::load(abc_json());
    view.remove(["B"]);

    assert_eq!(view.visible_node_ids(), &ids(["A", "C"]));
    assert!(view.visible_edge_ids().is_empty());
    assert_edge_invariant(&view);
}

#[test]
fn test_expand_after_remove_follows_universe_edges() {
    let mut view = GraphView::load(abc_json());
    view.remove(["B"]);
    view.expand(["A"]);

    // A-B has exactly one endpoint in {A}, so B comes back with both edges
    assert_eq!(view.visible_node_ids(), &ids(["A", "B", "C"]));
    assert_eq!(view.visible_edge_ids(), &ids(["A-B", "B-C"]));
    assert_edge_invariant(&view);
}

#[test]
fn test_expand_isolated_node_changes_nothing() {
    let mut view = GraphView::load(json!({
        "nodes": [{"data": {"id": "A"}}, {"data": {"id": "B"}}, {"data": {"id": "C"}}],
        "edges": [{"data": {"id": "B-C", "source": "B", "target": "C"}}]
    }));
    view.remove(["B"]);
    view.expand(["A"]);

    assert_eq!(view.visible_node_ids(), &ids(["A", "C"]));
    assert!(view.visible_edge_ids().is_empty());
}

#[test]
fn test_expand_on_fresh_graph() {
    let mut view = GraphView::load(json!({
        "nodes": [{"data": {"id": "A"}}, {"data": {"id": "B"}}, {"data": {"id": "C"}}],
        "edges": [{"data": {"id": "A-B", "source": "A", "target": "B"}}]
    }));
    view.expand(["A"]);

    assert_eq!(view.visible_node_ids(), &ids(["A", "B", "C"]));
    assert_eq!(view.visible_edge_ids(), &ids(["A-B"]));
}

#[test]
fn test_invalid_json_yields_empty_view() {
    let view = GraphView::load("not valid json");

    assert!(matches!(view.load_error(), Some(KgError::InvalidJson(_))));
    assert!(view.get_elements().is_empty());
    assert!(view.universe().is_empty());
}

#[test]
fn test_multibyte_fenced_text_yields_empty_view() {
    let view = GraphView::load("```日本 graph```");

    assert!(matches!(view.load_error(), Some(KgError::InvalidJson(_))));
    assert!(view.get_elements().is_empty());
}

#[test]
fn test_prose_wrapped_json_is_rejected() {
    let view = GraphView::load(r#"garbage {"nodes": [{"data": {"id": "A"}}]} trailing"#);

    assert!(view.load_error().is_some());
    assert!(view.universe().is_empty());
}

#[test]
fn test_empty_edges_key() {
    let view = GraphView::load(json!({
        "nodes": [{"data": {"id": "A"}}, {"data": {"id": "B"}}],
        "edges": []
    }));

    assert_eq!(view.get_elements().nodes.len(), 2);
    assert!(view.get_elements().edges.is_empty());
}

#[test]
fn test_missing_keys_default_to_empty() {
    let view = GraphView::load(json!({"nodes": [{"data": {"id": "A"}}]}));
    assert!(view.load_error().is_none());
    assert_eq!(view.get_elements().nodes.len(), 1);

    let view = GraphView::load(json!({}));
    assert!(view.load_error().is_none());
    assert!(view.get_elements().is_empty());
}

#[test]
fn test_missing_required_id_reports_error() {
    let view = GraphView::load(json!({
        "nodes": [{"data": {"id": "A"}}],
        "edges": [{"data": {"id": "e", "source": "A"}}]
    }));

    assert!(matches!(view.load_error(), Some(KgError::InvalidElement(_))));
    assert!(view.get_elements().is_empty());
}

#[test]
fn test_expand_is_idempotent() {
    let mut once = GraphView::load(abc_json());
    once.remove(["A", "C"]);
    once.expand(["B"]);

    let mut twice = GraphView::load(abc_json());
    twice.remove(["A", "C"]);
    twice.expand(["B"]);
    twice.expand(["B"]);

    assert_eq!(once.visible_node_ids(), twice.visible_node_ids());
    assert_eq!(once.visible_edge_ids(), twice.visible_edge_ids());
    assert_edge_invariant(&twice);
}

#[test]
fn test_invariant_holds_across_action_sequence() {
    let mut view = GraphView::load(json!({
        "nodes": [
            {"data": {"id": "mit"}}, {"data": {"id": "harvard"}}, {"data": {"id": "cs"}},
            {"data": {"id": "boston"}}, {"data": {"id": "tuition"}}
        ],
        "edges": [
            {"data": {"id": "1", "source": "mit", "target": "cs"}},
            {"data": {"id": "2", "source": "harvard", "target": "cs"}},
            {"data": {"id": "3", "source": "mit", "target": "boston"}},
            {"data": {"id": "4", "source": "harvard", "target": "boston"}},
            {"data": {"id": "5", "source": "mit", "target": "tuition"}},
            {"data": {"id": "6", "source": "mit", "target": "cs"}}
        ]
    }));

    let actions = [
        NodeAction::Remove { node_ids: vec!["cs".into(), "boston".into()] },
        NodeAction::Expand { node_ids: vec!["harvard".into()] },
        NodeAction::Remove { node_ids: vec!["mit".into()] },
        NodeAction::Expand { node_ids: vec!["tuition".into(), "cs".into()] },
        NodeAction::Remove { node_ids: vec!["harvard".into(), "tuition".into()] },
    ];

    for action in &actions {
        view.apply(action);
        assert_edge_invariant(&view);
    }
}

#[test]
fn test_action_payload_drives_view() {
    let mut view = GraphView::load(abc_json());
    let action: NodeAction = serde_json::from_value(json!({
        "action": "remove",
        "data": {"node_ids": ["A"]}
    }))
    .unwrap();

    view.apply(&action);
    assert_eq!(view.visible_node_ids(), &ids(["B", "C"]));
    assert_eq!(view.visible_edge_ids(), &ids(["B-C"]));
}

#[test]
fn test_dangling_edges_never_become_visible() {
    let mut view = GraphView::load(json!({
        "nodes": [{"data": {"id": "A"}}],
        "edges": [{"data": {"id": "A-ghost", "source": "A", "target": "ghost"}}]
    }));

    assert_eq!(view.load_report().dangling_edges, 1);
    view.expand(["A"]);
    assert_eq!(view.visible_node_ids(), &ids(["A"]));
    assert!(view.get_elements().edges.is_empty());
}
