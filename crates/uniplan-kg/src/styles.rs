use serde::Serialize;
use std::collections::BTreeSet;

use crate::view::Elements;

pub const PALETTE: [&str; 8] = [
    "#FF7F3E", "#2A629A", "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#FFC107",
];

const UNKNOWN_NODE_LABEL: &str = "UNKNOWN";
const UNKNOWN_EDGE_LABEL: &str = "RELATED";

/// Renderer hint for one node category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeStyle {
    pub label: String,
    pub color: &'static str,
    /// Node field shown as the on-canvas caption
    pub caption: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeStyle {
    pub label: String,
    pub caption: &'static str,
    pub directed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStyles {
    pub nodes: Vec<NodeStyle>,
    pub edges: Vec<EdgeStyle>,
}

impl GraphStyles {
    /// One style per distinct label among the visible elements.
    /// Labels are sorted so colours are stable across requests.
    pub fn for_elements(elements: &Elements<'_>) -> Self {
        let node_labels: BTreeSet<&str> = elements
            .nodes
            .iter()
            .map(|n| non_empty_or(&n.data.label, UNKNOWN_NODE_LABEL))
            .collect();
        let edge_labels: BTreeSet<&str> = elements
            .edges
            .iter()
            .map(|e| non_empty_or(&e.data.label, UNKNOWN_EDGE_LABEL))
            .collect();

        Self {
            nodes: node_labels
                .into_iter()
                .enumerate()
                .map(|(i, label)| NodeStyle {
                    label: label.to_string(),
                    color: PALETTE[i % PALETTE.len()],
                    caption: "label",
                })
                .collect(),
            edges: edge_labels
                .into_iter()
                .map(|label| EdgeStyle {
                    label: label.to_string(),
                    caption: "label",
                    directed: true,
                })
                .collect(),
        }
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GraphEdge, GraphNode, KnowledgeGraph};
    use crate::view::GraphView;

    #[test]
    fn test_styles_sorted_and_defaulted() {
        let graph = KnowledgeGraph::new(
            vec![
                GraphNode::new("mit", "UNIVERSITY", "MIT"),
                GraphNode::new("cs", "MAJOR", "Computer Science"),
                GraphNode::new("x", "", "Unlabelled"),
                GraphNode::new("harvard", "UNIVERSITY", "Harvard"),
            ],
            vec![GraphEdge::new("e1", "mit", "cs", "")],
        );
        let view = GraphView::from_graph(graph);
        let styles = GraphStyles::for_elements(&view.get_elements());

        let labels: Vec<&str> = styles.nodes.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["MAJOR", "UNIVERSITY", "UNKNOWN"]);
        assert_eq!(styles.nodes[0].color, PALETTE[0]);
        assert_eq!(styles.nodes[2].color, PALETTE[2]);

        assert_eq!(styles.edges.len(), 1);
        assert_eq!(styles.edges[0].label, "RELATED");
        assert!(styles.edges[0].directed);
    }

    #[test]
    fn test_palette_cycles() {
        let nodes = (0..10)
            .map(|i| GraphNode::new(format!("n{i}"), format!("L{i:02}"), "n"))
            .collect();
        let view = GraphView::from_graph(KnowledgeGraph::new(nodes, vec![]));
        let styles = GraphStyles::for_elements(&view.get_elements());

        assert_eq!(styles.nodes.len(), 10);
        assert_eq!(styles.nodes[8].color, PALETTE[0]);
        assert_eq!(styles.nodes[9].color, PALETTE[1]);
    }
}
