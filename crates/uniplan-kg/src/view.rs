use serde::Serialize;
use std::collections::HashSet;

use crate::action::NodeAction;
use crate::error::{KgError, Result};
use crate::types::{GraphEdge, GraphNode, GraphSource, KnowledgeGraph, LoadReport};

/// Filtered, interactive view over one immutable knowledge graph.
///
/// The universe is fixed at load time. Only the visible id sets change, and
/// after every mutation an edge is visible iff both its endpoints are.
#[derive(Debug, Clone, Default)]
pub struct GraphView {
    universe: KnowledgeGraph,
    visible_nodes: HashSet<String>,
    visible_edges: HashSet<String>,
    load_error: Option<KgError>,
    load_report: LoadReport,
}

/// Visible subset, borrowed from the universe in universe order
#[derive(Debug, Clone, Serialize)]
pub struct Elements<'a> {
    pub nodes: Vec<&'a GraphNode>,
    pub edges: Vec<&'a GraphEdge>,
}

impl Elements<'_> {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

impl GraphView {
    /// Load a graph, never failing.
    ///
    /// On a parse or shape error the view is empty and the error is kept for
    /// the caller in [`GraphView::load_error`].
    pub fn load(source: impl Into<GraphSource>) -> Self {
        match Self::try_load(source) {
            Ok(view) => view,
            Err(e) => {
                tracing::warn!(error = %e, "No valid knowledge graph data available");
                Self {
                    load_error: Some(e),
                    ..Self::default()
                }
            }
        }
    }

    /// Load a graph, returning the parse error instead of an empty view
    pub fn try_load(source: impl Into<GraphSource>) -> Result<Self> {
        let graph = source.into().into_graph()?;
        Ok(Self::from_graph(graph))
    }

    /// Everything visible initially
    pub fn from_graph(graph: KnowledgeGraph) -> Self {
        let (universe, load_report) = graph.normalize();
        if !load_report.is_clean() {
            tracing::warn!(
                duplicate_nodes = load_report.duplicate_nodes,
                duplicate_edges = load_report.duplicate_edges,
                dangling_edges = load_report.dangling_edges,
                "Discarded inconsistent knowledge graph elements"
            );
        }

        let mut view = Self {
            universe,
            load_report,
            ..Self::default()
        };
        view.reset();

        tracing::debug!(
            nodes = view.visible_nodes.len(),
            edges = view.visible_edges.len(),
            "Knowledge graph loaded"
        );
        view
    }

    pub fn load_error(&self) -> Option<&KgError> {
        self.load_error.as_ref()
    }

    pub fn load_report(&self) -> LoadReport {
        self.load_report
    }

    pub fn universe(&self) -> &KnowledgeGraph {
        &self.universe
    }

    pub fn visible_node_ids(&self) -> &HashSet<String> {
        &self.visible_nodes
    }

    pub fn visible_edge_ids(&self) -> &HashSet<String> {
        &self.visible_edges
    }

    pub fn get_elements(&self) -> Elements<'_> {
        Elements {
            nodes: self
                .universe
                .nodes
                .iter()
                .filter(|n| self.visible_nodes.contains(n.id()))
                .collect(),
            edges: self
                .universe
                .edges
                .iter()
                .filter(|e| self.visible_edges.contains(e.id()))
                .collect(),
        }
    }

    /// Hide the given nodes and every edge touching them
    pub fn remove<I, S>(&mut self, node_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in node_ids {
            self.visible_nodes.remove(id.as_ref());
        }
        self.update_edges();
        tracing::debug!(visible_nodes = self.visible_nodes.len(), "Removed nodes from view");
    }

    /// Reveal the neighbours of the given nodes.
    ///
    /// For each edge with exactly one endpoint in `node_ids`, the other
    /// endpoint becomes visible. The ids themselves are not made visible.
    pub fn expand<I, S>(&mut self, node_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: Vec<S> = node_ids.into_iter().collect();
        let requested: HashSet<&str> = requested.iter().map(AsRef::as_ref).collect();

        let mut new_nodes = Vec::new();
        for edge in &self.universe.edges {
            let source_in = requested.contains(edge.source());
            let target_in = requested.contains(edge.target());
            match (source_in, target_in) {
                (true, false) => new_nodes.push(edge.target()),
                (false, true) => new_nodes.push(edge.source()),
                _ => {}
            }
        }

        let before = self.visible_nodes.len();
        for id in new_nodes {
            if !self.visible_nodes.contains(id) {
                self.visible_nodes.insert(id.to_string());
            }
        }
        self.update_edges();
        tracing::debug!(
            added = self.visible_nodes.len() - before,
            visible_nodes = self.visible_nodes.len(),
            "Expanded nodes in view"
        );
    }

    /// Dispatch a widget action payload
    pub fn apply(&mut self, action: &NodeAction) {
        match action {
            NodeAction::Remove { node_ids } => self.remove(node_ids),
            NodeAction::Expand { node_ids } => self.expand(node_ids),
        }
    }

    /// Make the whole universe visible again
    pub fn reset(&mut self) {
        self.visible_nodes = self.universe.nodes.iter().map(|n| n.id().to_string()).collect();
        self.update_edges();
    }

    fn update_edges(&mut self) {
        self.visible_edges = self
            .universe
            .edges
            .iter()
            .filter(|e| self.visible_nodes.contains(e.source()) && self.visible_nodes.contains(e.target()))
            .map(|e| e.id().to_string())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> KnowledgeGraph {
        KnowledgeGraph::new(
            vec![
                GraphNode::new("A", "UNIVERSITY", "A"),
                GraphNode::new("B", "MAJOR", "B"),
                GraphNode::new("C", "LOCATION", "C"),
            ],
            vec![GraphEdge::new("ab", "A", "B", "OFFERS"), GraphEdge::new("bc", "B", "C", "IN")],
        )
    }

    #[test]
    fn test_remove_then_expand_neighbour_restores_edges() {
        let mut view = GraphView::from_graph(chain());
        view.remove(["B"]);
        view.expand(["A"]);

        assert!(view.visible_node_ids().contains("B"));
        assert!(view.visible_edge_ids().contains("ab"));
        assert!(view.visible_edge_ids().contains("bc"));
    }

    #[test]
    fn test_expand_ignores_edges_inside_the_set() {
        let mut view = GraphView::from_graph(chain());
        view.remove(["A", "B"]);
        view.expand(["A", "B"]);

        // ab has both endpoints requested; only bc contributes (C, already visible)
        assert_eq!(view.visible_node_ids().len(), 1);
        assert!(view.visible_node_ids().contains("C"));
        assert!(view.visible_edge_ids().is_empty());
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut view = GraphView::from_graph(chain());
        view.remove(["nope"]);
        view.expand(["nope"]);
        assert_eq!(view.visible_node_ids().len(), 3);
        assert_eq!(view.visible_edge_ids().len(), 2);
    }

    #[test]
    fn test_reset_restores_universe() {
        let mut view = GraphView::from_graph(chain());
        view.remove(["A", "B", "C"]);
        assert!(view.get_elements().is_empty());

        view.reset();
        assert_eq!(view.get_elements().nodes.len(), 3);
        assert_eq!(view.get_elements().edges.len(), 2);
    }

    #[test]
    fn test_elements_keep_universe_order() {
        let view = GraphView::from_graph(chain());
        let ids: Vec<&str> = view.get_elements().nodes.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }
}
