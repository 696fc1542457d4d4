use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{KgError, Result};

/// Node payload: `{"id", "label", "name", "description"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Category tag (UNIVERSITY, MAJOR, LOCATION, ...)
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    /// Any further keys the producer attached, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Directed edge payload: `{"id", "source", "target", "label", "description"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub source: String,
    #[serde(deserialize_with = "id_string")]
    pub target: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `{"data": {...}}` wrapper the graph widget expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub data: EdgeData,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            data: NodeData {
                id: id.into(),
                label: label.into(),
                name: name.into(),
                description: String::new(),
                extra: Map::new(),
            },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.data.description = description.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }
}

impl GraphEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            data: EdgeData {
                id: id.into(),
                source: source.into(),
                target: target.into(),
                label: label.into(),
                description: String::new(),
                extra: Map::new(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn source(&self) -> &str {
        &self.data.source
    }

    pub fn target(&self) -> &str {
        &self.data.target
    }
}

/// Full node/edge payload as produced by the formatter stage.
///
/// Missing (or null) `nodes`/`edges` keys read as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default, deserialize_with = "nullable_list")]
    pub nodes: Vec<GraphNode>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub edges: Vec<GraphEdge>,
}

/// What `KnowledgeGraph::normalize` had to discard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub duplicate_nodes: usize,
    pub duplicate_edges: usize,
    pub dangling_edges: usize,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_nodes == 0 && self.duplicate_edges == 0 && self.dangling_edges == 0
    }
}

impl KnowledgeGraph {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Strict parse of model output. A surrounding code fence is stripped,
    /// anything else must be the JSON object itself.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(uniplan_llm::strip_code_fences(text))
            .map_err(|e| KgError::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Typed view of an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(KgError::NotAnObject(KgError::json_kind(&value)));
        }
        serde_json::from_value(value).map_err(|e| KgError::InvalidElement(e.to_string()))
    }

    /// Drop duplicate ids (first occurrence wins) and edges whose endpoints
    /// are not nodes of this graph.
    pub fn normalize(self) -> (Self, LoadReport) {
        let mut report = LoadReport::default();

        let mut node_ids = HashSet::new();
        let nodes: Vec<GraphNode> = self
            .nodes
            .into_iter()
            .filter(|n| {
                let fresh = node_ids.insert(n.data.id.clone());
                if !fresh {
                    report.duplicate_nodes += 1;
                }
                fresh
            })
            .collect();

        let mut edge_ids = HashSet::new();
        let edges: Vec<GraphEdge> = self
            .edges
            .into_iter()
            .filter(|e| {
                if !node_ids.contains(e.source()) || !node_ids.contains(e.target()) {
                    report.dangling_edges += 1;
                    return false;
                }
                let fresh = edge_ids.insert(e.data.id.clone());
                if !fresh {
                    report.duplicate_edges += 1;
                }
                fresh
            })
            .collect();

        (Self { nodes, edges }, report)
    }
}

/// Where a graph comes from: raw model text, parsed JSON, or typed already
#[derive(Debug, Clone)]
pub enum GraphSource {
    Text(String),
    Json(Value),
    Graph(KnowledgeGraph),
}

impl GraphSource {
    pub fn into_graph(self) -> Result<KnowledgeGraph> {
        match self {
            GraphSource::Text(text) => KnowledgeGraph::parse(&text),
            GraphSource::Json(value) => KnowledgeGraph::from_value(value),
            GraphSource::Graph(graph) => Ok(graph),
        }
    }
}

impl From<&str> for GraphSource {
    fn from(text: &str) -> Self {
        GraphSource::Text(text.to_string())
    }
}

impl From<String> for GraphSource {
    fn from(text: String) -> Self {
        GraphSource::Text(text)
    }
}

impl From<Value> for GraphSource {
    fn from(value: Value) -> Self {
        GraphSource::Json(value)
    }
}

impl From<KnowledgeGraph> for GraphSource {
    fn from(graph: KnowledgeGraph) -> Self {
        GraphSource::Graph(graph)
    }
}

// Models emit numeric ids often enough that they are accepted and stringified
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, found {}",
            KgError::json_kind(&other)
        ))),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Ok(other.to_string()),
    }
}

fn nullable_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
