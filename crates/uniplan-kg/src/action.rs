use serde::{Deserialize, Serialize};

/// Action payload emitted by the graph widget:
/// `{"action": "remove" | "expand", "data": {"node_ids": [...]}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum NodeAction {
    Remove { node_ids: Vec<String> },
    Expand { node_ids: Vec<String> },
}

impl NodeAction {
    pub fn name(&self) -> &'static str {
        match self {
            NodeAction::Remove { .. } => "remove",
            NodeAction::Expand { .. } => "expand",
        }
    }

    pub fn node_ids(&self) -> &[String] {
        match self {
            NodeAction::Remove { node_ids } | NodeAction::Expand { node_ids } => node_ids,
        }
    }
}
