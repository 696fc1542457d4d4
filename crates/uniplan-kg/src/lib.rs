pub mod types;
pub mod error;
pub mod view;
pub mod action;
pub mod styles;

pub use types::{EdgeData, GraphEdge, GraphNode, GraphSource, KnowledgeGraph, LoadReport, NodeData};
pub use error::{KgError, Result};
pub use view::{Elements, GraphView};
pub use action::NodeAction;
pub use styles::{EdgeStyle, GraphStyles, NodeStyle};
