use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use uniplan_kg::{GraphStyles, GraphView, NodeAction};

use crate::error::{ApiError, ApiResult};

/// One plan run's interactive graph
#[derive(Debug)]
pub struct Session {
    pub run_id: String,
    pub report: Option<String>,
    pub view: GraphView,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(run_id: impl Into<String>, report: Option<String>, view: GraphView) -> Self {
        Self {
            run_id: run_id.into(),
            report,
            view,
            created_at: Utc::now(),
        }
    }

    /// Why the graph may be emptier than the model intended
    pub fn warning(&self) -> Option<String> {
        if let Some(e) = self.view.load_error() {
            return Some(format!("Knowledge graph could not be loaded: {}", e));
        }
        let report = self.view.load_report();
        if report.is_clean() {
            None
        } else {
            Some(format!(
                "Discarded {} duplicate node(s), {} duplicate edge(s) and {} dangling edge(s)",
                report.duplicate_nodes, report.duplicate_edges, report.dangling_edges
            ))
        }
    }
}

/// Visible graph of a session as sent to the client
#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot {
    pub session_id: String,
    pub elements: Value,
    pub styles: GraphStyles,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl GraphSnapshot {
    fn capture(session_id: &str, session: &Session) -> ApiResult<Self> {
        let elements = session.view.get_elements();
        let styles = GraphStyles::for_elements(&elements);
        let elements = serde_json::to_value(&elements).map_err(|e| {
            tracing::error!(session_id, error = %e, "Failed to serialize graph elements");
            ApiError::Internal
        })?;

        Ok(Self {
            session_id: session_id.to_string(),
            elements,
            styles,
            warning: session.warning(),
        })
    }
}

/// In-memory graph sessions keyed by uuid
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Store a session and return its snapshot, evicting the oldest past capacity
    pub async fn create(&self, session: Session) -> ApiResult<GraphSnapshot> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let mut sessions = self.inner.write().await;

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.created_at)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    tracing::info!(session_id = %id, "Evicting oldest graph session");
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        let snapshot = GraphSnapshot::capture(&session_id, &session)?;
        tracing::info!(
            session_id = %session_id,
            run_id = %session.run_id,
            "Graph session created"
        );
        sessions.insert(session_id, session);
        Ok(snapshot)
    }

    pub async fn snapshot(&self, session_id: &str) -> ApiResult<GraphSnapshot> {
        let sessions = self.inner.read().await;
        let session = sessions
            .get(session_id)
            .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))?;
        GraphSnapshot::capture(session_id, session)
    }

    pub async fn apply(&self, session_id: &str, action: &NodeAction) -> ApiResult<GraphSnapshot> {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))?;

        tracing::debug!(
            session_id,
            action = action.name(),
            node_ids = ?action.node_ids(),
            "Applying graph action"
        );
        session.view.apply(action);
        GraphSnapshot::capture(session_id, session)
    }

    pub async fn reset(&self, session_id: &str) -> ApiResult<GraphSnapshot> {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))?;
        session.view.reset();
        GraphSnapshot::capture(session_id, session)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
