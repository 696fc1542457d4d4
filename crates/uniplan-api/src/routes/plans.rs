use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use uniplan_graph::Stage;
use uniplan_kg::{GraphStyles, GraphView, KnowledgeGraph};

use crate::{
    error::{ApiError, ApiResult},
    sessions::Session,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub session_id: String,
    pub run_id: String,
    /// Completed stage titles, in order
    pub steps: Vec<String>,
    pub report: Option<String>,
    pub elements: Value,
    pub styles: GraphStyles,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub(crate) fn validate_query(query: &str) -> ApiResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }
    Ok(query)
}

/// Build the session view for a finished run. Without a parsed graph the
/// raw formatter text is loaded so the failure lands in `load_error`.
pub(crate) fn session_view(graph: Option<KnowledgeGraph>, raw: Option<String>) -> GraphView {
    match (graph, raw) {
        (Some(graph), _) => GraphView::from_graph(graph),
        (None, Some(raw)) => GraphView::load(raw),
        (None, None) => GraphView::default(),
    }
}

/// Run the planner to completion and open a graph session over its result
pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlanRequest>,
) -> ApiResult<Json<PlanResponse>> {
    let query = validate_query(&req.query)?;
    tracing::info!(query = %query, "Planning request received");

    let mut steps = Vec::new();
    let result = state
        .pipeline
        .run(state.planner_input(query), |stage: Stage| {
            steps.push(stage.title().to_string())
        })
        .await?;

    let session = Session::new(
        result.run_id.clone(),
        result.report.clone(),
        session_view(result.knowledge_graph, result.raw_knowledge_graph),
    );
    let snapshot = state.sessions.create(session).await?;

    Ok(Json(PlanResponse {
        session_id: snapshot.session_id,
        run_id: result.run_id,
        steps,
        report: result.report,
        elements: snapshot.elements,
        styles: snapshot.styles,
        warning: snapshot.warning,
    }))
}
