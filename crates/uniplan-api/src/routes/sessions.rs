use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use uniplan_kg::NodeAction;

use crate::{error::ApiResult, sessions::GraphSnapshot, state::AppState};

pub async fn get_graph(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<GraphSnapshot>> {
    Ok(Json(state.sessions.snapshot(&session_id).await?))
}

/// Apply a remove/expand payload from the graph widget
pub async fn apply_action(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(action): Json<NodeAction>,
) -> ApiResult<Json<GraphSnapshot>> {
    Ok(Json(state.sessions.apply(&session_id, &action).await?))
}

pub async fn reset_graph(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<GraphSnapshot>> {
    Ok(Json(state.sessions.reset(&session_id).await?))
}
