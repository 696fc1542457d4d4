use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

use tokio_stream::wrappers::ReceiverStream;
use uniplan_graph::PipelineEvent;

use crate::{
    error::ApiResult,
    routes::plans::{session_view, validate_query, PlanRequest},
    sessions::Session,
    state::AppState,
};

/// Run the planner and stream its progress using Server-Sent Events
///
/// Events: `run_started`, `stage_started`, `stage`, `tool_result`, then
/// exactly one of `completed` (with the new session) or `error`.
pub async fn create_plan_stream(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlanRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let query = validate_query(&req.query)?;
    tracing::info!(query = %query, "Streaming planning request received");

    let event_receiver = state.pipeline.spawn_run(state.planner_input(query));

    let sse_stream = ReceiverStream::new(event_receiver).then(move |event| {
        let state = state.clone();
        async move { Ok::<Event, Infallible>(to_sse(&state, event).await) }
    });

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

async fn to_sse(state: &AppState, event: PipelineEvent) -> Event {
    let kind = event.kind();
    let sse_event = match event {
        PipelineEvent::StageCompleted { stage, duration_ms } => Event::default()
            .event(kind)
            .json_data(json!({
                "stage": stage,
                "title": stage.title(),
                "duration_ms": duration_ms
            })),
        PipelineEvent::Completed {
            state: result,
            total_duration_ms,
        } => {
            let result = *result;
            let session = Session::new(
                result.run_id.clone(),
                result.report.clone(),
                session_view(result.knowledge_graph, result.raw_knowledge_graph),
            );
            match state.sessions.create(session).await {
                Ok(snapshot) => Event::default().event(kind).json_data(json!({
                    "session_id": snapshot.session_id,
                    "run_id": result.run_id,
                    "report": result.report,
                    "elements": snapshot.elements,
                    "styles": snapshot.styles,
                    "warning": snapshot.warning,
                    "total_duration_ms": total_duration_ms
                })),
                Err(e) => Event::default().event("error").json_data(json!({
                    "error": e.to_string()
                })),
            }
        }
        PipelineEvent::Error { message, stage } => {
            tracing::error!(error = %message, stage = ?stage, "Streaming run failed");
            Event::default().event(kind).json_data(json!({
                "error": message,
                "stage": stage
            }))
        }
        other => Event::default().event(kind).json_data(&other),
    };

    sse_event.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to encode SSE event");
        Event::default().event("error").data(r#"{"error":"Internal server error"}"#)
    })
}
