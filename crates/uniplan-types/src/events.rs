use crate::stage::Stage;
use crate::state::PlannerState;
use serde::{Deserialize, Serialize};

/// Progress events emitted by a background pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunStarted {
        run_id: String,
        query: String,
        timestamp: i64,
    },

    StageStarted {
        stage: Stage,
    },

    StageCompleted {
        stage: Stage,
        duration_ms: u64,
    },

    /// A gather-stage tool call finished
    ToolResult {
        tool_name: String,
        is_error: bool,
        duration_ms: u64,
        output: String,
    },

    /// Terminal success event carrying the final state
    Completed {
        state: Box<PlannerState>,
        total_duration_ms: u64,
    },

    /// Terminal failure event
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        stage: Option<Stage>,
    },
}

impl PipelineEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineEvent::Completed { .. } | PipelineEvent::Error { .. })
    }

    /// SSE event name
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineEvent::RunStarted { .. } => "run_started",
            PipelineEvent::StageStarted { .. } => "stage_started",
            PipelineEvent::StageCompleted { .. } => "stage",
            PipelineEvent::ToolResult { .. } => "tool_result",
            PipelineEvent::Completed { .. } => "completed",
            PipelineEvent::Error { .. } => "error",
        }
    }
}
