use thiserror::Error;
use uniplan_types::Stage;

#[derive(Debug, Error)]
pub enum StageError {
    /// A stage ran before the stage that fills its input
    #[error("{stage} stage requires `{field}` in the planner state")]
    MissingInput { stage: Stage, field: &'static str },

    #[error("{stage} stage got unusable model output: {message}")]
    InvalidOutput { stage: Stage, message: String },

    #[error("{stage} stage got an empty model response")]
    EmptyResponse { stage: Stage },
}

impl StageError {
    pub fn stage(&self) -> Stage {
        match self {
            StageError::MissingInput { stage, .. }
            | StageError::InvalidOutput { stage, .. }
            | StageError::EmptyResponse { stage } => *stage,
        }
    }
}
