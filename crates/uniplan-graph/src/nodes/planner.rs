use crate::error::StageError;
use crate::node::{Node, RunContext};
use crate::prompts;
use anyhow::Result;
use async_trait::async_trait;
use uniplan_types::{PlannerState, Stage, UserPersona};

/// Extracts structured preferences from the free-text query
pub struct PlannerNode;

#[async_trait]
impl Node for PlannerNode {
    async fn execute(&self, state: &mut PlannerState, ctx: &RunContext) -> Result<()> {
        let messages = prompts::PLANNER.render(&[("query", state.query.as_str())])?;
        let response = ctx.chat(messages, None).await?;
        let text = response.content_or_empty();
        tracing::debug!(response = %text, "Planner output");

        let persona = UserPersona::parse(text).map_err(|e| StageError::InvalidOutput {
            stage: Stage::Plan,
            message: format!("preferences are not a JSON object ({})", e),
        })?;

        tracing::info!(
            location = persona.location.as_deref().unwrap_or("-"),
            major = persona.major.as_deref().unwrap_or("-"),
            institution = persona.institution.as_deref().unwrap_or("-"),
            "Extracted user preferences"
        );
        state.user_persona = Some(persona);
        Ok(())
    }

    fn stage(&self) -> Stage {
        Stage::Plan
    }
}
