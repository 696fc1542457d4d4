use crate::error::StageError;
use crate::node::{Node, RunContext};
use crate::prompts;
use anyhow::Result;
use async_trait::async_trait;
use uniplan_types::{PlannerState, Stage};

pub struct RecommenderNode;

#[async_trait]
impl Node for RecommenderNode {
    async fn execute(&self, state: &mut PlannerState, ctx: &RunContext) -> Result<()> {
        if !state.gathered {
            return Err(StageError::MissingInput {
                stage: Stage::Recommend,
                field: "gathered data",
            }
            .into());
        }

        let all_data = serde_json::to_string_pretty(&state.gathered_data())?;
        let messages = prompts::RECOMMENDER.render(&[
            ("query", state.query.as_str()),
            ("all_data", all_data.as_str()),
        ])?;
        let response = ctx.chat(messages, None).await?;

        let report = response.content_or_empty().trim();
        if report.is_empty() {
            return Err(StageError::EmptyResponse { stage: Stage::Recommend }.into());
        }

        tracing::info!(chars = report.len(), "Recommendation report generated");
        state.report = Some(report.to_string());
        Ok(())
    }

    fn stage(&self) -> Stage {
        Stage::Recommend
    }
}
