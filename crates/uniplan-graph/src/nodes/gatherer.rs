use crate::error::StageError;
use crate::node::{Node, RunContext};
use crate::prompts;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Instant;
use uniplan_llm::{ChatOptions, ToolCall, ToolChoice};
use uniplan_types::{PipelineEvent, PlannerState, Stage, ToolOutcome};

/// Lets the model pick tools for the query and runs each requested call once
pub struct GathererNode;

impl GathererNode {
    async fn run_call(call: &ToolCall, ctx: &RunContext) -> ToolOutcome {
        let start = Instant::now();
        let name = call.name().to_string();

        let (arguments, result) = match call.arguments_value() {
            Ok(arguments) => {
                let result = ctx.tools.execute(&name, arguments.clone(), &ctx.llm_config).await;
                (arguments, result.map_err(|e| format!("Tool execution failed: {}", e)))
            }
            Err(e) => (
                serde_json::Value::String(call.function.arguments.clone()),
                Err(format!("Invalid tool arguments: {}", e)),
            ),
        };

        let (output, is_error) = match result {
            Ok(output) => (output, false),
            Err(message) => {
                tracing::warn!(tool = %name, error = %message, "Tool call failed");
                (message, true)
            }
        };

        ToolOutcome {
            tool_name: name,
            arguments,
            output,
            is_error,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[async_trait]
impl Node for GathererNode {
    async fn execute(&self, state: &mut PlannerState, ctx: &RunContext) -> Result<()> {
        let persona = state.user_persona.as_ref().ok_or(StageError::MissingInput {
            stage: Stage::Gather,
            field: "user_persona",
        })?;
        let persona = serde_json::to_string(persona)?;

        let messages = prompts::GATHERER.render(&[
            ("query", state.query.as_str()),
            ("persona", persona.as_str()),
        ])?;
        let options = ChatOptions::new()
            .tools(ctx.tools.llm_tools())
            .tool_choice(ToolChoice::Auto);
        let response = ctx.chat(messages, Some(options)).await?;

        if response.tool_calls.is_empty() {
            tracing::info!("Model requested no tools");
        }

        let mut seen = HashSet::new();
        for call in &response.tool_calls {
            // serde_json maps are key-sorted, so equal arguments print identically
            let arguments_key = call
                .arguments_value()
                .map(|value| value.to_string())
                .unwrap_or_else(|_| call.function.arguments.trim().to_string());
            if !seen.insert((call.name().to_string(), arguments_key)) {
                tracing::info!(tool = %call.name(), "Skipping duplicate tool call");
                continue;
            }

            tracing::info!(tool = %call.name(), "Executing tool");
            let outcome = Self::run_call(call, ctx).await;

            ctx.emit(PipelineEvent::ToolResult {
                tool_name: outcome.tool_name.clone(),
                is_error: outcome.is_error,
                duration_ms: outcome.duration_ms,
                output: outcome.output.clone(),
            })
            .await?;
            state.record_tool_outcome(outcome);
        }

        state.gathered = true;
        Ok(())
    }

    fn stage(&self) -> Stage {
        Stage::Gather
    }
}
