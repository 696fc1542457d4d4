use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uniplan_llm::Tool;
use uniplan_types::LLMConfig;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    NotFound(String),

    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("LLM call failed in '{tool}': {message}")]
    Llm { tool: String, message: String },
}

/// A tool the gather stage can offer to the model.
///
/// Implementations turn recoverable backend failures (database, web search)
/// into descriptive output strings and reserve `Err` for calls that could not
/// be attempted at all.
#[async_trait]
pub trait PlannerTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn input_schema(&self) -> Value;

    /// `llm` carries the run's model settings for tools that call the model
    async fn execute(&self, arguments: Value, llm: &LLMConfig) -> Result<String, ToolError>;

    fn to_llm_tool(&self) -> Tool {
        Tool::function(self.name(), self.description(), self.input_schema())
    }
}
