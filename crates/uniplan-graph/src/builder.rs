use std::sync::Arc;
use anyhow::{Result, anyhow};

use uniplan_llm::ChatClient;
use uniplan_tools::ToolRegistry;
use uniplan_types::GraphConfig;

use crate::pipeline::Pipeline;
use crate::router::Router;

/// Builder for constructing a Pipeline from explicitly created handles
pub struct PipelineBuilder {
    chat_client: Option<Arc<dyn ChatClient>>,
    tools: Option<Arc<ToolRegistry>>,
    config: GraphConfig,
    router: Option<Arc<dyn Router>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            chat_client: None,
            tools: None,
            config: GraphConfig::default(),
            router: None,
        }
    }

    /// Set the chat client shared by every stage and tool
    pub fn chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.chat_client = Some(client);
        self
    }

    /// Set the tools offered to the gather stage
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default linear stage order
    pub fn router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let chat_client = self.chat_client
            .ok_or_else(|| anyhow!("Chat client is required"))?;
        let tools = self.tools
            .ok_or_else(|| anyhow!("Tool registry is required"))?;

        if self.config.max_stages == 0 {
            return Err(anyhow!("max_stages must be at least 1"));
        }

        Ok(match self.router {
            Some(router) => Pipeline::with_router(chat_client, tools, self.config, router),
            None => Pipeline::new(chat_client, tools, self.config),
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
