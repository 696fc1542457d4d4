use crate::database::UniversityDatabase;
use crate::tool::{PlannerTool, ToolError};
use crate::university::{SqlTool, SqlToolKind};
use crate::weather::{TavilyClient, WeatherTool};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uniplan_llm::{ChatClient, Tool};
use uniplan_types::LLMConfig;

/// Tools available to the gather stage, looked up by name
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn PlannerTool>>,
    // Registration order, so the model sees a stable tool list
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four planner tools over one database, web-search client and model
    pub fn planner_tools(
        db: Arc<UniversityDatabase>,
        tavily: TavilyClient,
        client: Arc<dyn ChatClient>,
    ) -> Self {
        let mut registry = Self::new();
        for kind in SqlToolKind::ALL {
            registry.register(SqlTool::new(kind, db.clone(), client.clone()));
        }
        registry.register(WeatherTool::new(tavily, client));
        registry
    }

    /// Add a tool; a tool with the same name is replaced
    pub fn register(&mut self, tool: impl PlannerTool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn PlannerTool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!(tool = %name, "Replacing previously registered tool");
        } else {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn PlannerTool>> {
        self.tools.get(name)
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All tools in LLM function-calling format
    pub fn llm_tools(&self) -> Vec<Tool> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.to_llm_tool())
            .collect()
    }

    pub async fn execute(
        &self,
        name: &str,
        arguments: Value,
        llm: &LLMConfig,
    ) -> Result<String, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        tracing::debug!(tool = %name, arguments = %arguments, "Executing tool");
        tool.execute(arguments, llm).await
    }
}
