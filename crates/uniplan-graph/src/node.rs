use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use uniplan_llm::{ChatClient, ChatOptions, ChatResponse, Message};
use uniplan_tools::ToolRegistry;
use uniplan_types::{LLMConfig, PipelineEvent, PlannerState, Stage};

pub type EventSender = mpsc::Sender<PipelineEvent>;

/// Core abstraction for one stage of the pipeline
#[async_trait]
pub trait Node: Send + Sync {
    /// Run the stage, reading its inputs from and writing its outputs to `state`
    async fn execute(&self, state: &mut PlannerState, ctx: &RunContext) -> Result<()>;

    fn stage(&self) -> Stage;
}

/// Shared handles a stage needs during one run
#[derive(Clone)]
pub struct RunContext {
    pub client: Arc<dyn ChatClient>,
    pub tools: Arc<ToolRegistry>,
    pub llm_config: LLMConfig,
    events: Option<EventSender>,
}

impl RunContext {
    pub fn new(client: Arc<dyn ChatClient>, tools: Arc<ToolRegistry>, llm_config: LLMConfig) -> Self {
        Self {
            client,
            tools,
            llm_config,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Forward an event when the run is being streamed
    pub async fn emit(&self, event: PipelineEvent) -> Result<()> {
        if let Some(tx) = &self.events {
            tx.send(event).await?;
        }
        Ok(())
    }

    /// Chat call with the run's model settings, plus any stage-specific options
    pub async fn chat(&self, messages: Vec<Message>, extra: Option<ChatOptions>) -> Result<ChatResponse> {
        let mut request = self.llm_config.request(messages);
        if let Some(extra) = extra {
            request.options.tools = extra.tools;
            request.options.tool_choice = extra.tool_choice;
        }
        self.client.chat(request).await
    }
}
