use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Guard against a router that never reaches `End`
    pub max_stages: usize,
    /// Whole-run deadline; `None` waits on external calls indefinitely
    #[serde(default)]
    pub execution_timeout: Option<Duration>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_stages: 16,
            execution_timeout: None,
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_stages(mut self, max: usize) -> Self {
        self.max_stages = max;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = Some(timeout);
        self
    }
}

/// Per-request model settings applied by every stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Falls back to the client's default model when unset
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl LLMConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn chat_options(&self) -> uniplan_llm::ChatOptions {
        let mut options = uniplan_llm::ChatOptions::new();
        if let Some(temp) = self.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = self.max_tokens {
            options = options.max_tokens(max_tokens);
        }
        options
    }

    /// Chat request carrying this config's model and sampling options
    pub fn request(&self, messages: Vec<uniplan_llm::Message>) -> uniplan_llm::ChatRequest {
        let request = uniplan_llm::ChatRequest::new(messages).with_options(self.chat_options());
        match &self.model {
            Some(model) => request.with_model(model.clone()),
            None => request,
        }
    }
}
