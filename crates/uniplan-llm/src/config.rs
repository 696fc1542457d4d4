// Configuration layer for provider-agnostic client creation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::{OpenAIClient, GROQ_API_BASE, OPENAI_API_BASE};

/// Type of LLM provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    Groq,
    OpenAI,
    /// Any other OpenAI-compatible endpoint
    Custom,
}

impl ProviderType {
    fn default_base_url(self) -> Option<&'static str> {
        match self {
            ProviderType::Groq => Some(GROQ_API_BASE),
            ProviderType::OpenAI => Some(OPENAI_API_BASE),
            ProviderType::Custom => None,
        }
    }
}

/// Complete provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: ProviderType,
    pub api_key: String,
    pub model: String,
    /// Overrides the provider's default endpoint; required for `Custom`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Groq-hosted model, the planner's default backend
    pub fn groq(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::Groq,
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::OpenAI,
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Endpoint the client will talk to
    pub fn resolved_base_url(&self) -> Result<String> {
        self.base_url
            .clone()
            .or_else(|| self.provider.default_base_url().map(str::to_string))
            .ok_or_else(|| anyhow::anyhow!("base_url is required for a custom provider"))
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_chat_client(config: &ProviderConfig) -> Result<Arc<dyn crate::traits::ChatClient>> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("API key for provider {:?} is empty", config.provider);
        }
        let base_url = config.resolved_base_url()?;
        tracing::info!(provider = ?config.provider, model = %config.model, %base_url, "Creating chat client");

        let client = OpenAIClient::with_base_url(&config.api_key, base_url, &config.model)?;
        Ok(Arc::new(client))
    }
}
