use crate::prompts;
use crate::tool::{PlannerTool, ToolError};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uniplan_llm::ChatClient;
use uniplan_types::LLMConfig;

pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

const DEFAULT_MAX_RESULTS: u32 = 5;
const WEATHER_TOOL_NAME: &str = "get_weather_data";

/// Minimal Tavily search client
#[derive(Clone)]
pub struct TavilyClient {
    api_key: String,
    endpoint: String,
    http: reqwest::Client,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: TAVILY_SEARCH_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub async fn search(&self, query: &str, max_results: u32) -> Result<Value> {
        if !self.has_api_key() {
            bail!("TAVILY_API_KEY is not set");
        }

        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({
                "api_key": self.api_key,
                "query": query,
                "max_results": max_results,
            }))
            .send()
            .await
            .context("Tavily request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Tavily returned {}: {}", status, body);
        }

        response.json().await.context("Invalid Tavily response")
    }
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    location: String,
}

/// Looks up current weather for a location via web search, then has the
/// model turn the raw results into a short report.
pub struct WeatherTool {
    tavily: TavilyClient,
    client: Arc<dyn ChatClient>,
}

impl WeatherTool {
    pub fn new(tavily: TavilyClient, client: Arc<dyn ChatClient>) -> Self {
        Self { tavily, client }
    }

    async fn report(&self, location: &str, llm: &LLMConfig) -> Result<String> {
        let results = self
            .tavily
            .search(&format!("current weather in {}", location), DEFAULT_MAX_RESULTS)
            .await?;
        let data = results.to_string();

        let messages = prompts::WEATHER_FORMAT.render(&[("location", location), ("data", data.as_str())])?;
        let response = self.client.chat(llm.request(messages)).await?;
        Ok(response.content_or_empty().trim().to_string())
    }
}

#[async_trait]
impl PlannerTool for WeatherTool {
    fn name(&self) -> &str {
        WEATHER_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get weather information for a specific location."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "City or region, e.g. \"Boston, MA\""}
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, arguments: Value, llm: &LLMConfig) -> Result<String, ToolError> {
        let args: WeatherArgs = serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
            tool: self.name().to_string(),
            message: e.to_string(),
        })?;

        match self.report(&args.location, llm).await {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::warn!(location = %args.location, error = %e, "Weather lookup failed");
                Ok(format!("Weather search error: {:#}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let err = TavilyClient::new("").search("weather", 1).await.unwrap_err();
        assert!(err.to_string().contains("TAVILY_API_KEY"));
    }
}
