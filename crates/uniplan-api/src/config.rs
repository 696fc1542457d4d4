use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use uniplan_llm::{ProviderConfig, ProviderType};
use uniplan_tools::DEFAULT_DATABASE_PATH;
use uniplan_types::{GraphConfig, LLMConfig};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(skip)]
    pub llm_api_key: String,
    #[serde(skip)]
    pub tavily_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on health and session requests; plan runs are not cut
    /// short by it
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DATABASE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderType,
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Required when `provider = "custom"`
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::Groq,
            model: "llama-3.1-8b-instant".to_string(),
            temperature: None,
            max_tokens: None,
            base_url: None,
        }
    }
}

impl From<LlmConfig> for LLMConfig {
    fn from(config: LlmConfig) -> Self {
        Self {
            model: Some(config.model),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub max_stages: usize,
    /// Whole-run deadline; 0 disables it
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_stages: GraphConfig::default().max_stages,
            timeout_secs: 0,
        }
    }
}

impl From<&PipelineConfig> for GraphConfig {
    fn from(config: &PipelineConfig) -> Self {
        let graph = GraphConfig::new().with_max_stages(config.max_stages);
        if config.timeout_secs > 0 {
            graph.with_timeout(Duration::from_secs(config.timeout_secs))
        } else {
            graph
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// Oldest graph sessions are evicted past this count
    pub max_sessions: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self { max_sessions: 1000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. UNIPLAN_-prefixed variables, `__` between levels (UNIPLAN_SERVER__PORT)
    /// 4. The short names DATABASE_PATH, LLM_MODEL, LOG_LEVEL, LOG_FORMAT
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything
            .add_source(
                Environment::with_prefix("UNIPLAN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            cfg.database.path = path;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            cfg.llm.model = model;
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            cfg.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            cfg.logging.format = format;
        }

        // Load secrets from ENV (not in TOML)
        cfg.llm_api_key = ["LLM_API_KEY", "GROQ_API_KEY", "OPENAI_API_KEY"]
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
            .ok_or_else(|| {
                ConfigError::Message(
                    "LLM_API_KEY (or GROQ_API_KEY / OPENAI_API_KEY) environment variable is required"
                        .to_string(),
                )
            })?;
        cfg.tavily_api_key = std::env::var("TAVILY_API_KEY").unwrap_or_default();

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.llm.provider,
            api_key: self.llm_api_key.clone(),
            model: self.llm.model.clone(),
            base_url: self.llm.base_url.clone(),
        }
    }

    pub fn llm_config(&self) -> LLMConfig {
        self.llm.clone().into()
    }

    pub fn graph_config(&self) -> GraphConfig {
        (&self.pipeline).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 3000

            [cors]
            enabled = true
            origins = ["http://localhost:8501"]

            [database]
            path = "/data/ipeds.db"

            [llm]
            provider = "groq"
            model = "llama-3.1-8b-instant"
            temperature = 0.2

            [pipeline]
            max_stages = 8
            timeout_secs = 120

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 300);
        assert_eq!(config.database.path, "/data/ipeds.db");
        assert_eq!(config.llm.provider, ProviderType::Groq);

        let graph = config.graph_config();
        assert_eq!(graph.max_stages, 8);
        assert_eq!(graph.execution_timeout, Some(Duration::from_secs(120)));

        let llm = config.llm_config();
        assert_eq!(llm.model.as_deref(), Some("llama-3.1-8b-instant"));
        assert_eq!(llm.temperature, Some(0.2));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.database.path, "data/ipeds_data.db");
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert!(config.graph_config().execution_timeout.is_none());
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_custom_provider_takes_base_url() {
        let mut config: Config = toml::from_str(
            r#"
            [llm]
            provider = "custom"
            model = "local-model"
            base_url = "http://localhost:11434/v1"
        "#,
        )
        .unwrap();
        config.llm_api_key = "key".into();

        let provider = config.provider_config();
        assert_eq!(provider.resolved_base_url().unwrap(), "http://localhost:11434/v1");
    }
}
