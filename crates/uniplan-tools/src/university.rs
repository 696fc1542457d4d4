use crate::database::{execute_sql_and_format, UniversityDatabase};
use crate::prompts;
use crate::tool::{PlannerTool, ToolError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use uniplan_llm::{ChatClient, PromptTemplate};
use uniplan_types::LLMConfig;

/// The three database-backed tools differ only in name, description and prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlToolKind {
    Search,
    Comparison,
    Cost,
}

impl SqlToolKind {
    pub const ALL: [SqlToolKind; 3] = [SqlToolKind::Search, SqlToolKind::Comparison, SqlToolKind::Cost];

    pub fn name(&self) -> &'static str {
        match self {
            SqlToolKind::Search => "university_search",
            SqlToolKind::Comparison => "university_comparison",
            SqlToolKind::Cost => "cost_analysis",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SqlToolKind::Search => {
                "Search for universities based on location, major, institution, or degree level."
            }
            SqlToolKind::Comparison => {
                "Compare multiple universities and return a comparison table. Put every university to compare in `institution`, comma-separated."
            }
            SqlToolKind::Cost => "Analyze costs for universities and return a cost comparison table.",
        }
    }

    fn sql_prompt(&self) -> &'static PromptTemplate {
        match self {
            SqlToolKind::Search => &prompts::SEARCH_SQL,
            SqlToolKind::Comparison => &prompts::COMPARISON_SQL,
            SqlToolKind::Cost => &prompts::COST_SQL,
        }
    }

    fn format_prompt(&self) -> &'static PromptTemplate {
        match self {
            SqlToolKind::Search => &prompts::SEARCH_FORMAT,
            SqlToolKind::Comparison => &prompts::COMPARISON_FORMAT,
            SqlToolKind::Cost => &prompts::COST_FORMAT,
        }
    }
}

/// Arguments shared by the SQL tools; the model may send `null` or omit any of them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlToolArgs {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub degree_level: Option<String>,
}

impl SqlToolArgs {
    fn field(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or("")
    }
}

/// Model writes SQL, the database runs it, the model formats the rows
pub struct SqlTool {
    kind: SqlToolKind,
    db: Arc<UniversityDatabase>,
    client: Arc<dyn ChatClient>,
}

impl SqlTool {
    pub fn new(kind: SqlToolKind, db: Arc<UniversityDatabase>, client: Arc<dyn ChatClient>) -> Self {
        Self { kind, db, client }
    }

    pub fn kind(&self) -> SqlToolKind {
        self.kind
    }

    async fn complete(
        &self,
        llm: &LLMConfig,
        template: &PromptTemplate,
        vars: &[(&str, &str)],
    ) -> Result<String, ToolError> {
        let llm_error = |e: anyhow::Error| ToolError::Llm {
            tool: self.kind.name().to_string(),
            message: format!("{:#}", e),
        };

        let messages = template.render(vars).map_err(llm_error)?;
        let response = self
            .client
            .chat(llm.request(messages))
            .await
            .map_err(llm_error)?;
        Ok(response.content_or_empty().trim().to_string())
    }

    async fn run_query(&self, sql: String) -> String {
        let db = self.db.clone();
        match tokio::task::spawn_blocking(move || execute_sql_and_format(&db, &sql)).await {
            Ok(rows) => rows,
            Err(e) => format!("Database error: {}", e),
        }
    }

    async fn schema(&self) -> String {
        let db = self.db.clone();
        match tokio::task::spawn_blocking(move || db.schema()).await {
            Ok(Ok(schema)) => schema,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Could not read database schema");
                String::from("(unavailable)")
            }
            Err(e) => {
                tracing::warn!(error = %e, "Schema task failed");
                String::from("(unavailable)")
            }
        }
    }
}

#[async_trait]
impl PlannerTool for SqlTool {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn description(&self) -> &str {
        self.kind.description()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "City, state or region"},
                "major": {"type": "string", "description": "Field of study"},
                "institution": {"type": "string", "description": "University name(s), comma-separated"},
                "degree_level": {"type": "string", "description": "e.g. bachelor's, master's, doctorate"}
            },
            "required": []
        })
    }

    async fn execute(&self, arguments: Value, llm: &LLMConfig) -> Result<String, ToolError> {
        let args: SqlToolArgs = serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
            tool: self.kind.name().to_string(),
            message: e.to_string(),
        })?;
        let start = Instant::now();

        let schema = self.schema().await;
        let sql = self
            .complete(
                llm,
                self.kind.sql_prompt(),
                &[
                    ("schema", schema.as_str()),
                    ("rules", prompts::SQL_RULES),
                    ("location", SqlToolArgs::field(&args.location)),
                    ("major", SqlToolArgs::field(&args.major)),
                    ("institution", SqlToolArgs::field(&args.institution)),
                    ("degree_level", SqlToolArgs::field(&args.degree_level)),
                ],
            )
            .await?;
        tracing::debug!(tool = self.kind.name(), sql = %sql, "Generated SQL");

        let rows = self.run_query(sql).await;
        let formatted = self
            .complete(llm, self.kind.format_prompt(), &[("data", rows.as_str())])
            .await?;

        tracing::info!(
            tool = self.kind.name(),
            duration_ms = start.elapsed().as_millis() as u64,
            "SQL tool finished"
        );
        Ok(formatted)
    }
}
