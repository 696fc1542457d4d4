use std::sync::Arc;
use uniplan_graph::Pipeline;
use uniplan_tools::UniversityDatabase;
use crate::config::Config;
use crate::sessions::SessionStore;

/// Shared application state passed to all handlers
///
/// The pipeline is stateless and built once at startup; sessions are the only
/// mutable part.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<Pipeline>,
    pub database: Arc<UniversityDatabase>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, pipeline: Pipeline, database: Arc<UniversityDatabase>) -> Self {
        let sessions = SessionStore::new(config.sessions.max_sessions);
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            database,
            sessions,
        }
    }

    /// Per-run LLM settings taken from config
    pub fn planner_input(&self, query: &str) -> uniplan_types::PlannerInput {
        uniplan_types::PlannerInput::new(query).with_llm_config(self.config.llm_config())
    }
}
