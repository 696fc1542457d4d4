use crate::config::LLMConfig;
use crate::persona::UserPersona;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uniplan_kg::KnowledgeGraph;

/// Tool names the gather stage knows how to route into state slots
pub mod tool_names {
    pub const UNIVERSITY_SEARCH: &str = "university_search";
    pub const UNIVERSITY_COMPARISON: &str = "university_comparison";
    pub const COST_ANALYSIS: &str = "cost_analysis";
    pub const WEATHER: &str = "get_weather_data";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerInput {
    pub query: String,
    #[serde(default)]
    pub llm_config: LLMConfig,
}

impl PlannerInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            llm_config: LLMConfig::default(),
        }
    }

    pub fn with_llm_config(mut self, llm_config: LLMConfig) -> Self {
        self.llm_config = llm_config;
        self
    }
}

/// One tool invocation made during the gather stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub tool_name: String,
    pub arguments: Value,
    pub output: String,
    pub is_error: bool,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerState {
    pub run_id: String,
    pub query: String,
    pub llm_config: LLMConfig,
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub user_persona: Option<UserPersona>,
    #[serde(default)]
    pub universities: Option<String>,
    #[serde(default)]
    pub comparison: Option<String>,
    #[serde(default)]
    pub courses: Option<String>,
    #[serde(default)]
    pub costs: Option<String>,
    #[serde(default)]
    pub location_details: Option<String>,
    #[serde(default)]
    pub tool_results: Vec<ToolOutcome>,
    /// Set once the gather stage finishes, even when no tool was called
    #[serde(default)]
    pub gathered: bool,
    #[serde(default)]
    pub report: Option<String>,
    #[serde(default)]
    pub knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    pub raw_knowledge_graph: Option<String>,
}

impl PlannerState {
    pub fn new(query: impl Into<String>) -> Self {
        Self::from_input(PlannerInput::new(query))
    }

    pub fn from_input(input: PlannerInput) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            query: input.query,
            llm_config: input.llm_config,
            started_at: Utc::now(),
            user_persona: None,
            universities: None,
            comparison: None,
            courses: None,
            costs: None,
            location_details: None,
            tool_results: Vec::new(),
            gathered: false,
            report: None,
            knowledge_graph: None,
            raw_knowledge_graph: None,
        }
    }

    /// Store a tool invocation and copy its output into the slot for that tool.
    /// Repeated calls to the same tool append to the slot.
    pub fn record_tool_outcome(&mut self, outcome: ToolOutcome) {
        let slot = match outcome.tool_name.as_str() {
            tool_names::UNIVERSITY_SEARCH => Some(&mut self.universities),
            tool_names::UNIVERSITY_COMPARISON => Some(&mut self.comparison),
            tool_names::COST_ANALYSIS => Some(&mut self.costs),
            tool_names::WEATHER => Some(&mut self.location_details),
            _ => None,
        };

        if let Some(slot) = slot {
            match slot {
                Some(existing) => {
                    existing.push_str("\n\n");
                    existing.push_str(&outcome.output);
                }
                None => *slot = Some(outcome.output.clone()),
            }
        }

        self.tool_results.push(outcome);
    }

    /// Everything gathered so far, as handed to the recommend stage
    pub fn gathered_data(&self) -> Value {
        json!({
            "user_persona": self.user_persona,
            "universities": self.universities,
            "comparison": self.comparison,
            "courses": self.courses,
            "costs": self.costs,
            "location_details": self.location_details,
        })
    }

    pub fn has_errors(&self) -> bool {
        self.tool_results.iter().any(|r| r.is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, output: &str) -> ToolOutcome {
        ToolOutcome {
            tool_name: name.to_string(),
            arguments: json!({}),
            output: output.to_string(),
            is_error: false,
            duration_ms: 3,
        }
    }

    #[test]
    fn test_new_state_is_empty() {
        let before = Utc::now();
        let state = PlannerState::new("CS schools in Boston");
        assert_eq!(state.query, "CS schools in Boston");
        assert!(state.started_at >= before && state.started_at <= Utc::now());
        assert!(!state.run_id.is_empty());
        assert!(state.user_persona.is_none());
        assert!(state.tool_results.is_empty());
        assert!(!state.gathered);
    }

    #[test]
    fn test_outcomes_routed_to_slots() {
        let mut state = PlannerState::new("q");
        state.record_tool_outcome(outcome(tool_names::UNIVERSITY_SEARCH, "MIT, BU"));
        state.record_tool_outcome(outcome(tool_names::COST_ANALYSIS, "$60k"));
        state.record_tool_outcome(outcome(tool_names::WEATHER, "Cold winters"));
        state.record_tool_outcome(outcome(tool_names::UNIVERSITY_COMPARISON, "MIT vs BU"));

        assert_eq!(state.universities.as_deref(), Some("MIT, BU"));
        assert_eq!(state.costs.as_deref(), Some("$60k"));
        assert_eq!(state.location_details.as_deref(), Some("Cold winters"));
        assert_eq!(state.comparison.as_deref(), Some("MIT vs BU"));
        assert_eq!(state.tool_results.len(), 4);
    }

    #[test]
    fn test_repeated_tool_appends() {
        let mut state = PlannerState::new("q");
        state.record_tool_outcome(outcome(tool_names::WEATHER, "Boston: cold"));
        state.record_tool_outcome(outcome(tool_names::WEATHER, "Austin: hot"));
        assert_eq!(state.location_details.as_deref(), Some("Boston: cold\n\nAustin: hot"));
    }

    #[test]
    fn test_unknown_tool_only_in_results() {
        let mut state = PlannerState::new("q");
        let mut failed = outcome("mystery", "Tool not found: mystery");
        failed.is_error = true;
        state.record_tool_outcome(failed);

        assert!(state.universities.is_none());
        assert_eq!(state.tool_results.len(), 1);
        assert!(state.has_errors());
    }

    #[test]
    fn test_gathered_data_shape() {
        let mut state = PlannerState::new("q");
        state.costs = Some("cheap".into());
        let data = state.gathered_data();
        assert_eq!(data["costs"], "cheap");
        assert!(data["universities"].is_null());
        assert!(data.get("report").is_none());
    }
}
