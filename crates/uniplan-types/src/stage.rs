use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the fixed planning pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Plan,
    Gather,
    Recommend,
    Format,
}

impl Stage {
    /// Execution order
    pub const ALL: [Stage; 4] = [Stage::Plan, Stage::Gather, Stage::Recommend, Stage::Format];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Gather => "gather",
            Stage::Recommend => "recommend",
            Stage::Format => "format",
        }
    }

    /// Human-facing progress label ("Plan", "Gather", ...)
    pub fn title(&self) -> &'static str {
        match self {
            Stage::Plan => "Plan",
            Stage::Gather => "Gather",
            Stage::Recommend => "Recommend",
            Stage::Format => "Format",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
