pub mod state;
pub mod events;
pub mod config;
pub mod persona;
pub mod stage;

pub use state::{PlannerInput, PlannerState, ToolOutcome, tool_names};
pub use events::PipelineEvent;
pub use config::{GraphConfig, LLMConfig};
pub use persona::UserPersona;
pub use stage::Stage;
