pub mod node;
pub mod router;
pub mod nodes;
pub mod pipeline;
pub mod builder;
pub mod error;
pub mod prompts;

pub use node::{Node, RunContext, EventSender};
pub use router::{Router, NextNode, LinearRouter};
pub use pipeline::Pipeline;
pub use builder::PipelineBuilder;
pub use error::StageError;

// Re-export key types from uniplan-types
pub use uniplan_types::{
    PlannerState, PlannerInput, GraphConfig, LLMConfig, PipelineEvent, Stage, ToolOutcome, UserPersona,
};
