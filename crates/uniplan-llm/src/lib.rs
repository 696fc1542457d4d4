pub mod types;
pub mod traits;
pub mod openai;
pub mod config;
pub mod prompt;
pub mod output;

pub use traits::{ChatClient, ChatRequest, ChatResponse, ChatOptions, TokenUsage};

pub use openai::OpenAIClient;
pub use config::{ClientFactory, ProviderConfig, ProviderType};
pub use prompt::PromptTemplate;
pub use output::{extract_json, strip_code_fences};
pub use types::{Message, Tool, ToolCall, ToolChoice, FunctionCall, FunctionDefinition};
