use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KgError {
    #[error("Invalid knowledge graph JSON: {0}")]
    InvalidJson(String),

    #[error("Knowledge graph must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("Malformed knowledge graph element: {0}")]
    InvalidElement(String),
}

impl KgError {
    pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
            serde_json::Value::Object(_) => "an object",
        }
    }
}

pub type Result<T> = std::result::Result<T, KgError>;
