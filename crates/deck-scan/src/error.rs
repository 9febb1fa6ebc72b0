//! Payload parse errors
//!
//! These never leave the normalizer as failures: the locator logs them and
//! degrades to "no payload", which renders as raw text.

/// Why a text blob did not yield a JSON object
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// Nothing left after stripping fences and whitespace
    #[error("payload is empty")]
    Empty,

    /// Neither the text nor any braced span in it parsed as JSON
    #[error("payload is not JSON: {0}")]
    NotJson(String),

    /// Parsed, but the top-level value is not an object
    #[error("payload is JSON but not an object (got {0})")]
    NotAnObject(&'static str),
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
