//! Request bodies posted to the backend

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /agents/:type/execute`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// Action name
    pub action: String,
    /// Action input
    pub input: Map<String, Value>,
}

impl ExecuteRequest {
    /// Request with empty input
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            input: Map::new(),
        }
    }

    /// Add an input field
    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.input.insert(key.into(), value.into());
        self
    }
}

/// Who chose the MCC code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MccSource {
    /// Accepted the system's primary suggestion
    System,
    /// Operator override
    Manual,
}

/// Body of `POST /tasks/:id/mcc`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MccSelection {
    /// Selected merchant category code
    pub mcc_code: String,
    /// Reason for overriding the primary suggestion
    pub override_reason: Option<String>,
    /// Selection source
    pub source: MccSource,
    /// Operator identity
    pub selected_by: String,
}

/// Body of `POST /integrations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIntegration {
    /// Display name
    pub name: String,
    /// Service type
    #[serde(rename = "type")]
    pub service: String,
    /// Service-specific configuration
    pub config: Map<String, Value>,
}
