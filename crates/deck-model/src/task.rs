//! Tasks: one unit of agent work
//!
//! A task is created by `POST /agents/:type/execute` and then mutated
//! entirely server-side. The console re-reads snapshots on each poll.

use crate::serde_util::{
    lenient_timestamp, null_as_default, opt_string_or_number, string_or_number,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known task actions
pub mod actions {
    /// Basic site scan
    pub const SITE_SCAN: &str = "site_scan";
    /// Comprehensive site scan (policy pages, MCC, content risk, RDAP, ...)
    pub const COMPREHENSIVE_SITE_SCAN: &str = "comprehensive_site_scan";
    /// KYC decision scan
    pub const KYC_SITE_SCAN: &str = "kyc_site_scan";

    /// All actions whose output is a scan report
    pub const SCAN_ACTIONS: &[&str] = &[SITE_SCAN, COMPREHENSIVE_SITE_SCAN, KYC_SITE_SCAN];
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Still running on the backend
    Processing,
    /// Finished with output
    Completed,
    /// Finished with an error
    Failed,
    /// Status string this console does not know
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Whether the backend will no longer change this task
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task snapshot as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Owning agent
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub agent_id: Option<String>,
    /// Action name, e.g. `site_scan`
    pub action: String,
    /// Lifecycle status
    pub status: TaskStatus,
    /// Creation time, `None` when missing or unreadable
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Completion time (terminal tasks only)
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    /// Free-form input mapping
    #[serde(default, deserialize_with = "null_as_default")]
    pub input: Map<String, Value>,
    /// Free-form output (mapping or string)
    #[serde(default)]
    pub output: Value,
    /// Error message for failed tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    /// Create a task snapshot with empty input and output
    #[must_use]
    pub fn new(id: impl Into<String>, action: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            agent_id: None,
            action: action.into(),
            status,
            created_at: Some(Utc::now()),
            completed_at: None,
            input: Map::new(),
            output: Value::Null,
            error: None,
        }
    }

    /// With output payload
    #[must_use]
    pub fn with_output(mut self, output: Value) -> Self {
        self.output = output;
        self
    }

    /// With error message
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// With owning agent
    #[must_use]
    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Whether this task's output is a scan report
    #[inline]
    #[must_use]
    pub fn is_scan(&self) -> bool {
        actions::SCAN_ACTIONS.contains(&self.action.as_str())
    }

    /// Target URL from the task input, if any
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        self.input.get("url").and_then(Value::as_str)
    }
}

/// One page of `GET /tasks`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPage {
    /// Tasks on this page
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
    /// Total tasks matching the query
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_deserializes_backend_shape() {
        let task: Task = serde_json::from_value(json!({
            "id": 42,
            "agentId": "agent-7",
            "action": "kyc_site_scan",
            "status": "completed",
            "createdAt": "2026-03-01T10:00:00Z",
            "completedAt": "2026-03-01T10:02:00Z",
            "input": {"url": "https://shop.example"},
            "output": {"response": "{}"}
        }))
        .unwrap();

        assert_eq!(task.id, "42");
        assert_eq!(task.agent_id.as_deref(), Some("agent-7"));
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.is_scan());
        assert_eq!(task.target_url(), Some("https://shop.example"));
    }

    #[test]
    fn task_tolerates_null_input_and_missing_output() {
        let task: Task = serde_json::from_value(json!({
            "id": "t1",
            "action": "send_email",
            "status": "processing",
            "createdAt": "2026-03-01T10:00:00Z",
            "input": null
        }))
        .unwrap();

        assert!(task.input.is_empty());
        assert_eq!(task.output, Value::Null);
        assert!(!task.is_scan());
    }

    #[test]
    fn unknown_status_maps_to_unknown() {
        let status: TaskStatus = serde_json::from_value(json!("queued")).unwrap();
        assert_eq!(status, TaskStatus::Unknown);
        assert!(!status.is_terminal());
    }

    #[test]
    fn terminal_statuses() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
    }

    #[test]
    fn odd_timestamps_do_not_lose_the_page() {
        let page: TaskPage = serde_json::from_value(json!({
            "tasks": [
                {
                    "id": "t1",
                    "action": "site_scan",
                    "status": "completed",
                    "createdAt": "2024-05-01T10:00:00.123456",
                    "completedAt": "soon"
                },
                {
                    "id": "t2",
                    "action": "site_scan",
                    "status": "processing",
                    "createdAt": 1714557600
                },
                {"id": "t3", "action": "site_scan", "status": "processing"}
            ],
            "total": 3
        }))
        .unwrap();

        assert_eq!(page.tasks.len(), 3);
        let naive = page.tasks[0].created_at.unwrap();
        assert_eq!(naive.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");
        assert_eq!(page.tasks[0].completed_at, None);
        assert_eq!(
            page.tasks[1].created_at.map(|at| at.timestamp()),
            Some(1_714_557_600)
        );
        assert_eq!(page.tasks[2].created_at, None);
    }

    #[test]
    fn task_page_with_null_tasks() {
        let page: TaskPage = serde_json::from_value(json!({"tasks": null, "total": 0})).unwrap();
        assert!(page.tasks.is_empty());
    }
}
