//! Agents: backend-managed automated workers

use crate::serde_util::string_or_number;
use serde::{Deserialize, Serialize};

/// Agent kind, used as the `:type` path segment of the execute endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentKind {
    /// Sales outreach agent
    Sales,
    /// Finance agent
    Finance,
    /// Legal agent
    Legal,
    /// Marketing agent
    Marketing,
    /// Market research agent
    MarketResearch,
    /// Site scan / KYC agent
    SiteScan,
    /// Kind this console does not know, preserved verbatim
    Other(String),
}

impl AgentKind {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sales => "sales",
            Self::Finance => "finance",
            Self::Legal => "legal",
            Self::Marketing => "marketing",
            Self::MarketResearch => "market_research",
            Self::SiteScan => "site_scan",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for AgentKind {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().replace('-', "_").as_str() {
            "sales" => Self::Sales,
            "finance" => Self::Finance,
            "legal" => Self::Legal,
            "marketing" => Self::Marketing,
            "market_research" | "research" => Self::MarketResearch,
            "site_scan" | "sitescan" | "kyc" => Self::SiteScan,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for AgentKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<AgentKind> for String {
    fn from(kind: AgentKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Agent run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Accepting work
    Active,
    /// Paused by an operator
    Paused,
    /// Faulted
    Error,
    /// Status string this console does not know
    #[serde(other)]
    Unknown,
}

impl AgentStatus {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

/// Agent record from `GET /agents`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Agent identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Agent kind
    #[serde(rename = "type")]
    pub kind: AgentKind,
    /// Run state
    pub status: AgentStatus,
}

impl Agent {
    /// Whether the agent is accepting work
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_kinds_parse() {
        assert_eq!(AgentKind::from("sales"), AgentKind::Sales);
        assert_eq!(AgentKind::from("market-research"), AgentKind::MarketResearch);
        assert_eq!(AgentKind::from("SITE_SCAN"), AgentKind::SiteScan);
    }

    #[test]
    fn unknown_kind_is_preserved() {
        let kind = AgentKind::from("procurement");
        assert_eq!(kind, AgentKind::Other("procurement".to_string()));
        assert_eq!(kind.as_str(), "procurement");
    }

    #[test]
    fn agent_roundtrips_type_field() {
        let agent: Agent = serde_json::from_value(json!({
            "id": "a1",
            "name": "Finance Bot",
            "type": "finance",
            "status": "paused"
        }))
        .unwrap();

        assert_eq!(agent.kind, AgentKind::Finance);
        assert!(!agent.is_active());

        let back = serde_json::to_value(&agent).unwrap();
        assert_eq!(back["type"], "finance");
        assert_eq!(back["status"], "paused");
    }
}
