//! Integrations: connections to third-party services (CRM, email, chat)

use crate::serde_util::{lenient_timestamp, string_or_number};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Integration connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    /// Connected and syncing
    Connected,
    /// Configured but not connected
    Disconnected,
    /// Faulted
    Error,
    /// Status string this console does not know
    #[serde(other)]
    Unknown,
}

impl IntegrationStatus {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

/// Integration record from `GET /integrations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    /// Integration identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Service type, e.g. `crm`, `email`, `slack`
    #[serde(rename = "type")]
    pub service: String,
    /// Connection state
    pub status: IntegrationStatus,
    /// Last successful sync
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_sync: Option<DateTime<Utc>>,
    /// Service-specific configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

impl Integration {
    /// Whether the integration is connected
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status == IntegrationStatus::Connected
    }
}
