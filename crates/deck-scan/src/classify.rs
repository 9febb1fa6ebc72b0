//! Schema classifier
//!
//! Decides once which of the known scan shapes a payload is, so that every
//! consumer matches on [`ScanResult`] instead of probing optional fields.
//!
//! Rules, first match wins:
//! 1. KYC markers (`decision`, `reason_codes`, `confidence_score`,
//!    `audit_trail`) on the payload, or on its `response` field (one level
//!    of unwrap, string-parsed if needed)
//! 2. `comprehensive_site_scan` → its nested object
//! 3. `compliance_checks` or `base_url` → legacy flat object
//! 4. anything else → unknown, kept as raw text

use crate::fields::Object;
use crate::locator::{locate, resolve};
use serde::Serialize;
use serde_json::Value;

/// Keys whose presence marks a KYC decision payload
pub const KYC_MARKERS: &[&str] = &["decision", "reason_codes", "confidence_score", "audit_trail"];

/// Key wrapping a comprehensive scan
pub const COMPREHENSIVE_KEY: &str = "comprehensive_site_scan";

/// Keys marking the legacy flat compliance object
pub const LEGACY_MARKERS: &[&str] = &["compliance_checks", "base_url"];

/// Scan schema kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanKind {
    /// KYC decision object
    Kyc,
    /// Comprehensive site scan
    Comprehensive,
    /// Legacy flat compliance-check object
    Legacy,
    /// Unrecognised or malformed
    Unknown,
}

impl ScanKind {
    /// Display name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kyc => "kyc",
            Self::Comprehensive => "comprehensive",
            Self::Legacy => "legacy",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ScanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw output kept for the fallback renderer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawOutput {
    /// Text to display verbatim
    pub text: String,
}

impl RawOutput {
    /// Strings are kept as is; everything else is pretty-printed
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let text = match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        };
        Self { text }
    }

    /// Whether there is nothing to show
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Classified payload; the effective object for each schema
#[derive(Debug, Clone, PartialEq)]
pub enum ScanResult {
    /// KYC decision payload
    Kyc {
        /// Effective payload
        payload: Object,
        /// Whether the payload was unwrapped from a `response` field
        unwrapped: bool,
    },
    /// Comprehensive scan (the nested `comprehensive_site_scan` object)
    Comprehensive(Object),
    /// Legacy flat compliance object
    Legacy(Object),
    /// Nothing recognisable
    Unknown(RawOutput),
}

impl ScanResult {
    /// Kind tag
    #[must_use]
    pub fn kind(&self) -> ScanKind {
        match self {
            Self::Kyc { .. } => ScanKind::Kyc,
            Self::Comprehensive(_) => ScanKind::Comprehensive,
            Self::Legacy(_) => ScanKind::Legacy,
            Self::Unknown(_) => ScanKind::Unknown,
        }
    }
}

/// Locate and classify a task output
#[must_use]
pub fn classify(output: &Value) -> ScanResult {
    match locate(output) {
        Some(payload) => classify_payload(payload, output),
        None => {
            tracing::debug!("no scan payload located, falling back to raw output");
            ScanResult::Unknown(RawOutput::from_value(output))
        }
    }
}

/// Classify an already located payload
///
/// `raw` is what the fallback renderer shows when nothing matches.
#[must_use]
pub fn classify_payload(payload: Object, raw: &Value) -> ScanResult {
    if has_any(&payload, KYC_MARKERS) {
        return ScanResult::Kyc {
            payload,
            unwrapped: false,
        };
    }

    if let Some(nested) = payload.get("response").and_then(resolve) {
        if has_any(&nested, KYC_MARKERS) {
            return ScanResult::Kyc {
                payload: nested,
                unwrapped: true,
            };
        }
    }

    if let Some(scan) = payload.get(COMPREHENSIVE_KEY).and_then(resolve) {
        return ScanResult::Comprehensive(scan);
    }

    if has_any(&payload, LEGACY_MARKERS) {
        return ScanResult::Legacy(payload);
    }

    tracing::debug!(
        keys = ?payload.keys().take(8).collect::<Vec<_>>(),
        "scan payload matched no known schema"
    );
    ScanResult::Unknown(RawOutput::from_value(raw))
}

fn has_any(map: &Object, keys: &[&str]) -> bool {
    keys.iter().any(|k| map.contains_key(*k))
}
