//! Legacy flat compliance-check view

use crate::fields::{array_at, boolean, boolean_at, number_at, object, rows, text, text_at, Object};
use crate::view::kyc::status_passed;
use serde::Serialize;
use serde_json::Value;

/// One compliance check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceCheck {
    /// Check name
    pub name: String,
    /// Pass/fail, if known
    pub passed: Option<bool>,
    /// Detail line
    pub detail: Option<String>,
}

impl ComplianceCheck {
    fn named(name: String, value: &Value) -> Self {
        match value {
            Value::Object(c) => Self {
                name,
                passed: passed(c),
                detail: text_at(c, &["details", "detail", "message", "url", "evidence"]),
            },
            other => Self {
                name,
                passed: boolean(other).or_else(|| text(other).map(|s| status_passed(&s))),
                detail: None,
            },
        }
    }
}

/// Read-only view of a legacy scan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LegacyView {
    /// Scanned URL
    pub base_url: Option<String>,
    /// Overall score (0-100)
    pub overall_score: Option<f64>,
    /// Checks in payload order
    pub checks: Vec<ComplianceCheck>,
    /// Other scalar fields
    pub fields: Vec<(String, String)>,
}

impl LegacyView {
    /// Build from the flat payload
    #[must_use]
    pub fn build(payload: &Object) -> Self {
        let checks = match payload.get("compliance_checks") {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(name, v)| ComplianceCheck::named(name.clone(), v))
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| {
                    let name = item
                        .as_object()
                        .and_then(|c| text_at(c, &["name", "check", "type"]))
                        .or_else(|| text(item))?;
                    Some(ComplianceCheck::named(name, item))
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            base_url: text_at(payload, &["base_url", "url"]),
            overall_score: number_at(payload, &["overall_score", "compliance_score", "score"])
                .or_else(|| {
                    object(payload, "summary").and_then(|s| number_at(s, &["overall_score", "score"]))
                }),
            checks,
            fields: rows(
                payload,
                &["base_url", "url", "overall_score", "compliance_score", "score"],
            ),
        }
    }

    /// Number of checks known to pass
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed == Some(true)).count()
    }

    /// Names of failing checks
    #[must_use]
    pub fn failing(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| c.passed == Some(false))
            .map(|c| c.name.as_str())
            .collect()
    }
}

fn passed(check: &Object) -> Option<bool> {
    boolean_at(check, &["passed", "pass", "found", "compliant", "present"])
        .or_else(|| text_at(check, &["status", "result"]).map(|s| status_passed(&s)))
        .or_else(|| array_at(check, &["issues"]).map(Vec::is_empty))
}
