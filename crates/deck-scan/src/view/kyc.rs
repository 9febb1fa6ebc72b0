//! KYC decision view
//!
//! `confidence_score` here is a fraction in `[0, 1]`; `compliance_score` is
//! already on a 0-100 scale. Both are stored as reported and only scaled at
//! display time (see [`crate::format`]).

use crate::fields::{array_at, boolean, boolean_at, first, number, number_at, object, rows, text, text_at, Object};
use crate::view::comprehensive::split_scores;
use serde::Serialize;
use serde_json::Value;

/// Normalised decision outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Approved
    Approve,
    /// Rejected
    Reject,
    /// Sent to manual review
    Escalate,
    /// Any other label
    Other,
}

impl Outcome {
    fn from_label(label: &str) -> Self {
        match label {
            "APPROVE" | "APPROVED" | "PASS" | "ACCEPT" | "ACCEPTED" => Self::Approve,
            "REJECT" | "REJECTED" | "FAIL" | "DECLINE" | "DECLINED" => Self::Reject,
            "ESCALATE" | "ESCALATED" | "REVIEW" | "MANUAL_REVIEW" | "PENDING_REVIEW" => {
                Self::Escalate
            }
            _ => Self::Other,
        }
    }
}

/// Decision, label normalised to uppercase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Uppercased label as reported
    pub label: String,
    /// Outcome bucket
    pub outcome: Outcome,
}

impl Decision {
    /// Accepts a bare string or `{"value": "..."}`
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let raw = match value {
            Value::Object(map) => text_at(map, &["value", "decision", "status"])?,
            other => text(other)?,
        };
        let label = raw.trim().to_uppercase().replace([' ', '-'], "_");
        Some(Self {
            outcome: Outcome::from_label(&label),
            label,
        })
    }
}

/// Compliance score (0-100) with optional breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplianceScore {
    /// Overall score
    pub overall: Option<f64>,
    /// Named sub-scores
    pub parts: Vec<(String, f64)>,
}

impl ComplianceScore {
    fn from_value(value: &Value) -> Option<Self> {
        let score = match value {
            Value::Object(map) => {
                let (overall, parts) = split_scores(map);
                Self { overall, parts }
            }
            other => Self {
                overall: Some(number(other)?),
                parts: Vec::new(),
            },
        };
        (score.overall.is_some() || !score.parts.is_empty()).then_some(score)
    }
}

/// One reason code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReasonCode {
    /// Code
    pub code: String,
    /// Description
    pub description: Option<String>,
    /// Severity label
    pub severity: Option<String>,
    /// Forces rejection
    pub auto_fail: bool,
    /// Forces manual review
    pub auto_escalate: bool,
}

impl ReasonCode {
    fn from_value(value: &Value) -> Option<Self> {
        let (code, map) = match value {
            Value::Object(map) => (text_at(map, &["code", "reason_code", "id"])?, Some(map)),
            other => (text(other)?, None),
        };

        let action = map
            .and_then(|m| text_at(m, &["action", "type", "effect"]))
            .unwrap_or_default()
            .to_ascii_uppercase();
        let upper = code.to_ascii_uppercase();
        let flag = |keys: &[&str], marker: &str| {
            map.and_then(|m| boolean_at(m, keys)).unwrap_or(false)
                || action.replace([' ', '-'], "_").contains(marker)
                || upper.contains(marker)
        };

        Some(Self {
            auto_fail: flag(&["auto_fail", "autoFail"], "AUTO_FAIL"),
            auto_escalate: flag(&["auto_escalate", "autoEscalate"], "AUTO_ESCALATE"),
            description: map.and_then(|m| text_at(m, &["description", "message", "reason"])),
            severity: map.and_then(|m| text_at(m, &["severity", "level"])),
            code,
        })
    }
}

/// One policy check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyCheck {
    /// Check name
    pub name: String,
    /// Pass/fail, if known
    pub passed: Option<bool>,
    /// Detail line
    pub detail: Option<String>,
}

/// Entity match block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityMatch {
    /// Match score (0-100)
    pub score: Option<f64>,
    /// Whether the entity matched
    pub matched: Option<bool>,
    /// Remaining fields as display rows
    pub fields: Vec<(String, String)>,
}

/// One audit trail entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    /// Timestamp as reported
    pub timestamp: Option<String>,
    /// Step or event name
    pub step: Option<String>,
    /// Detail
    pub detail: Option<String>,
}

/// Read-only view of a KYC decision
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KycView {
    /// Decision
    pub decision: Option<Decision>,
    /// Confidence as a fraction in `[0, 1]`
    pub confidence: Option<f64>,
    /// Compliance score
    pub compliance: Option<ComplianceScore>,
    /// Reason codes
    pub reason_codes: Vec<ReasonCode>,
    /// Policy checks
    pub policy_checks: Vec<PolicyCheck>,
    /// Entity match
    pub entity_match: Option<EntityMatch>,
    /// Checkout flow checklist
    pub checkout_flow: Vec<(String, bool)>,
    /// Audit trail
    pub audit_trail: Vec<AuditEntry>,
    /// Whether the payload came from a nested `response` field
    pub unwrapped: bool,
}

impl KycView {
    /// Build from the effective KYC payload
    #[must_use]
    pub fn build(payload: &Object, unwrapped: bool) -> Self {
        Self {
            decision: payload.get("decision").and_then(Decision::from_value),
            confidence: number_at(payload, &["confidence_score"]),
            compliance: payload
                .get("compliance_score")
                .and_then(ComplianceScore::from_value),
            reason_codes: array_at(payload, &["reason_codes"])
                .map(|items| items.iter().filter_map(ReasonCode::from_value).collect())
                .unwrap_or_default(),
            policy_checks: policy_checks(payload.get("policy_checks")),
            entity_match: object(payload, "entity_match").map(|m| EntityMatch {
                score: number_at(m, &["score", "match_score", "confidence"]),
                matched: boolean_at(m, &["matched", "is_match", "match"]),
                fields: rows(m, &["score", "match_score", "confidence", "matched", "is_match", "match"]),
            }),
            checkout_flow: object(payload, "checkout_flow")
                .map(|flow| {
                    flow.iter()
                        .filter_map(|(k, v)| boolean(v).map(|b| (k.clone(), b)))
                        .collect()
                })
                .unwrap_or_default(),
            audit_trail: array_at(payload, &["audit_trail"])
                .map(|items| items.iter().filter_map(audit_entry).collect())
                .unwrap_or_default(),
            unwrapped,
        }
    }

    /// Reason codes forcing rejection or review
    pub fn blocking_reasons(&self) -> impl Iterator<Item = &ReasonCode> {
        self.reason_codes
            .iter()
            .filter(|r| r.auto_fail || r.auto_escalate)
    }
}

/// KYC tab content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum KycReport {
    /// A decision card can be shown
    Decision(KycView),
    /// Neither confidence nor compliance score present
    Insufficient {
        /// Task status
        status: String,
        /// Task error, if any
        error: Option<String>,
    },
}

impl KycReport {
    /// Build, falling back to the task status when scores are missing
    #[must_use]
    pub fn build(payload: &Object, unwrapped: bool, status: &str, error: Option<&str>) -> Self {
        let has_scores = first(payload, &["confidence_score", "compliance_score"]).is_some();
        if has_scores {
            Self::Decision(KycView::build(payload, unwrapped))
        } else {
            Self::Insufficient {
                status: status.to_string(),
                error: error.map(str::to_string),
            }
        }
    }
}

fn policy_checks(value: Option<&Value>) -> Vec<PolicyCheck> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(c) => Some(PolicyCheck {
                    name: text_at(c, &["name", "policy", "check"])?,
                    passed: check_passed(c),
                    detail: text_at(c, &["detail", "details", "message", "description"]),
                }),
                other => text(other).map(|name| PolicyCheck {
                    name,
                    ..PolicyCheck::default()
                }),
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, v)| match v {
                Value::Object(c) => PolicyCheck {
                    name: name.clone(),
                    passed: check_passed(c),
                    detail: text_at(c, &["detail", "details", "message", "description"]),
                },
                other => PolicyCheck {
                    name: name.clone(),
                    passed: boolean(other).or_else(|| text(other).map(|s| status_passed(&s))),
                    detail: None,
                },
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn check_passed(check: &Object) -> Option<bool> {
    boolean_at(check, &["passed", "pass", "ok", "compliant"])
        .or_else(|| text_at(check, &["status", "result"]).map(|s| status_passed(&s)))
}

pub(crate) fn status_passed(status: &str) -> bool {
    matches!(
        status.to_ascii_lowercase().as_str(),
        "pass" | "passed" | "ok" | "compliant" | "found" | "present" | "success" | "true" | "yes"
    )
}

fn audit_entry(value: &Value) -> Option<AuditEntry> {
    match value {
        Value::Object(e) => Some(AuditEntry {
            timestamp: text_at(e, &["timestamp", "time", "at"]),
            step: text_at(e, &["step", "event", "action", "stage"]),
            detail: text_at(e, &["detail", "details", "message", "result"]),
        }),
        other => text(other).map(|detail| AuditEntry {
            detail: Some(detail),
            ..AuditEntry::default()
        }),
    }
}
