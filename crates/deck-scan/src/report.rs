//! Scan report: classified payload plus its view model

use crate::classify::{classify, RawOutput, ScanKind, ScanResult};
use crate::format::{fraction_as_percent, score_out_of_100};
use crate::view::{ComprehensiveView, KycReport, LegacyView};
use deck_model::{Task, TaskStatus};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const HEADLINE_WIDTH: usize = 80;

/// Fully built report for one task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "view", rename_all = "snake_case")]
pub enum ScanReport {
    /// KYC decision or insufficient-data notice
    Kyc(KycReport),
    /// Comprehensive site scan
    Comprehensive(Box<ComprehensiveView>),
    /// Legacy compliance checks
    Legacy(LegacyView),
    /// Fallback: raw output with task status
    Raw {
        /// Output text
        raw: RawOutput,
        /// Task status
        status: TaskStatus,
        /// Task error
        error: Option<String>,
    },
}

impl ScanReport {
    /// Build the report for a task's current output
    #[must_use]
    pub fn build(task: &Task) -> Self {
        Self::from_output(&task.output, task.status, task.error.as_deref())
    }

    /// Build from an output value and the owning task's state
    #[must_use]
    pub fn from_output(output: &Value, status: TaskStatus, error: Option<&str>) -> Self {
        match classify(output) {
            ScanResult::Kyc { payload, unwrapped } => {
                Self::Kyc(KycReport::build(&payload, unwrapped, status.as_str(), error))
            }
            ScanResult::Comprehensive(scan) => {
                Self::Comprehensive(Box::new(ComprehensiveView::build(&scan)))
            }
            ScanResult::Legacy(payload) => Self::Legacy(LegacyView::build(&payload)),
            ScanResult::Unknown(raw) => Self::Raw {
                raw,
                status,
                error: error.map(str::to_string),
            },
        }
    }

    /// Schema kind
    #[must_use]
    pub fn kind(&self) -> ScanKind {
        match self {
            Self::Kyc(_) => ScanKind::Kyc,
            Self::Comprehensive(_) => ScanKind::Comprehensive,
            Self::Legacy(_) => ScanKind::Legacy,
            Self::Raw { .. } => ScanKind::Unknown,
        }
    }

    /// Tabs with content, in display order
    #[must_use]
    pub fn tabs(&self) -> Vec<Tab> {
        match self {
            Self::Kyc(KycReport::Decision(view)) => {
                let mut tabs = vec![Tab::Decision];
                if !view.reason_codes.is_empty() {
                    tabs.push(Tab::Reasons);
                }
                if !view.policy_checks.is_empty() || !view.checkout_flow.is_empty() {
                    tabs.push(Tab::Checks);
                }
                if view.entity_match.is_some() {
                    tabs.push(Tab::Entity);
                }
                if !view.audit_trail.is_empty() {
                    tabs.push(Tab::Audit);
                }
                tabs
            }
            Self::Kyc(KycReport::Insufficient { .. }) => vec![Tab::Overview],
            Self::Comprehensive(view) => {
                let present = [
                    (Tab::Business, view.business.is_some()),
                    (Tab::Policies, view.policies.is_some()),
                    (Tab::Mcc, view.mcc.is_some()),
                    (Tab::ContentRisk, view.content_risk.is_some()),
                    (Tab::Compliance, view.compliance.is_some()),
                    (Tab::Domain, view.domain.is_some()),
                    (Tab::Changes, view.changes.is_some()),
                    (Tab::Crawl, view.crawl.is_some()),
                ];
                std::iter::once(Tab::Overview)
                    .chain(present.into_iter().filter(|(_, p)| *p).map(|(t, _)| t))
                    .collect()
            }
            Self::Legacy(_) => vec![Tab::Overview, Tab::Checks],
            Self::Raw { .. } => vec![Tab::Raw],
        }
    }

    /// One-line summary for task lists
    #[must_use]
    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            kind: self.kind(),
            headline: self.headline(),
        }
    }

    fn headline(&self) -> String {
        match self {
            Self::Kyc(KycReport::Decision(view)) => {
                let mut parts = vec![view
                    .decision
                    .as_ref()
                    .map_or_else(|| "NO DECISION".to_string(), |d| d.label.clone())];
                if let Some(c) = view.confidence {
                    parts.push(format!("confidence {}", fraction_as_percent(c)));
                }
                if let Some(score) = view.compliance.as_ref().and_then(|c| c.overall) {
                    parts.push(format!("compliance {}", score_out_of_100(score)));
                }
                let blocking = view.blocking_reasons().count();
                if blocking > 0 {
                    parts.push(format!("{blocking} blocking reason(s)"));
                }
                parts.join(" | ")
            }
            Self::Kyc(KycReport::Insufficient { status, error }) => match error {
                Some(e) => format!("insufficient data ({status}): {e}"),
                None => format!("insufficient data ({status})"),
            },
            Self::Comprehensive(view) => {
                let mut parts = Vec::new();
                if let Some(code) = view.mcc.as_ref().and_then(|m| m.primary_code()) {
                    parts.push(format!("MCC {code}"));
                }
                if let Some(risk) = &view.content_risk {
                    let level = risk.risk_level.as_deref().unwrap_or("UNRATED");
                    parts.push(format!("risk {level} ({} keywords)", risk.risk_count()));
                }
                if let Some(score) = view.compliance.as_ref().and_then(|c| c.overall_score) {
                    parts.push(format!("compliance {}", score_out_of_100(score)));
                }
                if let Some(age) = view.domain.as_ref().and_then(|d| d.age()) {
                    parts.push(format!("domain {age}"));
                }
                if parts.is_empty() {
                    "comprehensive scan (no sections)".to_string()
                } else {
                    parts.join(" | ")
                }
            }
            Self::Legacy(view) => {
                let mut line = format!("{}/{} checks passed", view.passed_count(), view.checks.len());
                if let Some(score) = view.overall_score {
                    line.push_str(&format!(" | {}", score_out_of_100(score)));
                }
                line
            }
            Self::Raw { raw, status, error } => {
                if let Some(e) = error {
                    return truncate(&format!("{status}: {e}"));
                }
                raw.text
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .map_or_else(|| status.to_string(), truncate)
            }
        }
    }
}

fn truncate(line: &str) -> String {
    if line.chars().count() <= HEADLINE_WIDTH {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(HEADLINE_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}

/// One-line summary of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Schema kind
    pub kind: ScanKind,
    /// Summary text
    pub headline: String,
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.headline)
    }
}

/// Report tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Headline figures
    Overview,
    /// KYC decision card
    Decision,
    /// KYC reason codes
    Reasons,
    /// Policy or compliance checks
    Checks,
    /// KYC entity match
    Entity,
    /// KYC audit trail
    Audit,
    /// Business details
    Business,
    /// Policy pages
    Policies,
    /// MCC suggestions
    Mcc,
    /// Content-risk keywords
    ContentRisk,
    /// Compliance intelligence
    Compliance,
    /// RDAP domain intelligence
    Domain,
    /// Change intelligence
    Changes,
    /// Crawl summary
    Crawl,
    /// Raw output
    Raw,
}

impl Tab {
    /// All tabs
    pub const ALL: &'static [Tab] = &[
        Tab::Overview,
        Tab::Decision,
        Tab::Reasons,
        Tab::Checks,
        Tab::Entity,
        Tab::Audit,
        Tab::Business,
        Tab::Policies,
        Tab::Mcc,
        Tab::ContentRisk,
        Tab::Compliance,
        Tab::Domain,
        Tab::Changes,
        Tab::Crawl,
        Tab::Raw,
    ];

    /// Short name used on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Decision => "decision",
            Self::Reasons => "reasons",
            Self::Checks => "checks",
            Self::Entity => "entity",
            Self::Audit => "audit",
            Self::Business => "business",
            Self::Policies => "policies",
            Self::Mcc => "mcc",
            Self::ContentRisk => "content-risk",
            Self::Compliance => "compliance",
            Self::Domain => "domain",
            Self::Changes => "changes",
            Self::Crawl => "crawl",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised tab name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tab `{0}`")]
pub struct UnknownTab(pub String);

impl FromStr for Tab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        let alias = match wanted.as_str() {
            "risk" => "content-risk",
            "rdap" => "domain",
            "policy" => "policies",
            "reason-codes" => "reasons",
            other => other,
        };
        Tab::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == alias)
            .ok_or_else(|| UnknownTab(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(output: Value) -> ScanReport {
        ScanReport::from_output(&output, TaskStatus::Completed, None)
    }

    #[test]
    fn kyc_headline_uses_both_scales() {
        let r = report(json!({
            "decision": "approve",
            "confidence_score": 0.87,
            "compliance_score": {"overall_score": 72}
        }));
        assert_eq!(
            r.summary().headline,
            "APPROVE | confidence 87.0% | compliance 72/100"
        );
    }

    #[test]
    fn kyc_without_scores_shows_task_state() {
        let r = ScanReport::from_output(
            &json!({"decision": "approve"}),
            TaskStatus::Failed,
            Some("crawler blocked"),
        );
        assert_eq!(r.kind(), ScanKind::Kyc);
        assert_eq!(r.summary().headline, "insufficient data (failed): crawler blocked");
        assert_eq!(r.tabs(), vec![Tab::Overview]);
    }

    #[test]
    fn comprehensive_tabs_follow_content() {
        let r = report(json!({
            "comprehensive_site_scan": {
                "mcc_codes": {"primary": {"code": "5999"}},
                "rdap": {"age_days": 45}
            }
        }));
        assert_eq!(r.tabs(), vec![Tab::Overview, Tab::Mcc, Tab::Domain]);
        assert_eq!(r.summary().headline, "MCC 5999 | domain Low (< 1yr)");
    }

    #[test]
    fn legacy_headline() {
        let r = report(json!({
            "base_url": "https://a",
            "overall_score": 50,
            "compliance_checks": {"ssl": true, "terms": false}
        }));
        assert_eq!(r.summary().to_string(), "[legacy] 1/2 checks passed | 50/100");
    }

    #[test]
    fn raw_fallback_keeps_status() {
        let r = ScanReport::from_output(&json!("not json at all"), TaskStatus::Processing, None);
        match &r {
            ScanReport::Raw { raw, status, .. } => {
                assert_eq!(raw.text, "not json at all");
                assert_eq!(*status, TaskStatus::Processing);
            }
            other => panic!("expected raw, got {other:?}"),
        }
        assert_eq!(r.tabs(), vec![Tab::Raw]);
    }

    #[test]
    fn long_raw_headline_is_truncated() {
        let r = report(json!("x".repeat(200)));
        assert_eq!(r.summary().headline.chars().count(), HEADLINE_WIDTH);
    }

    #[test]
    fn tab_parsing() {
        assert_eq!("risk".parse::<Tab>().unwrap(), Tab::ContentRisk);
        assert_eq!("Content_Risk".parse::<Tab>().unwrap(), Tab::ContentRisk);
        assert_eq!("MCC".parse::<Tab>().unwrap(), Tab::Mcc);
        assert!("nope".parse::<Tab>().is_err());
    }
}
