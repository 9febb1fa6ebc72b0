//! Comprehensive site scan view
//!
//! Every sub-block of the scan is optional. A `None` tab means "nothing to
//! show", never an error.

use crate::fields::{
    array_at, boolean_at, first, number, number_at, object, rows, strings, text, text_at, Object,
};
use crate::view::domain::DomainIntel;
use crate::view::risk::ContentRisk;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Business details tab
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BusinessDetails {
    /// Business name
    pub name: Option<String>,
    /// All scalar fields as display rows
    pub fields: Vec<(String, String)>,
}

impl BusinessDetails {
    fn from_object(map: &Object) -> Self {
        Self {
            name: text_at(map, &["business_name", "name", "company_name", "legal_name"]),
            fields: rows(map, &[]),
        }
    }
}

/// Presence of one policy page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyPage {
    /// Whether the page was found
    pub found: bool,
    /// Page URL
    pub url: Option<String>,
    /// Evidence snippet
    pub evidence: Option<String>,
}

impl PolicyPage {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let url = text_at(map, &["url", "page_url", "link"]);
                let found = boolean_at(map, &["found", "present", "exists", "detected"])
                    .unwrap_or(url.is_some());
                Some(Self {
                    found,
                    url,
                    evidence: text_at(map, &["evidence", "snippet", "excerpt"]),
                })
            }
            Value::Bool(found) => Some(Self {
                found: *found,
                ..Self::default()
            }),
            Value::String(url) if !url.trim().is_empty() => Some(Self {
                found: true,
                url: Some(url.trim().to_string()),
                evidence: None,
            }),
            _ => None,
        }
    }
}

/// Policy pages tab, keyed by page key (`privacy_policy`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyPages {
    /// Pages by key
    pub pages: BTreeMap<String, PolicyPage>,
}

impl PolicyPages {
    fn from_object(map: &Object) -> Self {
        let source = object(map, "pages").unwrap_or(map);
        Self {
            pages: source
                .iter()
                .filter_map(|(k, v)| PolicyPage::from_value(v).map(|p| (k.clone(), p)))
                .collect(),
        }
    }

    /// Keys of pages that were not found
    #[must_use]
    pub fn missing(&self) -> Vec<&str> {
        self.pages
            .iter()
            .filter(|(_, p)| !p.found)
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

/// One MCC suggestion
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MccSuggestion {
    /// Merchant category code
    pub code: String,
    /// Code description
    pub description: Option<String>,
    /// Confidence in percent (0-100)
    pub confidence: Option<f64>,
    /// Keywords that led to the suggestion
    pub matched_keywords: Vec<String>,
}

impl MccSuggestion {
    fn from_value(value: &Value) -> Option<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return text(other).map(|code| Self {
                    code,
                    ..Self::default()
                })
            }
        };
        Some(Self {
            code: text_at(map, &["code", "mcc", "mcc_code"])?,
            description: text_at(map, &["description", "name", "label"]),
            confidence: number_at(map, &["confidence", "confidence_score", "score"]),
            matched_keywords: first(map, &["matched_keywords", "keywords", "matches"])
                .map(strings)
                .unwrap_or_default(),
        })
    }
}

/// MCC tab
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MccSuggestions {
    /// System's primary suggestion
    pub primary: Option<MccSuggestion>,
    /// Alternatives
    pub secondary: Vec<MccSuggestion>,
}

impl MccSuggestions {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                let mut all = items.iter().filter_map(MccSuggestion::from_value);
                Self {
                    primary: all.next(),
                    secondary: all.collect(),
                }
            }
            Value::Object(map) => {
                let secondary = match first(map, &["secondary", "secondary_mcc", "alternatives"]) {
                    Some(Value::Array(items)) => {
                        items.iter().filter_map(MccSuggestion::from_value).collect()
                    }
                    Some(single) => MccSuggestion::from_value(single).into_iter().collect(),
                    None => Vec::new(),
                };
                let primary = first(map, &["primary", "primary_mcc", "suggested"])
                    .and_then(MccSuggestion::from_value)
                    .or_else(|| MccSuggestion::from_value(value));
                Self { primary, secondary }
            }
            _ => Self::default(),
        }
    }

    /// Primary suggested code
    #[must_use]
    pub fn primary_code(&self) -> Option<&str> {
        self.primary.as_ref().map(|p| p.code.as_str())
    }
}

/// One compliance alert
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Alert {
    /// Alert type
    pub kind: Option<String>,
    /// Severity label
    pub severity: Option<String>,
    /// Description
    pub description: String,
}

/// Compliance intelligence tab
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplianceIntel {
    /// Overall compliance score (0-100)
    pub overall_score: Option<f64>,
    /// Named sub-scores (0-100)
    pub sub_scores: Vec<(String, f64)>,
    /// Risk level label
    pub risk_level: Option<String>,
    /// Alerts
    pub alerts: Vec<Alert>,
}

impl ComplianceIntel {
    fn from_object(map: &Object) -> Self {
        let (overall_score, sub_scores) = match map.get("compliance_score") {
            Some(Value::Object(scores)) => split_scores(scores),
            Some(other) => (number(other), Vec::new()),
            None => (number_at(map, &["overall_score", "score"]), Vec::new()),
        };

        let alerts = array_at(map, &["alerts", "compliance_alerts"])
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::Object(a) => Some(Alert {
                            kind: text_at(a, &["type", "alert_type", "category"]),
                            severity: text_at(a, &["severity", "level"]),
                            description: text_at(a, &["description", "message", "detail"])?,
                        }),
                        other => text(other).map(|description| Alert {
                            description,
                            ..Alert::default()
                        }),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            overall_score,
            sub_scores,
            risk_level: text_at(map, &["risk_level", "overall_risk"]).map(|l| l.to_uppercase()),
            alerts,
        }
    }
}

/// Split a score object into the overall score and named sub-scores
pub(crate) fn split_scores(scores: &Object) -> (Option<f64>, Vec<(String, f64)>) {
    const OVERALL: &[&str] = &["overall_score", "overall", "score", "total"];
    let overall = number_at(scores, OVERALL);
    let parts = scores
        .iter()
        .filter(|(k, _)| !OVERALL.contains(&k.as_str()))
        .filter_map(|(k, v)| number(v).map(|n| (k.clone(), n)))
        .collect();
    (overall, parts)
}

/// One detected change
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeEntry {
    /// Change type
    pub kind: Option<String>,
    /// What changed
    pub description: Option<String>,
    /// Severity label
    pub severity: Option<String>,
    /// Detection confidence (0-100)
    pub confidence: Option<f64>,
    /// Business impact
    pub business_impact: Option<String>,
    /// Recommended action
    pub recommended_action: Option<String>,
    /// Detection time as reported
    pub detected_at: Option<String>,
}

/// Change intelligence tab
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeIntel {
    /// Summary line
    pub summary: Option<String>,
    /// Entries
    pub entries: Vec<ChangeEntry>,
}

impl ChangeIntel {
    fn from_value(value: &Value) -> Self {
        let (summary, items) = match value {
            Value::Array(items) => (None, Some(items)),
            Value::Object(map) => (
                text_at(map, &["summary", "overview"]),
                array_at(map, &["changes", "detected_changes", "entries", "change_events"]),
            ),
            _ => (None, None),
        };

        let entries = items
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|c| ChangeEntry {
                        kind: text_at(c, &["change_type", "type", "category"]),
                        description: text_at(c, &["description", "summary", "details"]),
                        severity: text_at(c, &["severity", "risk_level"]),
                        confidence: number_at(c, &["confidence", "confidence_score"]),
                        business_impact: text_at(c, &["business_impact", "impact"]),
                        recommended_action: text_at(c, &["recommended_action", "recommendation", "action"]),
                        detected_at: text_at(c, &["detected_at", "timestamp", "date"]),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { summary, entries }
    }
}

/// Crawl summary tab
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlSummary {
    /// Pages crawled
    pub pages_crawled: Option<u64>,
    /// All scalar fields as display rows
    pub fields: Vec<(String, String)>,
}

/// Read-only view of a comprehensive scan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComprehensiveView {
    /// Scanned URL
    pub target_url: Option<String>,
    /// Scan status line
    pub scan_status: Option<String>,
    /// Business details
    pub business: Option<BusinessDetails>,
    /// Policy pages
    pub policies: Option<PolicyPages>,
    /// MCC suggestions
    pub mcc: Option<MccSuggestions>,
    /// Content risk
    pub content_risk: Option<ContentRisk>,
    /// Compliance intelligence
    pub compliance: Option<ComplianceIntel>,
    /// Domain intelligence
    pub domain: Option<DomainIntel>,
    /// Change intelligence
    pub changes: Option<ChangeIntel>,
    /// Crawl summary
    pub crawl: Option<CrawlSummary>,
}

impl ComprehensiveView {
    /// Build from the nested `comprehensive_site_scan` object
    #[must_use]
    pub fn build(scan: &Object) -> Self {
        let compliance_block = object(scan, "compliance_intelligence");
        let alerts: Vec<&Object> = compliance_block
            .and_then(|c| array_at(c, &["alerts", "compliance_alerts"]))
            .map(|items| items.iter().filter_map(Value::as_object).collect())
            .unwrap_or_default();

        Self {
            target_url: text_at(scan, &["url", "target_url", "base_url", "domain"]),
            scan_status: scan_status(scan),
            business: object(scan, "business_details").map(BusinessDetails::from_object),
            policies: object(scan, "policy_details").map(PolicyPages::from_object),
            mcc: first(scan, &["mcc_codes", "mcc"]).map(MccSuggestions::from_value),
            content_risk: object(scan, "content_risk").map(ContentRisk::from_object),
            compliance: compliance_block.map(ComplianceIntel::from_object),
            domain: DomainIntel::build(object(scan, "rdap"), &alerts),
            changes: first(scan, &["change_intelligence"]).map(ChangeIntel::from_value),
            crawl: object(scan, "crawl_summary").map(|c| CrawlSummary {
                pages_crawled: number_at(c, &["pages_crawled", "total_pages", "pages"])
                    .map(|n| n.max(0.0) as u64),
                fields: rows(c, &[]),
            }),
        }
    }
}

fn scan_status(scan: &Object) -> Option<String> {
    match scan.get("scan_status")? {
        Value::Object(status) => {
            let state = text_at(status, &["status", "state"]);
            let message = text_at(status, &["message", "detail"]);
            match (state, message) {
                (Some(s), Some(m)) => Some(format!("{s}: {m}")),
                (s, m) => s.or(m),
            }
        }
        other => text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(value: Value) -> ComprehensiveView {
        ComprehensiveView::build(value.as_object().unwrap())
    }

    #[test]
    fn empty_scan_has_no_tabs() {
        let v = view(json!({}));
        assert_eq!(v, ComprehensiveView::default());
    }

    #[test]
    fn policy_pages_tolerate_shapes() {
        let v = view(json!({
            "policy_details": {
                "privacy_policy": {"found": true, "url": "https://a/privacy", "evidence": "We collect"},
                "refund_policy": false,
                "terms_conditions": "https://a/terms",
                "shipping_policy": {"url": null}
            }
        }));

        let policies = v.policies.unwrap();
        assert!(policies.pages["privacy_policy"].found);
        assert!(!policies.pages["refund_policy"].found);
        assert_eq!(
            policies.pages["terms_conditions"].url.as_deref(),
            Some("https://a/terms")
        );
        assert_eq!(policies.missing(), vec!["refund_policy", "shipping_policy"]);
    }

    #[test]
    fn mcc_primary_and_secondary() {
        let v = view(json!({
            "mcc_codes": {
                "primary": {"code": 5999, "description": "Misc retail", "confidence": 82, "matched_keywords": ["shop", "cart"]},
                "secondary": [{"code": "5311", "confidence": "40%"}]
            }
        }));

        let mcc = v.mcc.unwrap();
        let primary = mcc.primary.as_ref().unwrap();
        assert_eq!(primary.code, "5999");
        assert_eq!(primary.confidence, Some(82.0));
        assert_eq!(primary.matched_keywords, vec!["shop", "cart"]);
        assert_eq!(mcc.secondary[0].confidence, Some(40.0));
        assert_eq!(mcc.primary_code(), Some("5999"));
    }

    #[test]
    fn mcc_as_array() {
        let v = view(json!({"mcc_codes": [{"mcc": "7995"}, {"mcc": "5816"}]}));
        let mcc = v.mcc.unwrap();
        assert_eq!(mcc.primary_code(), Some("7995"));
        assert_eq!(mcc.secondary.len(), 1);
    }

    #[test]
    fn compliance_score_object_is_split() {
        let v = view(json!({
            "compliance_intelligence": {
                "compliance_score": {"overall_score": 72, "policy_score": 80, "content_score": "60"},
                "alerts": [{"type": "policy", "severity": "high", "description": "No refund policy"}]
            }
        }));

        let c = v.compliance.unwrap();
        assert_eq!(c.overall_score, Some(72.0));
        assert_eq!(c.sub_scores.len(), 2);
        assert_eq!(c.alerts[0].description, "No refund policy");
    }

    #[test]
    fn domain_age_from_compliance_alert() {
        let v = view(json!({
            "compliance_intelligence": {
                "alerts": [{"type": "domain_age", "description": "Domain is 45 days old"}]
            }
        }));
        let domain = v.domain.unwrap();
        assert_eq!(domain.age_days, Some(45));
    }

    #[test]
    fn change_entries() {
        let v = view(json!({
            "change_intelligence": {
                "summary": "2 changes",
                "changes": [{
                    "change_type": "pricing",
                    "severity": "medium",
                    "confidence": 90,
                    "business_impact": "Higher ticket size",
                    "recommended_action": "Re-review MCC"
                }]
            }
        }));

        let changes = v.changes.unwrap();
        assert_eq!(changes.summary.as_deref(), Some("2 changes"));
        assert_eq!(changes.entries[0].recommended_action.as_deref(), Some("Re-review MCC"));
        assert_eq!(changes.entries[0].confidence, Some(90.0));
    }

    #[test]
    fn scan_status_object() {
        let v = view(json!({"scan_status": {"status": "partial", "message": "2 pages timed out"}}));
        assert_eq!(v.scan_status.as_deref(), Some("partial: 2 pages timed out"));
    }

    #[test]
    fn crawl_summary_pages() {
        let v = view(json!({"crawl_summary": {"pages_crawled": 12, "duration_seconds": 30}}));
        let crawl = v.crawl.unwrap();
        assert_eq!(crawl.pages_crawled, Some(12));
        assert_eq!(crawl.fields.len(), 2);
    }

    #[test]
    fn wrong_types_do_not_panic() {
        let v = view(json!({
            "business_details": "Acme",
            "policy_details": [],
            "mcc_codes": 17,
            "content_risk": null,
            "rdap": "n/a",
            "change_intelligence": 3
        }));
        assert!(v.business.is_none());
        assert!(v.policies.is_none());
        assert!(v.mcc.unwrap().primary.is_none());
        assert!(v.domain.is_none());
        assert!(v.changes.unwrap().entries.is_empty());
    }
}
