//! Content-risk keywords
//!
//! Keyword hits are split into two buckets. A hit with prohibitive intent
//! on a privacy, terms or refund page is the merchant stating what it does
//! *not* do ("we do not sell firearms"); it is listed as a policy mention
//! and excluded from the risk tally. Every other hit contributes to risk.

use crate::fields::{array_at, number_at, object, text, text_at, Object};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Page types whose prohibitive mentions are not risk
pub const POLICY_PAGE_TYPES: &[&str] = &["privacy_policy", "terms_conditions", "refund_policy"];

/// Intent value marking a prohibitive mention
pub const PROHIBITIVE_INTENT: &str = "prohibitive";

const KEYWORD_KEYS: &[&str] = &[
    "keywords",
    "detected_keywords",
    "keyword_matches",
    "flagged_keywords",
    "risk_keywords",
];

/// One keyword hit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeywordHit {
    /// Matched keyword
    pub keyword: String,
    /// Risk category (e.g. `weapons`, `gambling`)
    pub category: Option<String>,
    /// Page type the hit was found on
    pub page_type: Option<String>,
    /// Intent classification (`prohibitive`, `promotional`, ...)
    pub intent: Option<String>,
    /// Page URL
    pub url: Option<String>,
    /// Surrounding text
    pub context: Option<String>,
    /// Severity label
    pub severity: Option<String>,
}

impl KeywordHit {
    fn from_value(value: &Value, category: Option<&str>) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let keyword = text_at(map, &["keyword", "term", "match", "word"])?;
                Some(Self {
                    keyword,
                    category: text_at(map, &["category", "risk_category"])
                        .or_else(|| category.map(str::to_string)),
                    page_type: text_at(map, &["page_type", "page", "source_page"]),
                    intent: text_at(map, &["intent"]),
                    url: text_at(map, &["url", "page_url"]),
                    context: text_at(map, &["context", "snippet", "excerpt"]),
                    severity: text_at(map, &["severity", "risk_level"]),
                })
            }
            other => text(other).map(|keyword| Self {
                keyword,
                category: category.map(str::to_string),
                ..Self::default()
            }),
        }
    }

    /// Whether this hit is a prohibitive statement on a policy page
    #[must_use]
    pub fn is_policy_mention(&self) -> bool {
        let prohibitive = self
            .intent
            .as_deref()
            .is_some_and(|i| i.eq_ignore_ascii_case(PROHIBITIVE_INTENT));
        let on_policy_page = self
            .page_type
            .as_deref()
            .is_some_and(|p| POLICY_PAGE_TYPES.iter().any(|t| t.eq_ignore_ascii_case(p)));
        prohibitive && on_policy_page
    }
}

/// Content-risk tab
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentRisk {
    /// Overall risk score (0-100)
    pub risk_score: Option<f64>,
    /// Overall risk level label
    pub risk_level: Option<String>,
    /// Hits that contribute to risk
    pub risk_keywords: Vec<KeywordHit>,
    /// Prohibitive mentions on policy pages, excluded from risk
    pub policy_mentions: Vec<KeywordHit>,
}

impl ContentRisk {
    /// Build from the `content_risk` object
    #[must_use]
    pub fn from_object(map: &Object) -> Self {
        let (policy_mentions, risk_keywords): (Vec<KeywordHit>, Vec<KeywordHit>) = collect_hits(map)
            .into_iter()
            .partition(KeywordHit::is_policy_mention);

        Self {
            risk_score: number_at(map, &["risk_score", "score", "content_risk_score"]),
            risk_level: text_at(map, &["risk_level", "level"]).map(|l| l.to_uppercase()),
            risk_keywords,
            policy_mentions,
        }
    }

    /// Number of risk-contributing hits
    #[inline]
    #[must_use]
    pub fn risk_count(&self) -> usize {
        self.risk_keywords.len()
    }

    /// Risk-contributing hits grouped by category
    #[must_use]
    pub fn groups(&self) -> BTreeMap<String, Vec<&KeywordHit>> {
        let mut groups: BTreeMap<String, Vec<&KeywordHit>> = BTreeMap::new();
        for hit in &self.risk_keywords {
            let category = hit.category.clone().unwrap_or_else(|| "uncategorized".to_string());
            groups.entry(category).or_default().push(hit);
        }
        groups
    }
}

/// Collect hits from list-shaped or category-keyed keyword fields
fn collect_hits(map: &Object) -> Vec<KeywordHit> {
    if let Some(items) = array_at(map, KEYWORD_KEYS) {
        return items
            .iter()
            .filter_map(|v| KeywordHit::from_value(v, None))
            .collect();
    }

    let Some(by_category) = KEYWORD_KEYS.iter().find_map(|k| object(map, k)) else {
        return Vec::new();
    };

    by_category
        .iter()
        .flat_map(|(category, items)| match items {
            Value::Array(list) => list
                .iter()
                .filter_map(|v| KeywordHit::from_value(v, Some(category.as_str())))
                .collect::<Vec<_>>(),
            other => KeywordHit::from_value(other, Some(category.as_str()))
                .into_iter()
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn risk(value: Value) -> ContentRisk {
        ContentRisk::from_object(value.as_object().unwrap())
    }

    #[test]
    fn prohibitive_policy_mentions_are_excluded() {
        let cr = risk(json!({
            "risk_score": 40,
            "keywords": [
                {"keyword": "firearms", "category": "weapons", "page_type": "terms_conditions", "intent": "prohibitive"},
                {"keyword": "firearms", "category": "weapons", "page_type": "product", "intent": "promotional"},
                {"keyword": "casino", "category": "gambling", "page_type": "privacy_policy", "intent": "descriptive"}
            ]
        }));

        assert_eq!(cr.policy_mentions.len(), 1);
        assert_eq!(cr.risk_count(), 2);
        assert_eq!(cr.risk_score, Some(40.0));
    }

    #[test]
    fn prohibitive_on_product_page_still_counts() {
        let cr = risk(json!({
            "keywords": [{"keyword": "cbd", "page_type": "home", "intent": "prohibitive"}]
        }));
        assert_eq!(cr.risk_count(), 1);
        assert!(cr.policy_mentions.is_empty());
    }

    #[test]
    fn category_keyed_keywords_are_flattened() {
        let cr = risk(json!({
            "detected_keywords": {
                "gambling": ["casino", "poker"],
                "adult": [{"keyword": "xxx", "page_type": "home"}]
            }
        }));

        let groups = cr.groups();
        assert_eq!(groups["gambling"].len(), 2);
        assert_eq!(groups["adult"][0].keyword, "xxx");
    }

    #[test]
    fn missing_keywords_is_empty_not_error() {
        let cr = risk(json!({"risk_level": "low"}));
        assert_eq!(cr.risk_count(), 0);
        assert_eq!(cr.risk_level.as_deref(), Some("LOW"));
    }

    #[test]
    fn entries_without_keyword_are_skipped() {
        let cr = risk(json!({"keywords": [{"category": "x"}, null, "vape"]}));
        assert_eq!(cr.risk_count(), 1);
        assert_eq!(cr.risk_keywords[0].keyword, "vape");
    }
}
