//! Domain intelligence (RDAP)
//!
//! Domain age is read from `age_days`. Older scans only report it inside
//! an alert description ("Domain registered 45 days ago"), so when the
//! field is absent the first "N days" figure in a domain-related alert is
//! used instead. Alerts about other things (refund windows, trials) are
//! never read.

use crate::fields::{array_at, number_at, object, text_at, Object};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

static DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d[\d,]*)\s*days?\b").expect("days regex is valid"));

/// Days in the "established" threshold (3 years)
pub const GOOD_AGE_DAYS: u64 = 3 * 365;

/// Days in the "moderate" threshold (1 year)
pub const MODERATE_AGE_DAYS: u64 = 365;

/// Domain age classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainAge {
    /// Older than three years
    Good,
    /// Between one and three years
    Moderate,
    /// Younger than one year
    Low,
}

impl DomainAge {
    /// Classify an age in days
    #[must_use]
    pub fn classify(age_days: u64) -> Self {
        if age_days > GOOD_AGE_DAYS {
            Self::Good
        } else if age_days >= MODERATE_AGE_DAYS {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good (> 3yr)",
            Self::Moderate => "Moderate (1-3yr)",
            Self::Low => "Low (< 1yr)",
        }
    }
}

impl std::fmt::Display for DomainAge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the domain age came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeSource {
    /// RDAP `age_days` field
    Rdap,
    /// Parsed from an alert description
    Alert,
}

/// Domain tab
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomainIntel {
    /// Domain name
    pub domain: Option<String>,
    /// Registrar
    pub registrar: Option<String>,
    /// Registration date as reported
    pub registered: Option<String>,
    /// Expiry date as reported
    pub expires: Option<String>,
    /// Age in days
    pub age_days: Option<u64>,
    /// Source of `age_days`
    pub age_source: Option<AgeSource>,
}

impl DomainIntel {
    /// Build from the `rdap` block and any alerts
    ///
    /// Returns `None` when there is neither an RDAP block nor an alert
    /// carrying an age.
    #[must_use]
    pub fn build(rdap: Option<&Object>, alerts: &[&Object]) -> Option<Self> {
        let mut intel = rdap.map(Self::from_rdap).unwrap_or_default();

        if intel.age_days.is_none() {
            let rdap_alerts: Vec<&Object> = rdap
                .and_then(|r| array_at(r, &["alerts"]))
                .map(|a| a.iter().filter_map(Value::as_object).collect())
                .unwrap_or_default();

            let all: Vec<&Object> = rdap_alerts.into_iter().chain(alerts.iter().copied()).collect();
            if let Some(days) = age_from_alerts(&all) {
                intel.age_days = Some(days);
                intel.age_source = Some(AgeSource::Alert);
            }
        }

        (rdap.is_some() || intel.age_days.is_some()).then_some(intel)
    }

    fn from_rdap(rdap: &Object) -> Self {
        let age_days = number_at(rdap, &["age_days", "domain_age_days"])
            .or_else(|| object(rdap, "domain_age").and_then(|a| number_at(a, &["days", "age_days"])))
            .filter(|d| *d >= 0.0)
            .map(|d| d as u64);

        Self {
            domain: text_at(rdap, &["domain", "domain_name", "ldhName"]),
            registrar: text_at(rdap, &["registrar", "registrar_name"]),
            registered: text_at(
                rdap,
                &["registration_date", "created", "creation_date", "registered"],
            ),
            expires: text_at(rdap, &["expiration_date", "expires", "expiry_date"]),
            age_source: age_days.map(|_| AgeSource::Rdap),
            age_days,
        }
    }

    /// Age classification, if the age is known
    #[must_use]
    pub fn age(&self) -> Option<DomainAge> {
        self.age_days.map(DomainAge::classify)
    }
}

/// Alert kinds that describe the domain registration
const DOMAIN_ALERT_KINDS: &[&str] = &["domain", "rdap", "whois"];

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Whether an alert is about the domain itself
///
/// The kind must contain one of [`DOMAIN_ALERT_KINDS`] as a whole word
/// (`domain_age`, `whois`), or the description must mention "domain".
fn is_domain_alert(alert: &Object) -> bool {
    let kind_matches = text_at(alert, &["type", "category", "alert_type", "title"])
        .is_some_and(|kind| words(&kind).any(|w| DOMAIN_ALERT_KINDS.contains(&w.as_str())));
    kind_matches
        || text_at(alert, &["description", "message", "detail"])
            .is_some_and(|desc| words(&desc).any(|w| w == "domain"))
}

/// First "N days" figure in a domain-related alert
fn age_from_alerts(alerts: &[&Object]) -> Option<u64> {
    alerts
        .iter()
        .copied()
        .filter(|a| is_domain_alert(a))
        .filter_map(|a| text_at(a, &["description", "message", "detail"]))
        .find_map(|desc| days_in(&desc))
}

/// Extract the first "N days" figure from free text
#[must_use]
pub fn days_in(text: &str) -> Option<u64> {
    DAYS.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn age_classification_thresholds() {
        assert_eq!(DomainAge::classify(400).label(), "Moderate (1-3yr)");
        assert_eq!(DomainAge::classify(1200).label(), "Good (> 3yr)");
        assert_eq!(DomainAge::classify(45).label(), "Low (< 1yr)");
        assert_eq!(DomainAge::classify(365), DomainAge::Moderate);
        assert_eq!(DomainAge::classify(1095), DomainAge::Moderate);
        assert_eq!(DomainAge::classify(1096), DomainAge::Good);
    }

    #[test]
    fn age_from_rdap_field() {
        let rdap = obj(json!({"age_days": 400, "registrar": "NameCheap"}));
        let intel = DomainIntel::build(Some(&rdap), &[]).unwrap();
        assert_eq!(intel.age_days, Some(400));
        assert_eq!(intel.age_source, Some(AgeSource::Rdap));
        assert_eq!(intel.age(), Some(DomainAge::Moderate));
    }

    #[test]
    fn age_falls_back_to_alert_description() {
        let rdap = obj(json!({"registrar": "NameCheap"}));
        let alert = obj(json!({
            "type": "domain_age",
            "description": "Domain was registered only 45 days ago"
        }));

        let intel = DomainIntel::build(Some(&rdap), &[&alert]).unwrap();
        assert_eq!(intel.age_days, Some(45));
        assert_eq!(intel.age_source, Some(AgeSource::Alert));
        assert_eq!(intel.age().unwrap().label(), "Low (< 1yr)");
    }

    #[test]
    fn domain_alerts_are_preferred() {
        let refund = obj(json!({"type": "policy", "description": "Refunds within 30 days"}));
        let domain = obj(json!({"type": "domain", "description": "Registered 1,200 days ago"}));

        let intel = DomainIntel::build(None, &[&refund, &domain]).unwrap();
        assert_eq!(intel.age_days, Some(1200));
    }

    #[test]
    fn page_alerts_are_not_domain_alerts() {
        let refund = obj(json!({"type": "refund_page", "description": "Refund window is 30 days"}));
        let whois = obj(json!({"type": "whois", "description": "Domain registered 2000 days ago"}));

        let intel = DomainIntel::build(None, &[&refund, &whois]).unwrap();
        assert_eq!(intel.age_days, Some(2000));
        assert_eq!(intel.age(), Some(DomainAge::Good));
    }

    #[test]
    fn policy_alerts_never_set_an_age() {
        let refund = obj(json!({"type": "policy", "description": "Refunds accepted within 14 days"}));
        let usage = obj(json!({"type": "usage", "description": "Trial lasts 7 days"}));

        assert_eq!(DomainIntel::build(None, &[&refund, &usage]), None);

        let rdap = obj(json!({"registrar": "NameCheap"}));
        let intel = DomainIntel::build(Some(&rdap), &[&refund]).unwrap();
        assert_eq!(intel.age_days, None);
        assert_eq!(intel.age_source, None);
    }

    #[test]
    fn description_mentioning_domain_counts() {
        let alert = obj(json!({"type": "risk", "description": "Domain is only 12 days old"}));
        let intel = DomainIntel::build(None, &[&alert]).unwrap();
        assert_eq!(intel.age_days, Some(12));
    }

    #[test]
    fn nothing_known_yields_none() {
        assert_eq!(DomainIntel::build(None, &[]), None);
    }

    #[test]
    fn days_regex() {
        assert_eq!(days_in("45 days"), Some(45));
        assert_eq!(days_in("1 day old"), Some(1));
        assert_eq!(days_in("no number here"), None);
    }
}
