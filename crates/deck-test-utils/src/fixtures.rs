//! Payload and entity fixtures

use chrono::{Duration, TimeZone, Utc};
use deck_model::{
    Agent, AgentKind, AgentStatus, Integration, IntegrationStatus, Metrics, Task, TaskStatus,
};
use serde_json::{json, Value};

pub fn comprehensive_scan() -> Value {
    json!({
        "url": "https://shop.example",
        "scan_status": {"status": "completed", "message": "12 pages crawled"},
        "business_details": {
            "business_name": "Example Shop Ltd",
            "country": "GB",
            "contact_email": "hello@shop.example"
        },
        "policy_details": {
            "privacy_policy": {"found": true, "url": "https://shop.example/privacy"},
            "terms_conditions": {"found": true, "url": "https://shop.example/terms"},
            "refund_policy": {"found": false},
            "shipping_policy": {"found": true, "url": "https://shop.example/shipping"}
        },
        "mcc_codes": {
            "primary": {
                "code": "5999",
                "description": "Miscellaneous and Specialty Retail Stores",
                "confidence": 85,
                "matched_keywords": ["shop", "gifts"]
            },
            "secondary": [
                {"code": "5947", "description": "Gift, Card, Novelty and Souvenir Shops", "confidence": 60}
            ]
        },
        "content_risk": {
            "risk_score": 35,
            "risk_level": "medium",
            "keywords": [
                {"keyword": "firearms", "category": "weapons", "page_type": "terms_conditions", "intent": "prohibitive"},
                {"keyword": "cbd", "category": "drugs", "page_type": "product", "intent": "promotional"},
                {"keyword": "replica", "category": "counterfeit", "page_type": "home", "intent": "descriptive"}
            ]
        },
        "compliance_intelligence": {
            "compliance_score": {"overall_score": 72, "policy_score": 80, "content_score": 64},
            "risk_level": "medium",
            "alerts": [
                {"type": "policy", "severity": "high", "description": "Refund policy not found"}
            ]
        },
        "rdap": {
            "domain": "shop.example",
            "registrar": "Example Registrar",
            "registration_date": "2025-01-10",
            "age_days": 400
        },
        "change_intelligence": {
            "summary": "1 change since last scan",
            "changes": [{
                "change_type": "pricing",
                "description": "Average price rose 40%",
                "severity": "medium",
                "confidence": 90,
                "business_impact": "Higher ticket size",
                "recommended_action": "Review transaction limits"
            }]
        },
        "crawl_summary": {"pages_crawled": 12, "duration_seconds": 41}
    })
}

pub fn comprehensive_output() -> Value {
    json!({"comprehensive_site_scan": comprehensive_scan()})
}

pub fn kyc_payload() -> Value {
    json!({
        "decision": {"value": "escalate"},
        "confidence_score": 0.87,
        "compliance_score": {"overall_score": 72, "identity": 90, "policy": 55},
        "reason_codes": [
            {"code": "R101", "description": "Refund policy missing", "auto_escalate": true},
            {"code": "R200", "description": "Business name matched"}
        ],
        "policy_checks": [
            {"name": "privacy_policy", "status": "passed"},
            {"name": "refund_policy", "status": "missing"}
        ],
        "entity_match": {"score": 91, "matched": true, "registry": "Companies House"},
        "checkout_flow": {"has_cart": true, "has_checkout": true, "shows_prices": false},
        "audit_trail": [
            {"timestamp": "2026-03-01T10:00:00Z", "step": "crawl", "detail": "12 pages"},
            {"timestamp": "2026-03-01T10:01:00Z", "step": "decide", "detail": "escalated"}
        ]
    })
}

/// KYC payload string-encoded inside `raw_output.response`
pub fn kyc_output_nested() -> Value {
    json!({
        "raw_output": {
            "status": "ok",
            "response": kyc_payload().to_string()
        }
    })
}

pub fn legacy_output() -> Value {
    json!({
        "base_url": "https://old.example",
        "overall_score": 65,
        "compliance_checks": {
            "privacy_policy": {"found": true, "url": "https://old.example/privacy"},
            "refund_policy": {"status": "missing"},
            "ssl": true,
            "contact_info": {"status": "pass"}
        }
    })
}

/// `value` serialised inside a markdown code fence
pub fn fenced(value: &Value) -> String {
    format!(
        "Here is the scan result:\n\n```json\n{}\n```\n",
        serde_json::to_string_pretty(value).unwrap()
    )
}

pub fn base_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
}

pub fn task(id: &str, action: &str, status: TaskStatus, output: Value) -> Task {
    let mut task = Task::new(id, action, status).with_output(output);
    task.created_at = Some(base_time());
    if status.is_terminal() {
        task.completed_at = Some(base_time() + Duration::minutes(2));
    }
    task
}

pub fn completed_scan(id: &str, output: Value) -> Task {
    task(id, "comprehensive_site_scan", TaskStatus::Completed, output)
}

pub fn agents() -> Vec<Agent> {
    vec![
        Agent {
            id: "a1".into(),
            name: "Site Scanner".into(),
            kind: AgentKind::SiteScan,
            status: AgentStatus::Active,
        },
        Agent {
            id: "a2".into(),
            name: "Outreach".into(),
            kind: AgentKind::Sales,
            status: AgentStatus::Paused,
        },
    ]
}

pub fn integrations() -> Vec<Integration> {
    vec![
        Integration {
            id: "i1".into(),
            name: "CRM".into(),
            service: "crm".into(),
            status: IntegrationStatus::Connected,
            last_sync: Some(base_time()),
            config: None,
        },
        Integration {
            id: "i2".into(),
            name: "Slack".into(),
            service: "slack".into(),
            status: IntegrationStatus::Error,
            last_sync: None,
            config: None,
        },
    ]
}

/// A mixed page: one of each scan schema, one raw failure, one non-scan task
pub fn mixed_tasks() -> Vec<Task> {
    vec![
        completed_scan("t1", comprehensive_output()).with_agent("a1"),
        task("t2", "kyc_site_scan", TaskStatus::Completed, kyc_output_nested()).with_agent("a1"),
        task("t3", "site_scan", TaskStatus::Completed, legacy_output()).with_agent("a1"),
        task("t4", "site_scan", TaskStatus::Failed, json!("upstream timeout"))
            .with_agent("a1")
            .with_error("crawler timed out"),
        task("t5", "send_email", TaskStatus::Processing, Value::Null).with_agent("a2"),
    ]
}

/// Backend metrics matching [`mixed_tasks`]
pub fn metrics() -> Metrics {
    Metrics {
        total_tasks: Some(5),
        completed_tasks: Some(3),
        failed_tasks: Some(1),
        processing_tasks: Some(1),
        active_agents: Some(1),
        success_rate: Some(75.0),
    }
}
