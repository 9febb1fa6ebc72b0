//! Subcommands against the in-memory backend

use deck_cli::{command, dispatch, watch};
use deck_core::{Dashboard, DeckConfig, ReportCache};
use deck_model::{MccSource, TaskQuery};
use deck_test_utils::{MockBackend, Toggle};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    backend: Arc<MockBackend>,
    dashboard: Dashboard,
    config: DeckConfig,
}

impl Harness {
    fn new() -> Self {
        let backend = Arc::new(MockBackend::with_fixtures());
        let dashboard = Dashboard::new(backend.clone(), ReportCache::new(16));
        Self {
            backend,
            dashboard,
            config: DeckConfig::new().with_operator("ops@example"),
        }
    }

    async fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let matches = command().try_get_matches_from(
            std::iter::once("agentdeck").chain(args.iter().copied()),
        )?;
        let mut out = Vec::new();
        dispatch(&matches, &self.dashboard, &self.config, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }
}

#[tokio::test]
async fn tasks_lists_summaries_with_page_footer() {
    let h = Harness::new();
    let out = h.run(&["tasks", "--agent", "a1", "--limit", "2"]).await.unwrap();

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3, "{out}");
    assert!(lines[0].starts_with("t1 "), "{out}");
    assert!(lines[0].ends_with("[comprehensive] MCC 5999 | risk MEDIUM (2 keywords) | compliance 72/100 | domain Moderate (1-3yr)"));
    assert!(lines[1].contains("[kyc] ESCALATE"), "{out}");
    assert_eq!(lines[2], "page 1 of 2  [more with --offset]");
    assert_eq!(h.backend.calls(), vec!["GET /tasks?offset=0&limit=2"]);
}

#[tokio::test]
async fn report_single_tab() {
    let h = Harness::new();
    let out = h.run(&["report", "t1", "--tab", "mcc"]).await.unwrap();

    assert!(out.contains("== mcc =="), "{out}");
    assert!(out.contains("primary   5999 Miscellaneous and Specialty Retail Stores (85%)"), "{out}");
    assert!(out.contains("secondary 5947"), "{out}");
    assert!(!out.contains("== domain =="), "{out}");
}

#[tokio::test]
async fn report_as_json() {
    let h = Harness::new();
    let out = h.run(&["report", "t3", "--json"]).await.unwrap();

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["kind"], "legacy");
    assert_eq!(value["view"]["overall_score"], 65.0);
}

#[tokio::test]
async fn missing_task_is_an_error() {
    let h = Harness::new();
    let err = h.run(&["report", "nope"]).await.unwrap_err();
    assert!(err.to_string().contains("fetching task nope"), "{err:#}");
}

#[tokio::test]
async fn execute_validates_before_sending() {
    let h = Harness::new();

    let err = h
        .run(&["execute", "site_scan", "kyc_site_scan", "--input", "url=shop.example"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("business_name"), "{err:#}");
    assert!(h.backend.executed().is_empty());

    let out = h
        .run(&[
            "execute",
            "site_scan",
            "kyc_site_scan",
            "--input",
            "url=shop.example",
            "--input",
            "business_name=Example Shop Ltd",
        ])
        .await
        .unwrap();
    assert_eq!(out, "Started task new-1 (kyc_site_scan, processing)\n");

    let executed = h.backend.executed();
    assert_eq!(executed[0].1.input["url"], "https://shop.example");
}

#[tokio::test]
async fn numeric_scan_url_is_refused() {
    let h = Harness::new();
    let err = h
        .run(&["execute", "site_scan", "site_scan", "--input", "url=12345"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid URL"), "{err:#}");
    assert!(h.backend.executed().is_empty());
}

#[tokio::test]
async fn mcc_uses_configured_operator() {
    let h = Harness::new();
    h.run(&["mcc", "t1", "5947", "--reason", "greeting cards"]).await.unwrap();

    let selections = h.backend.selections();
    assert_eq!(selections[0].0, "t1");
    assert_eq!(selections[0].1.selected_by, "ops@example");
    assert_eq!(selections[0].1.source, MccSource::Manual);
}

#[tokio::test]
async fn mcc_override_without_reason_is_refused() {
    let h = Harness::new();
    assert!(h.run(&["mcc", "t1", "5947"]).await.is_err());
    assert!(h.backend.selections().is_empty());
}

#[tokio::test]
async fn integrations_add_and_remove() {
    let h = Harness::new();

    let out = h
        .run(&["integration", "add", "Mailer", "email", "--set", "host=smtp.example"])
        .await
        .unwrap();
    assert!(out.starts_with("Added integration int-1"), "{out}");

    let out = h.run(&["integration", "remove", "i2"]).await.unwrap();
    assert_eq!(out, "Removed integration i2\n");

    let out = h.run(&["integrations"]).await.unwrap();
    assert!(out.contains("Mailer"), "{out}");
    assert!(!out.contains("Slack"), "{out}");
}

#[tokio::test(start_paused = true)]
async fn watch_prints_until_stopped() {
    let h = Harness::new();
    h.backend.set_failing(Toggle::Integrations, true);

    let mut out = Vec::new();
    let stop = tokio::time::sleep(Duration::from_secs(7));
    watch(&h.dashboard, TaskQuery::new(10), Duration::from_secs(5), &mut out, stop)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.matches("Agent Deck ").count(), 2, "{out}");
    assert!(out.contains("! integrations unavailable"), "{out}");
}
