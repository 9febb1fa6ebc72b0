//! Plain-text rendering
//!
//! Every renderer is a `Display` wrapper so output can go to stdout or be
//! compared in tests.

use chrono::{DateTime, Utc};
use deck_core::{DashboardSnapshot, TaskRow};
use deck_model::{Agent, Integration, Kpis, Pagination, Task};
use deck_scan::format::{fraction_as_percent, percent, score_out_of_100};
use deck_scan::view::comprehensive::{ComprehensiveView, PolicyPage};
use deck_scan::view::domain::AgeSource;
use deck_scan::view::{KycReport, KycView, LegacyView};
use deck_scan::{ScanReport, Tab};
use std::fmt::{self, Display, Formatter};

fn mark(passed: Option<bool>) -> &'static str {
    match passed {
        Some(true) => "✓",
        Some(false) => "✗",
        None => "?",
    }
}

fn time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn maybe_time(at: Option<&DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), time)
}

fn field_rows(f: &mut Formatter<'_>, rows: &[(String, String)]) -> fmt::Result {
    let width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (key, value) in rows {
        writeln!(f, "  {key:<width$}  {value}")?;
    }
    Ok(())
}

/// KPI cards line
pub struct KpiCards<'a>(pub &'a Kpis);

impl Display for KpiCards<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let k = self.0;
        write!(
            f,
            "Tasks {} ({} completed, {} failed, {} running) | Success {} | Agents {}/{} active | Integrations {}/{} connected",
            k.total_tasks,
            k.completed_tasks,
            k.failed_tasks,
            k.processing_tasks,
            k.success_rate.map_or_else(|| "n/a".to_string(), percent),
            k.active_agents,
            k.total_agents,
            k.connected_integrations,
            k.total_integrations,
        )?;
        if !k.from_backend {
            f.write_str(" (local counts)")?;
        }
        Ok(())
    }
}

/// Agent list
pub struct AgentTable<'a>(pub &'a [Agent]);

impl Display for AgentTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "no agents");
        }
        for agent in self.0 {
            writeln!(
                f,
                "{:<8} {:<24} {:<16} {}",
                agent.id,
                agent.name,
                agent.kind.as_str(),
                agent.status.as_str()
            )?;
        }
        Ok(())
    }
}

/// Integration list
pub struct IntegrationTable<'a>(pub &'a [Integration]);

impl Display for IntegrationTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "no integrations");
        }
        for i in self.0 {
            let synced = i.last_sync.as_ref().map_or_else(|| "never".to_string(), time);
            writeln!(
                f,
                "{:<8} {:<20} {:<12} {:<13} last sync {}",
                i.id,
                i.name,
                i.service,
                i.status.as_str(),
                synced
            )?;
        }
        Ok(())
    }
}

/// Task page with scan summaries
pub struct TaskTable<'a> {
    /// Rows on the page
    pub rows: &'a [TaskRow],
    /// Paging state
    pub pagination: Pagination,
}

impl Display for TaskTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            writeln!(f, "no tasks")?;
        }
        for row in self.rows {
            let task = &row.task;
            write!(
                f,
                "{:<8} {:<11} {:<24} {}",
                task.id,
                task.status.as_str(),
                task.action,
                maybe_time(task.created_at.as_ref())
            )?;
            if let Some(summary) = &row.summary {
                write!(f, "  {summary}")?;
            } else if let Some(error) = &task.error {
                write!(f, "  error: {error}")?;
            }
            writeln!(f)?;
        }

        let p = self.pagination;
        write!(f, "page {} of {}", p.page, p.pages)?;
        if p.has_previous {
            f.write_str("  [--offset back available]")?;
        }
        if p.has_next {
            f.write_str("  [more with --offset]")?;
        }
        writeln!(f)
    }
}

/// Full dashboard
pub struct DashboardView<'a>(pub &'a DashboardSnapshot);

impl Display for DashboardView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = self.0;
        writeln!(f, "Agent Deck  {}", time(&s.fetched_at))?;
        for warning in &s.warnings {
            writeln!(f, "! {warning}")?;
        }
        writeln!(f, "{}", KpiCards(&s.kpis))?;
        writeln!(f)?;
        writeln!(f, "Agents")?;
        write!(f, "{}", AgentTable(&s.agents))?;
        writeln!(f)?;
        writeln!(f, "Integrations")?;
        write!(f, "{}", IntegrationTable(&s.integrations))?;
        writeln!(f)?;
        writeln!(f, "Tasks")?;
        write!(
            f,
            "{}",
            TaskTable {
                rows: &s.tasks,
                pagination: s.pagination,
            }
        )
    }
}

/// One task's scan report, all tabs or a single one
pub struct ReportView<'a> {
    /// Task the report belongs to
    pub task: &'a Task,
    /// Built report
    pub report: &'a ScanReport,
    /// Only this tab, if set
    pub tab: Option<Tab>,
}

impl Display for ReportView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let task = self.task;
        writeln!(
            f,
            "Task {} | {} | {} | {}",
            task.id,
            task.action,
            task.status,
            self.report.summary()
        )?;

        let available = self.report.tabs();
        let tabs = match self.tab {
            Some(tab) if available.contains(&tab) => vec![tab],
            Some(tab) => {
                let names: Vec<&str> = available.iter().map(|t| t.as_str()).collect();
                return writeln!(f, "no {tab} tab in this report (available: {})", names.join(", "));
            }
            None => available,
        };

        for tab in tabs {
            writeln!(f)?;
            writeln!(f, "== {tab} ==")?;
            write_tab(f, self.report, tab)?;
        }
        Ok(())
    }
}

fn write_tab(f: &mut Formatter<'_>, report: &ScanReport, tab: Tab) -> fmt::Result {
    match report {
        ScanReport::Kyc(KycReport::Decision(view)) => kyc_tab(f, view, tab),
        ScanReport::Kyc(KycReport::Insufficient { status, error }) => {
            writeln!(f, "Insufficient data for a decision (task {status})")?;
            if let Some(error) = error {
                writeln!(f, "error: {error}")?;
            }
            Ok(())
        }
        ScanReport::Comprehensive(view) => comprehensive_tab(f, view, tab),
        ScanReport::Legacy(view) => legacy_tab(f, view, tab),
        ScanReport::Raw { raw, status, error } => {
            if let Some(error) = error {
                writeln!(f, "{status}: {error}")?;
            }
            if raw.is_empty() {
                writeln!(f, "(no output)")
            } else {
                writeln!(f, "{}", raw.text)
            }
        }
    }
}

fn kyc_tab(f: &mut Formatter<'_>, view: &KycView, tab: Tab) -> fmt::Result {
    match tab {
        Tab::Decision => {
            let label = view.decision.as_ref().map_or("NO DECISION", |d| d.label.as_str());
            writeln!(f, "Decision    {label}")?;
            if let Some(c) = view.confidence {
                writeln!(f, "Confidence  {}", fraction_as_percent(c))?;
            }
            if let Some(score) = &view.compliance {
                if let Some(overall) = score.overall {
                    writeln!(f, "Compliance  {}", score_out_of_100(overall))?;
                }
                for (name, value) in &score.parts {
                    writeln!(f, "  {name:<14} {}", score_out_of_100(*value))?;
                }
            }
            if view.unwrapped {
                writeln!(f, "(payload read from nested response)")?;
            }
            Ok(())
        }
        Tab::Reasons => {
            for reason in &view.reason_codes {
                let flag = if reason.auto_fail {
                    " [AUTO FAIL]"
                } else if reason.auto_escalate {
                    " [AUTO ESCALATE]"
                } else {
                    ""
                };
                writeln!(
                    f,
                    "{}{flag}  {}",
                    reason.code,
                    reason.description.as_deref().unwrap_or("")
                )?;
            }
            Ok(())
        }
        Tab::Checks => {
            for check in &view.policy_checks {
                write!(f, "{} {}", mark(check.passed), check.name)?;
                if let Some(detail) = &check.detail {
                    write!(f, "  {detail}")?;
                }
                writeln!(f)?;
            }
            if !view.checkout_flow.is_empty() {
                writeln!(f, "Checkout flow")?;
                for (step, ok) in &view.checkout_flow {
                    writeln!(f, "  {} {step}", mark(Some(*ok)))?;
                }
            }
            Ok(())
        }
        Tab::Entity => {
            if let Some(entity) = &view.entity_match {
                if let Some(score) = entity.score {
                    writeln!(f, "Match score {}", score_out_of_100(score))?;
                }
                if let Some(matched) = entity.matched {
                    writeln!(f, "Matched     {}", if matched { "yes" } else { "no" })?;
                }
                field_rows(f, &entity.fields)?;
            }
            Ok(())
        }
        Tab::Audit => {
            for entry in &view.audit_trail {
                writeln!(
                    f,
                    "{:<22} {:<12} {}",
                    entry.timestamp.as_deref().unwrap_or("-"),
                    entry.step.as_deref().unwrap_or("-"),
                    entry.detail.as_deref().unwrap_or("")
                )?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn policy_line(f: &mut Formatter<'_>, key: &str, page: &PolicyPage) -> fmt::Result {
    write!(f, "{} {key}", mark(Some(page.found)))?;
    if let Some(url) = &page.url {
        write!(f, "  {url}")?;
    }
    if let Some(evidence) = &page.evidence {
        write!(f, "  \"{evidence}\"")?;
    }
    writeln!(f)
}

fn comprehensive_tab(f: &mut Formatter<'_>, view: &ComprehensiveView, tab: Tab) -> fmt::Result {
    match tab {
        Tab::Overview => {
            if let Some(url) = &view.target_url {
                writeln!(f, "Target  {url}")?;
            }
            if let Some(status) = &view.scan_status {
                writeln!(f, "Status  {status}")?;
            }
            if let Some(missing) = view.policies.as_ref().map(|p| p.missing()) {
                if !missing.is_empty() {
                    writeln!(f, "Missing policies: {}", missing.join(", "))?;
                }
            }
            Ok(())
        }
        Tab::Business => {
            if let Some(business) = &view.business {
                if let Some(name) = &business.name {
                    writeln!(f, "{name}")?;
                }
                field_rows(f, &business.fields)?;
            }
            Ok(())
        }
        Tab::Policies => {
            if let Some(policies) = &view.policies {
                for (key, page) in &policies.pages {
                    policy_line(f, key, page)?;
                }
            }
            Ok(())
        }
        Tab::Mcc => {
            let Some(mcc) = &view.mcc else { return Ok(()) };
            let suggestions = mcc
                .primary
                .iter()
                .map(|s| ("primary", s))
                .chain(mcc.secondary.iter().map(|s| ("secondary", s)));
            for (rank, s) in suggestions {
                write!(f, "{rank:<9} {} {}", s.code, s.description.as_deref().unwrap_or(""))?;
                if let Some(c) = s.confidence {
                    write!(f, " ({})", percent(c))?;
                }
                writeln!(f)?;
                if !s.matched_keywords.is_empty() {
                    writeln!(f, "          keywords: {}", s.matched_keywords.join(", "))?;
                }
            }
            Ok(())
        }
        Tab::ContentRisk => {
            let Some(risk) = &view.content_risk else { return Ok(()) };
            write!(f, "Risk {}", risk.risk_level.as_deref().unwrap_or("UNRATED"))?;
            if let Some(score) = risk.risk_score {
                write!(f, " {}", score_out_of_100(score))?;
            }
            writeln!(f, ", {} risk keyword(s)", risk.risk_count())?;
            for (category, hits) in risk.groups() {
                let words: Vec<&str> = hits.iter().map(|h| h.keyword.as_str()).collect();
                writeln!(f, "  {category}: {}", words.join(", "))?;
            }
            if !risk.policy_mentions.is_empty() {
                writeln!(f, "Policy mentions (not counted)")?;
                for hit in &risk.policy_mentions {
                    writeln!(
                        f,
                        "  {} on {}",
                        hit.keyword,
                        hit.page_type.as_deref().unwrap_or("?")
                    )?;
                }
            }
            Ok(())
        }
        Tab::Compliance => {
            let Some(compliance) = &view.compliance else { return Ok(()) };
            if let Some(score) = compliance.overall_score {
                writeln!(f, "Overall  {}", score_out_of_100(score))?;
            }
            for (name, value) in &compliance.sub_scores {
                writeln!(f, "  {name:<16} {}", score_out_of_100(*value))?;
            }
            if let Some(level) = &compliance.risk_level {
                writeln!(f, "Risk level {level}")?;
            }
            for alert in &compliance.alerts {
                writeln!(
                    f,
                    "! [{}] {}",
                    alert.severity.as_deref().unwrap_or("info"),
                    alert.description
                )?;
            }
            Ok(())
        }
        Tab::Domain => {
            let Some(domain) = &view.domain else { return Ok(()) };
            let rows: Vec<(String, String)> = [
                ("Domain", domain.domain.clone()),
                ("Registrar", domain.registrar.clone()),
                ("Registered", domain.registered.clone()),
                ("Expires", domain.expires.clone()),
            ]
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
            .collect();
            field_rows(f, &rows)?;
            if let (Some(days), Some(age)) = (domain.age_days, domain.age()) {
                let source = match domain.age_source {
                    Some(AgeSource::Alert) => " (from alert)",
                    _ => "",
                };
                writeln!(f, "Age {days} days: {age}{source}")?;
            }
            Ok(())
        }
        Tab::Changes => {
            let Some(changes) = &view.changes else { return Ok(()) };
            if let Some(summary) = &changes.summary {
                writeln!(f, "{summary}")?;
            }
            for change in &changes.entries {
                write!(
                    f,
                    "- [{}] {}",
                    change.severity.as_deref().unwrap_or("info"),
                    change.description.as_deref().unwrap_or("change")
                )?;
                if let Some(c) = change.confidence {
                    write!(f, " ({} confidence)", percent(c))?;
                }
                writeln!(f)?;
                if let Some(impact) = &change.business_impact {
                    writeln!(f, "  impact: {impact}")?;
                }
                if let Some(action) = &change.recommended_action {
                    writeln!(f, "  action: {action}")?;
                }
            }
            Ok(())
        }
        Tab::Crawl => {
            let Some(crawl) = &view.crawl else { return Ok(()) };
            if let Some(pages) = crawl.pages_crawled {
                writeln!(f, "{pages} pages crawled")?;
            }
            field_rows(f, &crawl.fields)
        }
        _ => Ok(()),
    }
}

fn legacy_tab(f: &mut Formatter<'_>, view: &LegacyView, tab: Tab) -> fmt::Result {
    match tab {
        Tab::Overview => {
            if let Some(url) = &view.base_url {
                writeln!(f, "Target  {url}")?;
            }
            if let Some(score) = view.overall_score {
                writeln!(f, "Score   {}", score_out_of_100(score))?;
            }
            field_rows(f, &view.fields)
        }
        Tab::Checks => {
            for check in &view.checks {
                write!(f, "{} {}", mark(check.passed), check.name)?;
                if let Some(detail) = &check.detail {
                    write!(f, "  {detail}")?;
                }
                writeln!(f)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_model::{Kpis, TaskQuery, TaskStatus};
    use deck_test_utils::{completed_scan, comprehensive_output, kyc_output_nested, task};
    use pretty_assertions::assert_eq;

    fn render(task: &Task, tab: Option<Tab>) -> String {
        let report = ScanReport::build(task);
        ReportView {
            task,
            report: &report,
            tab,
        }
        .to_string()
    }

    #[test]
    fn kpi_cards_mark_local_counts() {
        let kpis = Kpis {
            total_tasks: 4,
            completed_tasks: 2,
            failed_tasks: 1,
            processing_tasks: 1,
            active_agents: 1,
            total_agents: 2,
            connected_integrations: 0,
            total_integrations: 1,
            success_rate: Some(66.7),
            from_backend: false,
        };
        assert_eq!(
            KpiCards(&kpis).to_string(),
            "Tasks 4 (2 completed, 1 failed, 1 running) | Success 66.7% | Agents 1/2 active | Integrations 0/1 connected (local counts)"
        );
    }

    #[test]
    fn kyc_decision_tab_scales_confidence_only() {
        let task = task("t2", "kyc_site_scan", TaskStatus::Completed, kyc_output_nested());
        let text = render(&task, Some(Tab::Decision));

        assert!(text.contains("Decision    ESCALATE"), "{text}");
        assert!(text.contains("Confidence  87.0%"), "{text}");
        assert!(text.contains("Compliance  72/100"), "{text}");
    }

    #[test]
    fn content_risk_tab_lists_policy_mentions_apart() {
        let text = render(&completed_scan("t1", comprehensive_output()), Some(Tab::ContentRisk));

        assert!(text.contains("Risk MEDIUM 35/100, 2 risk keyword(s)"), "{text}");
        assert!(text.contains("Policy mentions (not counted)"), "{text}");
        assert!(text.contains("firearms on terms_conditions"), "{text}");
    }

    #[test]
    fn domain_tab_shows_age_band() {
        let text = render(&completed_scan("t1", comprehensive_output()), Some(Tab::Domain));
        assert!(text.contains("Age 400 days: Moderate (1-3yr)"), "{text}");
    }

    #[test]
    fn unavailable_tab_lists_alternatives() {
        let text = render(&completed_scan("t1", comprehensive_output()), Some(Tab::Audit));
        assert!(text.contains("no audit tab in this report"), "{text}");
        assert!(text.contains("mcc"), "{text}");
    }

    #[test]
    fn raw_tab_shows_error_and_text() {
        let t = task("t4", "site_scan", TaskStatus::Failed, serde_json::json!("upstream timeout"))
            .with_error("crawler timed out");
        let text = render(&t, None);
        assert!(text.contains("== raw =="), "{text}");
        assert!(text.contains("failed: crawler timed out"), "{text}");
        assert!(text.contains("upstream timeout"), "{text}");
    }

    #[test]
    fn task_table_footer() {
        let table = TaskTable {
            rows: &[],
            pagination: Pagination::new(&TaskQuery::new(10).at_offset(10), 25),
        };
        assert_eq!(
            table.to_string(),
            "no tasks\npage 2 of 3  [--offset back available]  [more with --offset]\n"
        );
    }

    #[test]
    fn unknown_creation_time_shows_a_dash() {
        let mut undated = task("t9", "send_email", TaskStatus::Processing, serde_json::Value::Null);
        undated.created_at = None;
        let rows = [TaskRow { task: undated, summary: None }];
        let table = TaskTable {
            rows: &rows,
            pagination: Pagination::new(&TaskQuery::new(10), 1),
        };

        let out = table.to_string();
        let first = out.lines().next().unwrap();
        assert!(first.starts_with("t9 "), "{out}");
        assert!(first.trim_end().ends_with(" -"), "{out}");
    }
}
