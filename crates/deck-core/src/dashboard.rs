//! Dashboard refresh and operator actions
//!
//! One refresh issues metrics, agents, integrations and tasks requests
//! concurrently. Agents and tasks are required for a usable view; the
//! other two degrade:
//! - integrations → empty list
//! - metrics → KPIs derived from the visible page
//!
//! Each degradation is recorded as a [`Degraded`] warning on the snapshot.

use crate::client::Backend;
use crate::error::Result;
use crate::poller::{PollEvent, PollHandle, Poller};
use crate::report_cache::ReportCache;
use crate::validate;
use chrono::{DateTime, Utc};
use deck_model::{
    Agent, AgentKind, ExecuteRequest, Integration, Kpis, MccSelection, Pagination, Task,
    TaskPage, TaskQuery,
};
use deck_scan::{ScanReport, ScanSummary};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::instrument;

/// A dependency that failed without failing the refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degraded {
    /// `GET /integrations` failed; shown as empty
    Integrations(String),
    /// `GET /metrics` failed; KPIs derived locally
    Metrics(String),
}

impl fmt::Display for Degraded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integrations(e) => write!(f, "integrations unavailable: {e}"),
            Self::Metrics(e) => write!(f, "metrics unavailable, showing local counts: {e}"),
        }
    }
}

/// One task list row
#[derive(Debug, Clone)]
pub struct TaskRow {
    /// Task snapshot
    pub task: Task,
    /// Scan summary, for scan actions
    pub summary: Option<ScanSummary>,
}

/// Everything one refresh produced
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    /// Agents
    pub agents: Vec<Agent>,
    /// Integrations (empty when degraded)
    pub integrations: Vec<Integration>,
    /// Task rows on the current page
    pub tasks: Vec<TaskRow>,
    /// Query that produced the page
    pub query: TaskQuery,
    /// Paging state
    pub pagination: Pagination,
    /// KPI card values
    pub kpis: Kpis,
    /// Degraded dependencies
    pub warnings: Vec<Degraded>,
    /// When the refresh completed
    pub fetched_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// Whether any dependency degraded
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Console facade over a [`Backend`]
#[derive(Clone)]
pub struct Dashboard {
    backend: Arc<dyn Backend>,
    reports: ReportCache,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("reports", &self.reports.stats())
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Create a dashboard
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, reports: ReportCache) -> Self {
        Self { backend, reports }
    }

    /// Underlying backend
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Fetch everything for one dashboard view
    #[instrument(skip(self), fields(offset = query.offset))]
    pub async fn refresh(&self, query: &TaskQuery) -> Result<DashboardSnapshot> {
        let (metrics, agents, integrations, page) = tokio::join!(
            self.backend.metrics(),
            self.backend.agents(),
            self.backend.integrations(),
            self.backend.tasks(query),
        );

        let agents = agents?;
        let page: TaskPage = page?;
        let mut warnings = Vec::new();

        let integrations = integrations.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "integrations unavailable, showing none");
            warnings.push(Degraded::Integrations(err.to_string()));
            Vec::new()
        });

        let metrics = metrics
            .map_err(|err| {
                tracing::warn!(error = %err, "metrics unavailable, deriving KPIs locally");
                warnings.push(Degraded::Metrics(err.to_string()));
            })
            .ok();

        let kpis = Kpis::derive(metrics.as_ref(), &agents, &integrations, &page);
        let pagination = Pagination::new(query, page.total);

        let tasks = self.rows(page.tasks).await;

        Ok(DashboardSnapshot {
            agents,
            integrations,
            tasks,
            query: query.clone(),
            pagination,
            kpis,
            warnings,
            fetched_at: Utc::now(),
        })
    }

    /// Fetch one task page with scan summaries
    pub async fn tasks(&self, query: &TaskQuery) -> Result<(Vec<TaskRow>, Pagination)> {
        let page = self.backend.tasks(query).await?;
        let pagination = Pagination::new(query, page.total);
        Ok((self.rows(page.tasks).await, pagination))
    }

    async fn rows(&self, tasks: Vec<Task>) -> Vec<TaskRow> {
        let mut rows = Vec::with_capacity(tasks.len());
        for task in tasks {
            let summary = if task.is_scan() {
                Some(self.reports.report(&task).await.summary())
            } else {
                None
            };
            rows.push(TaskRow { task, summary });
        }
        rows
    }

    /// Refresh `query` every `period` until the handle is stopped or dropped
    pub fn watch(
        &self,
        query: TaskQuery,
        period: Duration,
    ) -> (PollHandle, mpsc::Receiver<PollEvent<DashboardSnapshot>>) {
        let dashboard = self.clone();
        Poller::spawn(period, move || {
            let dashboard = dashboard.clone();
            let query = query.clone();
            async move { dashboard.refresh(&query).await }
        })
    }

    /// Fetch one task and its report
    pub async fn report(&self, task_id: &str) -> Result<(Task, Arc<ScanReport>)> {
        let task = self.backend.task(task_id).await?;
        let report = self.reports.report(&task).await;
        Ok((task, report))
    }

    /// Validate and submit an agent action
    pub async fn execute(&self, kind: &AgentKind, request: ExecuteRequest) -> Result<Task> {
        let request = validate::execute_request(request)?;
        self.backend.execute(kind, &request).await
    }

    /// Validate and submit an MCC selection for an already fetched task
    ///
    /// The primary suggestion is read from the task's scan report.
    pub async fn select_mcc(
        &self,
        task: &Task,
        code: &str,
        reason: Option<&str>,
        selected_by: &str,
    ) -> Result<MccSelection> {
        let report = self.reports.report(task).await;
        let primary = primary_mcc(&report);
        let selection = validate::mcc_selection(code, reason, primary, selected_by)?;
        self.backend.select_mcc(&task.id, &selection).await?;
        Ok(selection)
    }
}

/// System's primary MCC suggestion in a report
#[must_use]
pub fn primary_mcc(report: &ScanReport) -> Option<&str> {
    match report {
        ScanReport::Comprehensive(view) => view.mcc.as_ref().and_then(|m| m.primary_code()),
        _ => None,
    }
}
