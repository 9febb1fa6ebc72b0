//! Dashboard metrics and KPI cards

use crate::agent::Agent;
use crate::integration::Integration;
use crate::task::{TaskPage, TaskStatus};
use serde::{Deserialize, Serialize};

/// Backend metrics from `GET /metrics`
///
/// Every field is optional; the backend reports what it has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metrics {
    /// Tasks ever created
    pub total_tasks: Option<u64>,
    /// Completed tasks
    pub completed_tasks: Option<u64>,
    /// Failed tasks
    pub failed_tasks: Option<u64>,
    /// Tasks still running
    pub processing_tasks: Option<u64>,
    /// Agents in `active` state
    pub active_agents: Option<u64>,
    /// Success rate in percent (0-100)
    pub success_rate: Option<f64>,
}

/// Values shown on the KPI cards
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kpis {
    /// Total tasks
    pub total_tasks: u64,
    /// Completed tasks
    pub completed_tasks: u64,
    /// Failed tasks
    pub failed_tasks: u64,
    /// Running tasks
    pub processing_tasks: u64,
    /// Active agents
    pub active_agents: u64,
    /// All agents
    pub total_agents: u64,
    /// Connected integrations
    pub connected_integrations: u64,
    /// All integrations
    pub total_integrations: u64,
    /// Success rate in percent, when any task has finished
    pub success_rate: Option<f64>,
    /// Whether task counts come from backend metrics or the visible page
    pub from_backend: bool,
}

impl Kpis {
    /// Derive KPI values
    ///
    /// Backend metrics win where present. Without them, task counts are
    /// computed from the visible page, which undercounts once the backend
    /// holds more than one page of tasks.
    #[must_use]
    pub fn derive(
        metrics: Option<&Metrics>,
        agents: &[Agent],
        integrations: &[Integration],
        page: &TaskPage,
    ) -> Self {
        let count = |status: TaskStatus| -> u64 {
            page.tasks.iter().filter(|t| t.status == status).count() as u64
        };

        let mut kpis = Self {
            total_tasks: page.total.max(page.tasks.len() as u64),
            completed_tasks: count(TaskStatus::Completed),
            failed_tasks: count(TaskStatus::Failed),
            processing_tasks: count(TaskStatus::Processing),
            active_agents: agents.iter().filter(|a| a.is_active()).count() as u64,
            total_agents: agents.len() as u64,
            connected_integrations: integrations.iter().filter(|i| i.is_connected()).count()
                as u64,
            total_integrations: integrations.len() as u64,
            success_rate: None,
            from_backend: false,
        };

        if let Some(m) = metrics {
            kpis.from_backend = true;
            if let Some(v) = m.total_tasks {
                kpis.total_tasks = v;
            }
            if let Some(v) = m.completed_tasks {
                kpis.completed_tasks = v;
            }
            if let Some(v) = m.failed_tasks {
                kpis.failed_tasks = v;
            }
            if let Some(v) = m.processing_tasks {
                kpis.processing_tasks = v;
            }
            if let Some(v) = m.active_agents {
                kpis.active_agents = v;
            }
            kpis.success_rate = m.success_rate;
        }

        if kpis.success_rate.is_none() {
            let finished = kpis.completed_tasks + kpis.failed_tasks;
            if finished > 0 {
                kpis.success_rate = Some(kpis.completed_tasks as f64 * 100.0 / finished as f64);
            }
        }

        kpis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentKind, AgentStatus};
    use crate::task::Task;

    fn agent(status: AgentStatus) -> Agent {
        Agent {
            id: "a".into(),
            name: "A".into(),
            kind: AgentKind::Sales,
            status,
        }
    }

    #[test]
    fn kpis_from_page_when_metrics_missing() {
        let page = TaskPage {
            tasks: vec![
                Task::new("1", "site_scan", TaskStatus::Completed),
                Task::new("2", "site_scan", TaskStatus::Completed),
                Task::new("3", "site_scan", TaskStatus::Failed),
                Task::new("4", "site_scan", TaskStatus::Processing),
            ],
            total: 4,
        };
        let agents = [agent(AgentStatus::Active), agent(AgentStatus::Paused)];

        let kpis = Kpis::derive(None, &agents, &[], &page);

        assert!(!kpis.from_backend);
        assert_eq!(kpis.completed_tasks, 2);
        assert_eq!(kpis.failed_tasks, 1);
        assert_eq!(kpis.processing_tasks, 1);
        assert_eq!(kpis.active_agents, 1);
        assert_eq!(kpis.total_agents, 2);
        let rate = kpis.success_rate.unwrap();
        assert!((rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn backend_metrics_override_page_counts() {
        let metrics = Metrics {
            total_tasks: Some(120),
            completed_tasks: Some(100),
            failed_tasks: Some(20),
            ..Metrics::default()
        };

        let kpis = Kpis::derive(Some(&metrics), &[], &[], &TaskPage::default());

        assert!(kpis.from_backend);
        assert_eq!(kpis.total_tasks, 120);
        assert_eq!(kpis.success_rate.map(f64::round), Some(83.0));
    }

    #[test]
    fn no_finished_tasks_means_no_rate() {
        let kpis = Kpis::derive(None, &[], &[], &TaskPage::default());
        assert_eq!(kpis.success_rate, None);
    }
}
