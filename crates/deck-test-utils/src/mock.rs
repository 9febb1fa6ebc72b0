//! In-memory backend

use crate::fixtures;
use async_trait::async_trait;
use chrono::Utc;
use deck_core::{Backend, DeckError, Result};
use deck_model::{
    Agent, AgentKind, ExecuteRequest, Integration, IntegrationStatus, MccSelection, Metrics,
    NewIntegration, Task, TaskPage, TaskQuery, TaskStatus,
};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

/// Endpoints whose failure can be switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Agents,
    Integrations,
    Tasks,
    Metrics,
}

#[derive(Debug, Default)]
struct State {
    agents: Vec<Agent>,
    integrations: Vec<Integration>,
    tasks: Vec<Task>,
    metrics: Option<Metrics>,
    executed: Vec<(AgentKind, ExecuteRequest)>,
    selections: Vec<(String, MccSelection)>,
    calls: Vec<String>,
}

/// Backend serving fixed data from memory
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<State>,
    fail_agents: AtomicBool,
    fail_integrations: AtomicBool,
    fail_tasks: AtomicBool,
    fail_metrics: AtomicBool,
    next_id: AtomicU32,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agents, integrations, metrics and the mixed task page from the fixtures
    pub fn with_fixtures() -> Self {
        let backend = Self::new();
        {
            let mut state = backend.state.lock().unwrap();
            state.agents = fixtures::agents();
            state.integrations = fixtures::integrations();
            state.tasks = fixtures::mixed_tasks();
            state.metrics = Some(fixtures::metrics());
        }
        backend
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        self.state.lock().unwrap().tasks = tasks;
        self
    }

    pub fn with_metrics(self, metrics: Metrics) -> Self {
        self.state.lock().unwrap().metrics = Some(metrics);
        self
    }

    pub fn set_failing(&self, toggle: Toggle, failing: bool) {
        let flag = match toggle {
            Toggle::Agents => &self.fail_agents,
            Toggle::Integrations => &self.fail_integrations,
            Toggle::Tasks => &self.fail_tasks,
            Toggle::Metrics => &self.fail_metrics,
        };
        flag.store(failing, Ordering::SeqCst);
    }

    pub fn push_task(&self, task: Task) {
        self.state.lock().unwrap().tasks.push(task);
    }

    /// Requests seen so far, as `"GET /agents"` style strings
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn executed(&self) -> Vec<(AgentKind, ExecuteRequest)> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn selections(&self) -> Vec<(String, MccSelection)> {
        self.state.lock().unwrap().selections.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn check(&self, flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(DeckError::Http {
                status: 503,
                body: format!("{what} unavailable"),
            })
        } else {
            Ok(())
        }
    }

    fn not_found(what: &str, id: &str) -> DeckError {
        DeckError::Http {
            status: 404,
            body: format!("{what} {id} not found"),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn agents(&self) -> Result<Vec<Agent>> {
        self.record("GET /agents".into());
        self.check(&self.fail_agents, "agents")?;
        Ok(self.state.lock().unwrap().agents.clone())
    }

    async fn integrations(&self) -> Result<Vec<Integration>> {
        self.record("GET /integrations".into());
        self.check(&self.fail_integrations, "integrations")?;
        Ok(self.state.lock().unwrap().integrations.clone())
    }

    async fn tasks(&self, query: &TaskQuery) -> Result<TaskPage> {
        self.record(format!("GET /tasks?offset={}&limit={}", query.offset, query.limit));
        self.check(&self.fail_tasks, "tasks")?;

        let state = self.state.lock().unwrap();
        let matching: Vec<&Task> = state
            .tasks
            .iter()
            .filter(|t| {
                query
                    .agent_id
                    .as_ref()
                    .map_or(true, |a| t.agent_id.as_ref() == Some(a))
            })
            .collect();

        let total = matching.len() as u64;
        let tasks = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok(TaskPage { tasks, total })
    }

    async fn task(&self, id: &str) -> Result<Task> {
        self.record(format!("GET /tasks/{id}"));
        self.check(&self.fail_tasks, "tasks")?;
        self.state
            .lock()
            .unwrap()
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("task", id))
    }

    async fn metrics(&self) -> Result<Metrics> {
        self.record("GET /metrics".into());
        self.check(&self.fail_metrics, "metrics")?;
        self.state
            .lock()
            .unwrap()
            .metrics
            .clone()
            .ok_or_else(|| Self::not_found("metrics", ""))
    }

    async fn execute(&self, kind: &AgentKind, request: &ExecuteRequest) -> Result<Task> {
        self.record(format!("POST /agents/{kind}/execute"));
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut task = Task::new(format!("new-{n}"), request.action.clone(), TaskStatus::Processing);
        task.input = request.input.clone();

        let mut state = self.state.lock().unwrap();
        state.executed.push((kind.clone(), request.clone()));
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn select_mcc(&self, task_id: &str, selection: &MccSelection) -> Result<()> {
        self.record(format!("POST /tasks/{task_id}/mcc"));
        self.state
            .lock()
            .unwrap()
            .selections
            .push((task_id.to_string(), selection.clone()));
        Ok(())
    }

    async fn add_integration(&self, integration: &NewIntegration) -> Result<Integration> {
        self.record("POST /integrations".into());
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Integration {
            id: format!("int-{n}"),
            name: integration.name.clone(),
            service: integration.service.clone(),
            status: IntegrationStatus::Connected,
            last_sync: Some(Utc::now()),
            config: Some(integration.config.clone()),
        };
        self.state.lock().unwrap().integrations.push(created.clone());
        Ok(created)
    }

    async fn remove_integration(&self, id: &str) -> Result<()> {
        self.record(format!("DELETE /integrations/{id}"));
        let mut state = self.state.lock().unwrap();
        let before = state.integrations.len();
        state.integrations.retain(|i| i.id != id);
        if state.integrations.len() == before {
            return Err(Self::not_found("integration", id));
        }
        Ok(())
    }
}
