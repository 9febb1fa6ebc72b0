//! Backend client
//!
//! [`Backend`] is the seam between the console and the agent service.
//! [`HttpBackend`] talks to the real REST API; tests substitute an
//! in-memory implementation.

use crate::config::DeckConfig;
use crate::error::{DeckError, Result};
use async_trait::async_trait;
use deck_model::{
    Agent, AgentKind, ExecuteRequest, Integration, MccSelection, Metrics, NewIntegration, Task,
    TaskPage, TaskQuery,
};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

const ERROR_BODY_LIMIT: usize = 200;

/// Agent service operations used by the console
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /agents`
    async fn agents(&self) -> Result<Vec<Agent>>;

    /// `GET /integrations`
    async fn integrations(&self) -> Result<Vec<Integration>>;

    /// `GET /tasks?agentId&limit&offset`
    async fn tasks(&self, query: &TaskQuery) -> Result<TaskPage>;

    /// `GET /tasks/:id`
    async fn task(&self, id: &str) -> Result<Task>;

    /// `GET /metrics`
    async fn metrics(&self) -> Result<Metrics>;

    /// `POST /agents/:type/execute`
    async fn execute(&self, kind: &AgentKind, request: &ExecuteRequest) -> Result<Task>;

    /// `POST /tasks/:id/mcc`
    async fn select_mcc(&self, task_id: &str, selection: &MccSelection) -> Result<()>;

    /// `POST /integrations`
    async fn add_integration(&self, integration: &NewIntegration) -> Result<Integration>;

    /// `DELETE /integrations/:id`
    async fn remove_integration(&self, id: &str) -> Result<()>;
}

/// REST client for the agent service
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base: Url,
    timeout: Duration,
}

impl HttpBackend {
    /// Create a client for `config.api_base_url`
    pub fn new(config: &DeckConfig) -> Result<Self> {
        config.validate()?;
        let mut base = Url::parse(&config.api_base_url)
            .map_err(|e| DeckError::Transport(format!("invalid base URL: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let timeout = config.request_timeout();
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("agentdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeckError::Transport(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base,
            timeout,
        })
    }

    /// Base URL, always ending in `/`
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| DeckError::Transport(format!("invalid path {path}: {e}")))?;
        Ok(self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| self.transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeckError::Http {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await.map_err(|e| self.transport(e))?;
        serde_json::from_slice(&bytes).map_err(|e| DeckError::Decode(e.to_string()))
    }

    fn transport(&self, err: reqwest::Error) -> DeckError {
        if err.is_timeout() {
            DeckError::Timeout {
                duration_secs: self.timeout.as_secs(),
            }
        } else {
            DeckError::from(err)
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self), err)]
    async fn agents(&self) -> Result<Vec<Agent>> {
        self.json(self.request(Method::GET, "agents")?).await
    }

    #[instrument(skip(self), err)]
    async fn integrations(&self) -> Result<Vec<Integration>> {
        self.json(self.request(Method::GET, "integrations")?).await
    }

    #[instrument(skip(self), fields(limit = query.limit, offset = query.offset), err)]
    async fn tasks(&self, query: &TaskQuery) -> Result<TaskPage> {
        let builder = self.request(Method::GET, "tasks")?.query(&query.to_pairs());
        self.json(builder).await
    }

    #[instrument(skip(self), err)]
    async fn task(&self, id: &str) -> Result<Task> {
        self.json(self.request(Method::GET, &format!("tasks/{id}"))?)
            .await
    }

    #[instrument(skip(self), err)]
    async fn metrics(&self) -> Result<Metrics> {
        self.json(self.request(Method::GET, "metrics")?).await
    }

    #[instrument(skip(self, request), fields(action = %request.action), err)]
    async fn execute(&self, kind: &AgentKind, request: &ExecuteRequest) -> Result<Task> {
        let builder = self
            .request(Method::POST, &format!("agents/{kind}/execute"))?
            .json(request);
        let task: Task = self.json(builder).await?;
        tracing::info!(task_id = %task.id, agent = %kind, action = %request.action, "action submitted");
        Ok(task)
    }

    #[instrument(skip(self, selection), fields(mcc = %selection.mcc_code), err)]
    async fn select_mcc(&self, task_id: &str, selection: &MccSelection) -> Result<()> {
        let builder = self
            .request(Method::POST, &format!("tasks/{task_id}/mcc"))?
            .json(selection);
        self.send(builder).await?;
        tracing::info!(task_id, mcc = %selection.mcc_code, source = ?selection.source, "MCC selection recorded");
        Ok(())
    }

    #[instrument(skip(self, integration), fields(name = %integration.name), err)]
    async fn add_integration(&self, integration: &NewIntegration) -> Result<Integration> {
        let builder = self
            .request(Method::POST, "integrations")?
            .json(integration);
        self.json(builder).await
    }

    #[instrument(skip(self), err)]
    async fn remove_integration(&self, id: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("integrations/{id}"))?)
            .await?;
        Ok(())
    }
}
