//! Task list query and pagination

use serde::{Deserialize, Serialize};

/// Query parameters for `GET /tasks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    /// Restrict to one agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Page size
    pub limit: u32,
    /// Offset of the first task
    pub offset: u64,
}

impl TaskQuery {
    /// First page of the given size
    #[inline]
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            agent_id: None,
            limit: limit.max(1),
            offset: 0,
        }
    }

    /// Restrict to one agent
    #[inline]
    #[must_use]
    pub fn for_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// With offset
    #[inline]
    #[must_use]
    pub fn at_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Query for the following page
    #[must_use]
    pub fn next_page(&self) -> Self {
        let mut next = self.clone();
        next.offset = self.offset.saturating_add(u64::from(self.limit));
        next
    }

    /// Query for the preceding page (clamped at zero)
    #[must_use]
    pub fn previous_page(&self) -> Self {
        let mut prev = self.clone();
        prev.offset = self.offset.saturating_sub(u64::from(self.limit));
        prev
    }

    /// Key/value pairs for the URL query string
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(agent) = &self.agent_id {
            pairs.push(("agentId", agent.clone()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs
    }
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Pagination state derived from a query and the reported total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based current page
    pub page: u64,
    /// Number of pages (at least 1)
    pub pages: u64,
    /// Whether a following page exists
    pub has_next: bool,
    /// Whether a preceding page exists
    pub has_previous: bool,
}

impl Pagination {
    /// Compute pagination for `query` over `total` tasks
    #[must_use]
    pub fn new(query: &TaskQuery, total: u64) -> Self {
        let limit = u64::from(query.limit.max(1));
        let pages = total.div_ceil(limit).max(1);
        let page = (query.offset / limit).saturating_add(1);
        Self {
            page,
            pages,
            has_next: query.offset.saturating_add(limit) < total,
            has_previous: query.offset > 0,
        }
    }
}
