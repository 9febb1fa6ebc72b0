//! Report cache using moka
//!
//! Terminal tasks no longer change, so their reports are built once and
//! shared. Entries are keyed by task id and completion time; a task that
//! is re-run under the same id gets a new key. Processing tasks are
//! always rebuilt.

use chrono::{DateTime, Utc};
use deck_model::Task;
use deck_scan::ScanReport;
use moka::future::Cache;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReportKey {
    task_id: String,
    completed_at: Option<DateTime<Utc>>,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Shared cache of built scan reports
#[derive(Debug, Clone)]
pub struct ReportCache {
    inner: Cache<ReportKey, Arc<ScanReport>>,
}

impl ReportCache {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Report for `task`, built on first request for terminal tasks
    pub async fn report(&self, task: &Task) -> Arc<ScanReport> {
        if !task.status.is_terminal() {
            return Arc::new(ScanReport::build(task));
        }

        let key = ReportKey {
            task_id: task.id.clone(),
            completed_at: task.completed_at,
        };
        self.inner
            .get_with(key, async { Arc::new(ScanReport::build(task)) })
            .await
    }

    /// Current statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }

    /// Flush pending maintenance so [`Self::stats`] is exact
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new(256)
    }
}
