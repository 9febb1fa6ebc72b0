//! Agent Deck core
//!
//! Everything between the backend's REST API and a console front end:
//! - [`Backend`] trait and the reqwest-based [`HttpBackend`]
//! - Client-side validation of actions and MCC selections
//! - [`Dashboard`] refresh with partial-failure degradation
//! - [`Poller`] for fixed-interval refresh
//! - [`ReportCache`] for built scan reports
//!
//! # Example
//!
//! ```rust,ignore
//! use deck_core::{Dashboard, DeckConfig, HttpBackend, ReportCache};
//! use deck_model::TaskQuery;
//! use std::sync::Arc;
//!
//! # async fn example() -> deck_core::Result<()> {
//! let config = DeckConfig::load(None)?;
//! let backend = Arc::new(HttpBackend::new(&config)?);
//! let dashboard = Dashboard::new(backend, ReportCache::new(config.report_cache_capacity));
//!
//! let snapshot = dashboard.refresh(&TaskQuery::new(config.page_size)).await?;
//! println!("{} tasks", snapshot.kpis.total_tasks);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod poller;
pub mod report_cache;
pub mod validate;

pub use client::{Backend, HttpBackend};
pub use config::DeckConfig;
pub use dashboard::{primary_mcc, Dashboard, DashboardSnapshot, Degraded, TaskRow};
pub use error::{ConfigError, DeckError, Result, ValidationError};
pub use poller::{PollEvent, PollHandle, Poller};
pub use report_cache::{CacheStats, ReportCache};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
