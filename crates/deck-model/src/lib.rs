//! Agent Deck domain model
//!
//! Serde types for the backend's JSON contract:
//! - Tasks and their lifecycle status
//! - Agents and integrations
//! - Dashboard metrics
//! - Request bodies (execute, MCC selection, new integration)
//!
//! The backend owns every entity here. The console only reads snapshots
//! and posts requests, so types are tolerant on input: unknown enum
//! values map to an `Unknown`/`Other` variant and `null` collections
//! deserialize as empty.

#![warn(unreachable_pub)]

pub mod agent;
pub mod integration;
pub mod metrics;
pub mod query;
pub mod request;
pub mod task;

mod serde_util;

pub use agent::{Agent, AgentKind, AgentStatus};
pub use integration::{Integration, IntegrationStatus};
pub use metrics::{Kpis, Metrics};
pub use query::{Pagination, TaskQuery};
pub use request::{ExecuteRequest, MccSelection, MccSource, NewIntegration};
pub use task::{actions, Task, TaskPage, TaskStatus};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
