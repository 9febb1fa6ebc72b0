//! Testing utilities for the Agent Deck workspace
//!
//! Shared scan payload fixtures, task builders and an in-memory backend.

#![allow(missing_docs)]

pub mod fixtures;
pub mod mock;

pub use fixtures::*;
pub use mock::{MockBackend, Toggle};
