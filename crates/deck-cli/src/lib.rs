//! `agentdeck` console
//!
//! The binary is a thin shell over this library:
//! - [`cli`] builds the clap command tree
//! - [`commands`] loads configuration and dispatches subcommands
//! - [`render`] formats snapshots and reports as text
//! - [`telemetry`] installs the tracing subscriber

#![warn(unreachable_pub)]

pub mod cli;
pub mod commands;
pub mod input;
pub mod render;
pub mod telemetry;

pub use cli::command;
pub use commands::{config, dispatch, watch};
