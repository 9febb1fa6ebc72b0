//! Scan report normalizer
//!
//! Turns a task's loosely shaped `output` into a typed report in three
//! steps:
//! 1. [`locator`] finds the JSON object inside the output (wrapper keys,
//!    markdown fences, string-encoded JSON)
//! 2. [`classify`] decides once which schema it is and yields a
//!    [`ScanResult`]
//! 3. [`view`] maps the classified payload to read-only tab structures
//!
//! [`ScanReport::build`] runs all three. None of the steps fail: anything
//! unrecognised ends up as [`ScanReport::Raw`] with the task status.

#![warn(unreachable_pub)]

pub mod classify;
pub mod error;
pub mod fields;
pub mod format;
pub mod locator;
pub mod report;
pub mod view;

pub use classify::{classify, classify_payload, RawOutput, ScanKind, ScanResult};
pub use error::PayloadError;
pub use locator::{locate, parse_text, strip_code_fences};
pub use report::{ScanReport, ScanSummary, Tab, UnknownTab};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
