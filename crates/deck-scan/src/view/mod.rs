//! Per-schema view models
//!
//! Pure mappings from a classified payload to read-only tab structures.
//! Missing or wrongly typed sub-blocks become empty tabs.

pub mod comprehensive;
pub mod domain;
pub mod kyc;
pub mod legacy;
pub mod risk;

pub use comprehensive::ComprehensiveView;
pub use domain::{DomainAge, DomainIntel};
pub use kyc::{KycReport, KycView};
pub use legacy::LegacyView;
pub use risk::ContentRisk;
