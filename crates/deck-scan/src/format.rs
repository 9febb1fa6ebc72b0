//! Display formatting for scores
//!
//! Two numeric domains appear in scan reports and must not be mixed:
//! - fractions in `[0, 1]` (the KYC `confidence_score`), shown as a
//!   percentage after scaling by 100
//! - values already on a 0-100 scale (`compliance_score`, MCC confidence,
//!   risk scores), shown unchanged

/// Fraction in `[0, 1]` → `"87.0%"`
#[must_use]
pub fn fraction_as_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Value already in percent → `"85%"` or `"85.5%"`
#[must_use]
pub fn percent(value: f64) -> String {
    format!("{}%", compact(value))
}

/// Score on a 0-100 scale → `"72/100"`
#[must_use]
pub fn score_out_of_100(score: f64) -> String {
    format!("{}/100", compact(score))
}

/// Whole numbers without decimals, others with one
fn compact(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
