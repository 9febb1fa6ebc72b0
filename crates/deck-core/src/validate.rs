//! Client-side request validation
//!
//! A request that fails here is never sent.

use crate::error::ValidationError;
use deck_model::{actions, ExecuteRequest, MccSelection, MccSource};
use reqwest::Url;
use serde_json::Value;

/// Input fields each scan action requires
#[must_use]
pub fn required_fields(action: &str) -> &'static [&'static str] {
    match action {
        actions::SITE_SCAN | actions::COMPREHENSIVE_SITE_SCAN => &["url"],
        actions::KYC_SITE_SCAN => &["url", "business_name"],
        _ => &[],
    }
}

/// Check and normalise an execute request
///
/// Required fields must be present and non-blank. Scan actions need `url`
/// as a string; one without a scheme gets `https://`.
pub fn execute_request(mut request: ExecuteRequest) -> Result<ExecuteRequest, ValidationError> {
    let action = request.action.trim().to_string();
    if action.is_empty() {
        return Err(ValidationError::UnknownAction(request.action));
    }

    for &field in required_fields(&action) {
        let present = request.input.get(field).is_some_and(|v| match v {
            Value::String(s) => !s.trim().is_empty(),
            Value::Null => false,
            _ => true,
        });
        if !present {
            return Err(ValidationError::MissingField {
                action,
                field,
            });
        }
    }

    let needs_url = required_fields(&action).contains(&"url");
    match request.input.get("url") {
        Some(Value::String(raw)) => {
            let url = normalize_url(raw)?;
            request.input.insert("url".to_string(), Value::String(url));
        }
        Some(other) if needs_url => return Err(ValidationError::InvalidUrl(other.to_string())),
        _ => {}
    }

    request.action = action;
    Ok(request)
}

/// Add `https://` when no scheme is given and check the result parses
pub fn normalize_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    match Url::parse(&candidate) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(candidate),
        _ => Err(ValidationError::InvalidUrl(raw.to_string())),
    }
}

/// Build an MCC selection
///
/// The source is `system` when `code` equals the primary suggestion and
/// `manual` otherwise. A manual selection needs a non-blank reason.
pub fn mcc_selection(
    code: &str,
    reason: Option<&str>,
    primary: Option<&str>,
    selected_by: &str,
) -> Result<MccSelection, ValidationError> {
    let code = code.trim();
    if code.len() != 4 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidMccCode(code.to_string()));
    }

    let selected_by = selected_by.trim();
    if selected_by.is_empty() {
        return Err(ValidationError::EmptySelector("selected_by"));
    }

    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    let source = if primary.map(str::trim) == Some(code) {
        MccSource::System
    } else {
        MccSource::Manual
    };

    if source == MccSource::Manual && reason.is_none() {
        return Err(ValidationError::MissingOverrideReason {
            selected: code.to_string(),
            primary: primary.unwrap_or("none").to_string(),
        });
    }

    Ok(MccSelection {
        mcc_code: code.to_string(),
        override_reason: reason.map(str::to_string),
        source,
        selected_by: selected_by.to_string(),
    })
}
