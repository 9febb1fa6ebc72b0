//! Payload locator
//!
//! Finds the scan object inside a task's `output`, whatever wrapper the
//! backend used:
//!
//! ```text
//! output.response ?? output.raw_output ?? output
//!        │
//!        ├─ object  → use as is
//!        └─ string  → strip ``` fences → parse
//!                       └─ on failure → first {...} span → parse
//!
//! empty / unparsable → retry the same against `output` itself
//! ```
//!
//! Parse failures are logged at `debug` and degrade to `None`.

use crate::error::{json_kind, PayloadError};
use crate::fields::{first, Object};
use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, Parser as MdParser, Tag, TagEnd};
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

static FENCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("fence regex is valid"));

static BRACED_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("brace regex is valid"));

/// Locate the scan object in a task output
#[must_use]
pub fn locate(output: &Value) -> Option<Object> {
    let raw = match output {
        Value::Object(map) => first(map, &["response", "raw_output"]).unwrap_or(output),
        other => other,
    };

    if let Some(found) = resolve(raw).filter(|m| !m.is_empty()) {
        return Some(found);
    }

    if std::ptr::eq(raw, output) {
        return None;
    }

    tracing::debug!("scan payload not found in wrapper, retrying on output itself");
    resolve(output).filter(|m| !m.is_empty())
}

/// Resolve one candidate value to an object
pub(crate) fn resolve(value: &Value) -> Option<Object> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::String(text) => match parse_text(text) {
            Ok(map) => Some(map),
            Err(err) => {
                tracing::debug!(error = %err, "scan payload text did not parse");
                None
            }
        },
        _ => None,
    }
}

/// Parse free text that should contain a JSON object
///
/// # Errors
/// - [`PayloadError::Empty`] if nothing but fences and whitespace remain
/// - [`PayloadError::NotJson`] if no parse strategy succeeded
/// - [`PayloadError::NotAnObject`] if the text is JSON but not an object
pub fn parse_text(text: &str) -> Result<Object, PayloadError> {
    let stripped = strip_code_fences(text);
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return Err(PayloadError::Empty);
    }

    let direct = match parse_object(trimmed) {
        Ok(map) => return Ok(map),
        Err(err) => err,
    };

    if let Some(span) = BRACED_SPAN.find(trimmed) {
        if let Ok(map) = parse_object(span.as_str()) {
            return Ok(map);
        }
    }

    if let Some(span) = balanced_span(trimmed) {
        if let Ok(map) = parse_object(span) {
            return Ok(map);
        }
    }

    Err(direct)
}

/// Parse one JSON object, unwrapping a single level of string encoding
fn parse_object(text: &str) -> Result<Object, PayloadError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| PayloadError::NotJson(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        Value::String(inner) => match serde_json::from_str::<Value>(&inner) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(PayloadError::NotAnObject(json_kind(&other))),
            Err(e) => Err(PayloadError::NotJson(e.to_string())),
        },
        other => Err(PayloadError::NotAnObject(json_kind(&other))),
    }
}

/// Remove markdown code fences around a payload
///
/// When the text holds fenced blocks, the first block tagged `json` (or
/// untagged) wins. Fence markers that do not form a block are deleted.
/// Text without fences is returned unchanged.
#[must_use]
pub fn strip_code_fences(text: &str) -> Cow<'_, str> {
    if !text.contains("```") {
        return Cow::Borrowed(text);
    }

    let mut blocks: Vec<(String, String)> = Vec::new();
    let mut current: Option<(String, String)> = None;

    for event in MdParser::new(text) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let lang = info.split_whitespace().next().unwrap_or("").to_ascii_lowercase();
                current = Some((lang, String::new()));
            }
            Event::Text(chunk) => {
                if let Some((_, code)) = current.as_mut() {
                    code.push_str(&chunk);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }

    let preferred = blocks
        .iter()
        .position(|(lang, _)| lang == "json" || lang.is_empty())
        .unwrap_or(0);

    match blocks.into_iter().nth(preferred) {
        Some((_, code)) => Cow::Owned(code),
        None => FENCE_MARKER.replace_all(text, ""),
    }
}

/// First brace-balanced `{...}` span, honouring string literals
fn balanced_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
