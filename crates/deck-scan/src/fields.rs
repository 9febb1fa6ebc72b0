//! Lenient field access over untyped JSON
//!
//! Scan payloads come from several generations of the backend. The same
//! value may arrive as a number, a numeric string, or a string with a
//! trailing `%`. These helpers read what is there and return `None` for
//! anything else; they never fail.

use serde_json::{Map, Value};

/// JSON object
pub type Object = Map<String, Value>;

/// Read a scalar as display text
///
/// Strings are trimmed; numbers and booleans are stringified. Empty
/// strings, `null`, arrays and objects yield `None`.
#[must_use]
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a number, accepting numeric strings such as `"72"` or `"87.5%"`
#[must_use]
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// Read a boolean, accepting `"true"`/`"yes"`/`1` and friends
#[must_use]
pub fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "found" | "present" => Some(true),
            "false" | "no" | "n" | "0" | "missing" | "absent" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// First non-null value among `keys`
#[must_use]
pub fn first<'a>(map: &'a Object, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

/// First key among `keys` that reads as text
#[must_use]
pub fn text_at(map: &Object, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|k| map.get(*k)).find_map(text)
}

/// First key among `keys` that reads as a number
#[must_use]
pub fn number_at(map: &Object, keys: &[&str]) -> Option<f64> {
    keys.iter().filter_map(|k| map.get(*k)).find_map(number)
}

/// First key among `keys` that reads as a boolean
#[must_use]
pub fn boolean_at(map: &Object, keys: &[&str]) -> Option<bool> {
    keys.iter().filter_map(|k| map.get(*k)).find_map(boolean)
}

/// Object at `key`
#[must_use]
pub fn object<'a>(map: &'a Object, key: &str) -> Option<&'a Object> {
    map.get(key).and_then(Value::as_object)
}

/// First key among `keys` holding an array
#[must_use]
pub fn array_at<'a>(map: &'a Object, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().filter_map(|k| map.get(*k)).find_map(Value::as_array)
}

/// Strings from an array, skipping non-scalars
#[must_use]
pub fn strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    }
}

/// `snake_case_key` → `Snake case key`
#[must_use]
pub fn humanize(key: &str) -> String {
    let spaced = key.replace(['_', '-'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Flatten an object into display rows
///
/// Scalars become `(label, text)`; arrays of scalars are joined with
/// `", "`. Nested objects and empty values are skipped.
#[must_use]
pub fn rows(map: &Object, skip: &[&str]) -> Vec<(String, String)> {
    map.iter()
        .filter(|(k, _)| !skip.contains(&k.as_str()))
        .filter_map(|(k, v)| {
            let shown = match v {
                Value::Array(_) => {
                    let parts = strings(v);
                    (!parts.is_empty()).then(|| parts.join(", "))
                }
                other => text(other),
            }?;
            Some((humanize(k), shown))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_accepts_strings_and_percent() {
        assert_eq!(number(&json!(72)), Some(72.0));
        assert_eq!(number(&json!("87.5%")), Some(87.5));
        assert_eq!(number(&json!(" 3 ")), Some(3.0));
        assert_eq!(number(&json!("high")), None);
        assert_eq!(number(&json!(null)), None);
    }

    #[test]
    fn text_skips_blank_and_containers() {
        assert_eq!(text(&json!("  ")), None);
        assert_eq!(text(&json!({"a": 1})), None);
        assert_eq!(text(&json!(5)), Some("5".to_string()));
    }

    #[test]
    fn boolean_variants() {
        assert_eq!(boolean(&json!("Yes")), Some(true));
        assert_eq!(boolean(&json!(0)), Some(false));
        assert_eq!(boolean(&json!("maybe")), None);
    }

    #[test]
    fn first_skips_null() {
        let map = json!({"a": null, "b": 2}).as_object().cloned().unwrap();
        assert_eq!(first(&map, &["a", "b"]), Some(&json!(2)));
    }

    #[test]
    fn rows_flatten_scalars_and_lists() {
        let map = json!({
            "business_name": "Acme",
            "phones": ["1", "2"],
            "nested": {"x": 1},
            "empty": ""
        })
        .as_object()
        .cloned()
        .unwrap();

        let rows = rows(&map, &[]);
        assert_eq!(
            rows,
            vec![
                ("Business name".to_string(), "Acme".to_string()),
                ("Phones".to_string(), "1, 2".to_string()),
            ]
        );
    }

    #[test]
    fn humanize_keys() {
        assert_eq!(humanize("refund_policy"), "Refund policy");
        assert_eq!(humanize(""), "");
    }
}
