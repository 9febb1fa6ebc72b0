//! `key=value` action input

use serde_json::{Map, Value};

/// Malformed `--input` pair
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// No `=` in the argument
    #[error("expected key=value, got `{0}`")]
    MissingEquals(String),

    /// Nothing before the `=`
    #[error("empty key in `{0}`")]
    EmptyKey(String),
}

/// Parse one `key=value` argument
///
/// Values that read as JSON (numbers, booleans, arrays, objects) keep
/// their type; anything else is a string. `url=shop.example` stays a
/// string, `limit=5` becomes a number.
pub fn parse_pair(arg: &str) -> Result<(String, Value), InputError> {
    let (key, raw) = arg
        .split_once('=')
        .ok_or_else(|| InputError::MissingEquals(arg.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(InputError::EmptyKey(arg.to_string()));
    }

    let value = match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Array(_) | Value::Object(_))) => v,
        _ => Value::String(raw.to_string()),
    };
    Ok((key.to_string(), value))
}

/// Collect pairs into an input map; later keys win
pub fn collect<I>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (String, Value)>,
{
    pairs.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_stay_strings() {
        assert_eq!(
            parse_pair("url=shop.example").unwrap(),
            ("url".to_string(), json!("shop.example"))
        );
        assert_eq!(
            parse_pair("business_name=Example Shop Ltd").unwrap().1,
            json!("Example Shop Ltd")
        );
    }

    #[test]
    fn json_values_keep_their_type() {
        assert_eq!(parse_pair("depth=3").unwrap().1, json!(3));
        assert_eq!(parse_pair("deep=true").unwrap().1, json!(true));
        assert_eq!(parse_pair("tags=[\"a\"]").unwrap().1, json!(["a"]));
    }

    #[test]
    fn quoted_json_string_is_kept_verbatim() {
        assert_eq!(parse_pair("name=\"x\"").unwrap().1, json!("\"x\""));
    }

    #[test]
    fn value_may_contain_equals() {
        assert_eq!(
            parse_pair("url=https://x.example/?a=b").unwrap().1,
            json!("https://x.example/?a=b")
        );
    }

    #[test]
    fn malformed_pairs() {
        assert_eq!(
            parse_pair("url"),
            Err(InputError::MissingEquals("url".into()))
        );
        assert_eq!(parse_pair(" =x"), Err(InputError::EmptyKey(" =x".into())));
    }

    #[test]
    fn later_keys_win() {
        let map = collect(vec![
            ("url".to_string(), json!("a")),
            ("url".to_string(), json!("b")),
        ]);
        assert_eq!(map["url"], json!("b"));
    }
}
