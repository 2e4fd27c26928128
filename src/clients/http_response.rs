//! Response body parsing.
//!
//! The API answers with `{ data, meta?, links?, included? }` on success and
//! `{ errors: [...] }` on failure. Bodies are parsed leniently: an empty,
//! non-JSON or `204 No Content` body becomes `{}`.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Parses `text` as JSON, returning `fallback` if it cannot be parsed.
///
/// ```rust
/// use elasticpath::clients::try_parse_json;
/// use serde_json::{json, Value};
///
/// assert_eq!(try_parse_json(r#"{"a":1}"#, Value::Null), json!({"a": 1}));
/// assert_eq!(try_parse_json("<html>", json!({})), json!({}));
/// ```
pub fn try_parse_json<T: DeserializeOwned>(text: &str, fallback: T) -> T {
    serde_json::from_str(text).unwrap_or(fallback)
}

/// Parses a response body into JSON.
#[must_use]
pub fn parse_response_body(status: u16, text: &str) -> Value {
    if status == 204 || text.trim().is_empty() {
        return Value::Object(Map::new());
    }
    try_parse_json(text, Value::Object(Map::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_content_returns_empty_object() {
        assert_eq!(parse_response_body(204, ""), json!({}));
        assert_eq!(parse_response_body(204, "ignored"), json!({}));
    }

    #[test]
    fn test_empty_body_returns_empty_json() {
        assert_eq!(parse_response_body(200, ""), json!({}));
        assert_eq!(parse_response_body(200, "  \n"), json!({}));
    }

    #[test]
    fn test_non_json_body_returns_empty_json() {
        assert_eq!(parse_response_body(502, "<html>Bad Gateway</html>"), json!({}));
    }

    #[test]
    fn test_json_body_is_parsed() {
        let body = parse_response_body(200, r#"{"data":[{"id":"1"}],"meta":{"page":{"total":1}}}"#);
        assert_eq!(body["data"][0]["id"], "1");
        assert_eq!(body["meta"]["page"]["total"], 1);
    }

    #[test]
    fn test_try_parse_json_typed_fallback() {
        let parsed: Vec<u32> = try_parse_json("[1,2,3]", Vec::new());
        assert_eq!(parsed, vec![1, 2, 3]);

        let parsed: Vec<u32> = try_parse_json("nope", vec![7]);
        assert_eq!(parsed, vec![7]);
    }
}
