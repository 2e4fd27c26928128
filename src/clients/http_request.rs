//! HTTP request types for the Elastic Path SDK.
//!
//! This module provides the [`HttpRequest`] type and its builder for
//! describing a call to the API before it is dispatched.

use std::collections::HashMap;
use std::fmt;

use serde_json::{json, Value};

/// HTTP methods supported by the Elastic Path API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for updating resources.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to be dispatched to the Elastic Path API.
///
/// `path` is relative to `{protocol}://{host}/{version}/` and may already carry
/// a query string.
///
/// # Example
///
/// ```rust
/// use elasticpath::clients::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let request = HttpRequest::builder(HttpMethod::Post, "products")
///     .body(json!({"type": "product", "name": "Shirt"}))
///     .build();
///
/// assert_eq!(request.path, "products");
/// assert!(request.wrap_body);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The path (relative to the versioned base URL) for this request.
    pub path: String,
    /// The request body, if any.
    pub body: Option<Value>,
    /// Bearer token to use instead of authenticating.
    pub token: Option<String>,
    /// API version override for this request.
    pub version: Option<String>,
    /// Whether the body is wrapped in a `{"data": ...}` envelope.
    pub wrap_body: bool,
    /// Additional headers, applied after every other header.
    pub extra_headers: HashMap<String, String>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Serializes the body as it is sent on the wire.
    #[must_use]
    pub fn encoded_body(&self) -> Option<String> {
        self.body.as_ref().map(|body| {
            if self.wrap_body {
                build_request_body(body)
            } else {
                body.to_string()
            }
        })
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    path: String,
    body: Option<Value>,
    token: Option<String>,
    version: Option<String>,
    wrap_body: bool,
    extra_headers: HashMap<String, String>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method: method,
            path: path.into(),
            body: None,
            token: None,
            version: None,
            wrap_body: true,
            extra_headers: HashMap::new(),
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets an optional request body.
    #[must_use]
    pub fn maybe_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    /// Uses `token` as the bearer token and skips authentication.
    #[must_use]
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Overrides the API version for this request.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sends the body as-is instead of wrapping it in `{"data": ...}`.
    #[must_use]
    pub const fn wrap_body(mut self, wrap: bool) -> Self {
        self.wrap_body = wrap;
        self
    }

    /// Sets all extra headers at once.
    #[must_use]
    pub fn extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = headers;
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    /// Builds the [`HttpRequest`].
    #[must_use]
    pub fn build(self) -> HttpRequest {
        HttpRequest {
            http_method: self.http_method,
            path: self.path,
            body: self.body,
            token: self.token,
            version: self.version,
            wrap_body: self.wrap_body,
            extra_headers: self.extra_headers,
        }
    }
}

/// Wraps a payload in the API's request envelope.
///
/// A payload carrying an `options` key is split into
/// `{"data": payload.data, "options": payload.options}`; anything else becomes
/// `{"data": payload}`.
///
/// ```rust
/// use elasticpath::clients::build_request_body;
/// use serde_json::json;
///
/// assert_eq!(build_request_body(&json!({"name": "Shirt"})), r#"{"data":{"name":"Shirt"}}"#);
/// ```
#[must_use]
pub fn build_request_body(body: &Value) -> String {
    let envelope = match body.get("options") {
        Some(options) if !options.is_null() => json!({
            "data": body.get("data").cloned().unwrap_or(Value::Null),
            "options": options,
        }),
        _ => json!({ "data": body }),
    };
    envelope.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_builder_defaults() {
        let request = HttpRequest::builder(HttpMethod::Get, "products").build();

        assert_eq!(request.http_method, HttpMethod::Get);
        assert_eq!(request.path, "products");
        assert!(request.body.is_none());
        assert!(request.token.is_none());
        assert!(request.version.is_none());
        assert!(request.wrap_body);
        assert!(request.extra_headers.is_empty());
        assert!(request.encoded_body().is_none());
    }

    #[test]
    fn test_body_is_wrapped_in_data() {
        let request = HttpRequest::builder(HttpMethod::Post, "products")
            .body(json!({"type": "product"}))
            .build();

        assert_eq!(
            request.encoded_body().as_deref(),
            Some(r#"{"data":{"type":"product"}}"#)
        );
    }

    #[test]
    fn test_body_with_options_is_split() {
        let body = json!({
            "data": {"type": "cart_item", "id": "abc", "quantity": 1},
            "options": {"add_all_or_nothing": true}
        });
        let encoded: Value = serde_json::from_str(&build_request_body(&body)).unwrap();

        assert_eq!(
            encoded,
            json!({
                "data": {"type": "cart_item", "id": "abc", "quantity": 1},
                "options": {"add_all_or_nothing": true}
            })
        );
    }

    #[test]
    fn test_unwrapped_body_is_sent_verbatim() {
        let request = HttpRequest::builder(HttpMethod::Put, "settings")
            .body(json!({"raw": true}))
            .wrap_body(false)
            .build();

        assert_eq!(request.encoded_body().as_deref(), Some(r#"{"raw":true}"#));
    }

    #[test]
    fn test_builder_with_extra_headers_and_version() {
        let request = HttpRequest::builder(HttpMethod::Get, "catalog")
            .header("EP-Channel", "web")
            .version("pcm")
            .token(Some("explicit".to_string()))
            .build();

        assert_eq!(
            request.extra_headers.get("EP-Channel"),
            Some(&"web".to_string())
        );
        assert_eq!(request.version.as_deref(), Some("pcm"));
        assert_eq!(request.token.as_deref(), Some("explicit"));
    }
}
