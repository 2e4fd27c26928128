//! Transport abstraction.
//!
//! Every network call the SDK makes goes through a [`Fetch`] implementation.
//! The default is [`ReqwestFetch`]; callers can inject their own through
//! [`ClientConfigBuilder::custom_fetch`](crate::ClientConfigBuilder::custom_fetch)
//! to add instrumentation, proxies or test doubles. The dispatcher treats a
//! custom transport as opaque: retries and throttling are applied around it.

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::clients::errors::TransportError;
use crate::clients::http_request::HttpMethod;

/// A fully resolved outgoing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    /// Absolute URL including the query string.
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Serialized request body, if any.
    pub body: Option<String>,
}

/// A raw response returned by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl FetchResponse {
    /// Creates a response from a status and body text.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the response body text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }
}

/// Performs a single HTTP exchange.
///
/// Implementations must not retry on their own; a non-2xx status is a
/// successful exchange and is returned as a [`FetchResponse`].
#[async_trait]
pub trait Fetch: Debug + Send + Sync {
    /// Sends `request` and returns the raw response.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError>;
}

/// Default transport backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    /// Creates a transport with a rustls-backed client.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Wraps an existing `reqwest` client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestFetch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetch for ReqwestFetch {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let res = builder.send().await?;
        let status = res.status().as_u16();
        let body = res.text().await?;

        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_response_ok_range() {
        assert!(FetchResponse::new(200, "").ok());
        assert!(FetchResponse::new(204, "").ok());
        assert!(!FetchResponse::new(199, "").ok());
        assert!(!FetchResponse::new(404, "").ok());
        assert!(!FetchResponse::new(429, "").ok());
    }

    #[test]
    fn test_fetch_response_text() {
        let response = FetchResponse::new(200, r#"{"data":[]}"#);
        assert_eq!(response.text(), r#"{"data":[]}"#);
    }

    #[test]
    fn test_reqwest_fetch_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestFetch>();
    }
}
