//! HTTP-specific error types for the Elastic Path SDK.
//!
//! # Error Handling
//!
//! - [`HttpResponseError`]: non-2xx response, body passed through verbatim
//! - [`MaxHttpRetriesExceededError`]: every attempt was rate limited (429)
//! - [`TransportError`]: the request never produced a response
//! - [`HttpError`]: unified error type returned by the dispatcher
//!
//! # Example
//!
//! ```rust,ignore
//! use elasticpath::HttpError;
//!
//! match client.products().all().await {
//!     Ok(body) => println!("Products: {}", body["data"]),
//!     Err(HttpError::Response(e)) => println!("API error {}: {}", e.status, e.body),
//!     Err(HttpError::MaxRetries(e)) => println!("Rate limited after {} tries", e.tries),
//!     Err(other) => println!("Request failed: {other}"),
//! }
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthError;
use crate::error::ConfigError;

/// Error returned when the API responds with a non-2xx status.
///
/// `body` is the parsed upstream error document, typically
/// `{"errors": [{"status": 404, "title": "...", "detail": "..."}]}`.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("API responded with status {status}: {body}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub status: u16,
    /// The parsed response body.
    pub body: Value,
}

/// Error returned when every allowed attempt was rate limited.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Exceeded maximum retry count of {tries}. Last response ({status}): {body}")]
pub struct MaxHttpRetriesExceededError {
    /// The HTTP status code of the last response.
    pub status: u16,
    /// The number of attempts made.
    pub tries: u32,
    /// The parsed body of the last response.
    pub body: Value,
}

/// Error raised by a transport before any response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network or connection error from the default transport.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failure reported by a custom transport.
    #[error("Transport error: {0}")]
    Custom(String),
}

/// Unified error type for dispatched requests.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response other than an exhausted 429.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Every attempt was rate limited.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Obtaining a bearer token failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The client is not configured to authenticate.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HttpError {
    /// Returns the upstream response body, if the error carries one.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::Response(e) => Some(&e.body),
            Self::MaxRetries(e) => Some(&e.body),
            Self::Auth(AuthError::TokenRequestFailed { body, .. }) => Some(body),
            _ => None,
        }
    }

    /// Returns the HTTP status code, if the error carries one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.status),
            Self::MaxRetries(e) => Some(e.status),
            Self::Auth(AuthError::TokenRequestFailed { status, .. }) => Some(*status),
            _ => None,
        }
    }
}
