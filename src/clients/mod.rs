//! HTTP client types for Elastic Path API communication.
//!
//! This module provides the request orchestration layer: every endpoint call
//! ends up in [`HttpClient::request`], which authenticates, builds headers,
//! serializes the body, sends it through the transport and parses the result.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpClient`]: The async dispatcher for API communication
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`Fetch`]: The transport trait, with [`ReqwestFetch`] as the default
//! - [`ThrottledFetch`]: A transport wrapper that limits the request rate
//!
//! # Retry Behavior
//!
//! - **429 (Rate Limited)**: retried until `fetch_max_attempts` attempts have
//!   been made. Retry `n` waits `n * retry_delay + random(0..=retry_jitter)`.
//! - **Other non-2xx**: returned immediately with the upstream body.
//!
//! # Example
//!
//! ```rust,ignore
//! use elasticpath::clients::{HttpClient, HttpMethod};
//! use serde_json::json;
//!
//! let client = HttpClient::new(Arc::new(config));
//! let created = client
//!     .send("products", HttpMethod::Post, Some(json!({"type": "product"})), None)
//!     .await?;
//! ```

mod errors;
mod fetch;
pub(crate) mod http_client;
mod http_request;
pub(crate) mod http_response;
mod throttle;

pub use errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError, TransportError};
pub use fetch::{Fetch, FetchRequest, FetchResponse, ReqwestFetch};
pub use http_client::{HttpClient, SDK_LANGUAGE, SDK_VERSION};
pub use http_request::{build_request_body, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::{parse_response_body, try_parse_json};
pub use throttle::{resolve_fetch, RateGate, ThrottledFetch};
