//! Request dispatcher for Elastic Path API communication.
//!
//! This module provides the [`HttpClient`] type for making authenticated
//! requests with automatic retry handling for rate-limited responses.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::auth::Authenticator;
use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::fetch::{Fetch, FetchRequest, ReqwestFetch};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::parse_response_body;
use crate::clients::throttle::resolve_fetch;
use crate::config::ClientConfig;
use crate::storage::{resolve_currency_storage_key, StorageError};

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Value of the `X-MOLTIN-SDK-LANGUAGE` header.
pub const SDK_LANGUAGE: &str = "rust";

/// Status code that triggers a retry.
const TOO_MANY_REQUESTS: u16 = 429;

/// Headers identifying the SDK, sent with every request including token requests.
pub(crate) fn sdk_headers(config: &ClientConfig) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("X-MOLTIN-SDK-LANGUAGE".to_string(), SDK_LANGUAGE.to_string());
    headers.insert("X-MOLTIN-SDK-VERSION".to_string(), SDK_VERSION.to_string());
    if let Some(application) = config.application() {
        headers.insert("X-MOLTIN-APPLICATION".to_string(), application.to_string());
    }
    if let Some(language) = config.language() {
        headers.insert("X-MOLTIN-LANGUAGE".to_string(), language.to_string());
    }
    headers
}

/// Dispatches authenticated requests to the Elastic Path API.
///
/// The client handles:
/// - URL construction from protocol, host and API version
/// - Bearer token acquisition through the [`Authenticator`]
/// - SDK, currency and caller-supplied headers
/// - Request body envelopes
/// - Retries with linear backoff and jitter for 429 responses
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use elasticpath::clients::{HttpClient, HttpMethod, HttpRequest};
///
/// let client = HttpClient::new(Arc::new(config));
///
/// let request = HttpRequest::builder(HttpMethod::Get, "products?page[limit]=5").build();
/// let body = client.request(request).await?;
/// println!("Products: {}", body["data"]);
/// ```
#[derive(Debug)]
pub struct HttpClient {
    config: Arc<ClientConfig>,
    fetch: Arc<dyn Fetch>,
    authenticator: Authenticator,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a dispatcher for `config`.
    ///
    /// The transport is the configured custom fetch or a default reqwest
    /// client, wrapped in a throttle gate when throttling is enabled. Token
    /// requests go through the same transport.
    ///
    /// # Panics
    ///
    /// Panics if no custom fetch is configured and the underlying reqwest
    /// client cannot be created. This should only happen in extremely unusual
    /// circumstances (e.g., TLS initialization failure).
    #[must_use]
    pub fn new(config: Arc<ClientConfig>) -> Self {
        let base: Arc<dyn Fetch> = config
            .custom_fetch()
            .cloned()
            .unwrap_or_else(|| Arc::new(ReqwestFetch::new()));
        let fetch = resolve_fetch(base, config.throttle());
        let authenticator = Authenticator::new(config.clone(), fetch.clone());

        Self {
            config,
            fetch,
            authenticator,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the authenticator.
    #[must_use]
    pub const fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Returns the absolute URL for `path` under `version` (or the configured
    /// version).
    #[must_use]
    pub fn url_for(&self, path: &str, version: Option<&str>) -> String {
        format!(
            "{}://{}/{}/{}",
            self.config.protocol(),
            self.config.host(),
            version.unwrap_or_else(|| self.config.version()),
            path.trim_start_matches('/')
        )
    }

    /// Returns the active currency: the configured one, else the stored one.
    #[must_use]
    pub fn currency(&self) -> Option<String> {
        self.config.currency().map(str::to_string).or_else(|| {
            self.config
                .storage()
                .get(&resolve_currency_storage_key(self.config.name()))
        })
    }

    /// Persists `code` as the active currency.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value cannot be persisted.
    pub fn set_currency(&self, code: &str) -> Result<(), StorageError> {
        self.config
            .storage()
            .set(&resolve_currency_storage_key(self.config.name()), code)
    }

    fn headers_for(&self, request: &HttpRequest, token: &str) -> HashMap<String, String> {
        let mut headers = sdk_headers(&self.config);
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        if let Some(currency) = self.currency() {
            headers.insert("X-MOLTIN-CURRENCY".to_string(), currency);
        }
        for (key, value) in self.config.headers() {
            headers.insert(key.clone(), value.clone());
        }
        for (key, value) in &request.extra_headers {
            headers.insert(key.clone(), value.clone());
        }
        headers
    }

    /// Sends a request to the Elastic Path API.
    ///
    /// This method handles:
    /// - Authentication, unless the request carries its own token
    /// - URL construction
    /// - Header merging
    /// - Body serialization
    /// - Retry logic for 429 responses
    /// - Response parsing (`204` and non-JSON bodies become `{}`)
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - No client ID or custom authenticator is configured (`Config`)
    /// - Authentication fails (`Auth`)
    /// - The transport fails (`Transport`)
    /// - A non-2xx response other than 429 is received (`Response`)
    /// - Every attempt is rate limited (`MaxRetries`)
    pub async fn request(&self, request: HttpRequest) -> Result<Value, HttpError> {
        let token = match &request.token {
            Some(token) => token.clone(),
            None => self.authenticator.authenticate()?.await?.access_token,
        };

        let url = self.url_for(&request.path, request.version.as_deref());
        let headers = self.headers_for(&request, &token);
        let body = request.encoded_body();
        let retry = self.config.retry();

        let mut tries: u32 = 0;
        loop {
            tries += 1;
            tracing::debug!("{} {} (attempt {})", request.http_method, url, tries);

            let response = self
                .fetch
                .fetch(FetchRequest {
                    url: url.clone(),
                    method: request.http_method,
                    headers: headers.clone(),
                    body: body.clone(),
                })
                .await?;

            let status = response.status;
            let parsed = parse_response_body(status, response.text());

            if response.ok() {
                return Ok(parsed);
            }

            if status != TOO_MANY_REQUESTS {
                return Err(HttpResponseError {
                    status,
                    body: parsed,
                }
                .into());
            }

            if tries >= retry.max_attempts {
                if retry.max_attempts == 1 {
                    return Err(HttpResponseError {
                        status,
                        body: parsed,
                    }
                    .into());
                }
                return Err(MaxHttpRetriesExceededError {
                    status,
                    tries,
                    body: parsed,
                }
                .into());
            }

            let delay = retry.delay_for(tries);
            tracing::warn!(
                "Rate limited on {} {}, retrying in {:?} (attempt {} of {})",
                request.http_method,
                request.path,
                delay,
                tries,
                retry.max_attempts
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Sends `body` to `path` with `method`, authenticating unless `token` is given.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn send(
        &self,
        path: impl Into<String>,
        method: HttpMethod,
        body: Option<Value>,
        token: Option<String>,
    ) -> Result<Value, HttpError> {
        let request = HttpRequest::builder(method, path)
            .maybe_body(body)
            .token(token)
            .build();
        self.request(request).await
    }
}
