//! Configuration types for the Elastic Path SDK.
//!
//! # Overview
//!
//! - [`ClientConfig`]: all SDK settings, immutable once built
//! - [`ClientConfigBuilder`]: validating builder for [`ClientConfig`]
//! - [`RetryConfig`]: 429 retry policy
//! - [`ThrottleConfig`]: optional outgoing rate limit
//! - [`ClientId`], [`ClientSecret`], [`Host`]: validated newtypes
//!
//! # Example
//!
//! ```rust
//! use elasticpath::{ClientConfig, ClientId};
//!
//! let config = ClientConfig::builder()
//!     .client_id(ClientId::new("my-client-id").unwrap())
//!     .name("storefront")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.host().as_ref(), "euwest.api.elasticpath.com");
//! assert_eq!(config.retry().max_attempts, 4);
//! ```

mod newtypes;

pub use newtypes::{ClientId, ClientSecret, Host};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::auth::{CustomAuthenticator, PasswordCredentials};
use crate::clients::Fetch;
use crate::error::ConfigError;
use crate::storage::{MemoryStorage, Storage};

/// Default API version path segment.
pub const DEFAULT_API_VERSION: &str = "v2";

/// Retry policy applied to rate-limited (HTTP 429) responses.
///
/// The wait before retry `n` (1-based) is `n * delay + random(0..=jitter)`,
/// so the first retry waits at least `delay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Base delay between attempts.
    pub delay: Duration,
    /// Upper bound of the random jitter added to each delay.
    pub jitter: Duration,
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
}

impl RetryConfig {
    /// Returns the wait before the retry that follows `attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        self.delay.saturating_mul(attempt.max(1)) + jitter
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            jitter: Duration::from_millis(500),
            max_attempts: 4,
        }
    }
}

/// Outgoing request rate limit.
///
/// When enabled, at most `limit` requests start within any `interval`
/// window. Excess requests wait their turn in FIFO order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Whether the throttle gate wraps the transport.
    pub enabled: bool,
    /// Requests allowed per interval.
    pub limit: u32,
    /// Length of the rate window.
    pub interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            limit: 3,
            interval: Duration::from_millis(125),
        }
    }
}

/// Configuration for the Elastic Path SDK.
///
/// `ClientConfig` is cheap to clone: the storage backend and any custom
/// transport or authenticator are shared behind `Arc`s.
#[derive(Clone)]
pub struct ClientConfig {
    client_id: Option<ClientId>,
    client_secret: Option<ClientSecret>,
    password: Option<PasswordCredentials>,
    host: Host,
    protocol: String,
    version: String,
    name: Option<String>,
    storage: Arc<dyn Storage>,
    custom_fetch: Option<Arc<dyn Fetch>>,
    custom_authenticator: Option<Arc<dyn CustomAuthenticator>>,
    retry: RetryConfig,
    throttle: ThrottleConfig,
    disable_cart: bool,
    headers: HashMap<String, String>,
    application: Option<String>,
    currency: Option<String>,
    language: Option<String>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the client ID, if configured.
    #[must_use]
    pub const fn client_id(&self) -> Option<&ClientId> {
        self.client_id.as_ref()
    }

    /// Returns the client secret, if configured.
    #[must_use]
    pub const fn client_secret(&self) -> Option<&ClientSecret> {
        self.client_secret.as_ref()
    }

    /// Returns the password grant credentials, if configured.
    #[must_use]
    pub const fn password(&self) -> Option<&PasswordCredentials> {
        self.password.as_ref()
    }

    /// Returns the API host.
    #[must_use]
    pub const fn host(&self) -> &Host {
        &self.host
    }

    /// Returns the URL scheme used for all requests.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Returns the default API version path segment.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the instance name used to namespace storage keys.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the storage backend.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Returns the custom transport, if configured.
    #[must_use]
    pub const fn custom_fetch(&self) -> Option<&Arc<dyn Fetch>> {
        self.custom_fetch.as_ref()
    }

    /// Returns the custom authenticator, if configured.
    #[must_use]
    pub const fn custom_authenticator(&self) -> Option<&Arc<dyn CustomAuthenticator>> {
        self.custom_authenticator.as_ref()
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Returns the throttle settings.
    #[must_use]
    pub const fn throttle(&self) -> &ThrottleConfig {
        &self.throttle
    }

    /// Returns whether the cart identifier is disabled.
    #[must_use]
    pub const fn disable_cart(&self) -> bool {
        self.disable_cart
    }

    /// Returns the extra headers merged into every request.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Returns the application identifier sent as `X-MOLTIN-APPLICATION`.
    #[must_use]
    pub fn application(&self) -> Option<&str> {
        self.application.as_deref()
    }

    /// Returns the fixed currency, if configured.
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    /// Returns the language sent as `X-MOLTIN-LANGUAGE`.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret)
            .field("password", &self.password)
            .field("host", &self.host)
            .field("protocol", &self.protocol)
            .field("version", &self.version)
            .field("name", &self.name)
            .field("storage", &self.storage)
            .field("custom_fetch", &self.custom_fetch.is_some())
            .field("custom_authenticator", &self.custom_authenticator.is_some())
            .field("retry", &self.retry)
            .field("throttle", &self.throttle)
            .field("disable_cart", &self.disable_cart)
            .field("headers", &self.headers)
            .field("application", &self.application)
            .field("currency", &self.currency)
            .field("language", &self.language)
            .finish()
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// Every field is optional. A config without a client ID can still be built:
/// requests then need an explicit token or a custom authenticator, otherwise
/// authentication fails with [`ConfigError::MissingClientId`].
///
/// # Defaults
///
/// - `host`: `euwest.api.elasticpath.com`
/// - `protocol`: `https`
/// - `version`: `v2`
/// - `storage`: a fresh [`MemoryStorage`]
/// - retry: 1000 ms delay, 500 ms jitter, 4 attempts
/// - throttle: disabled, 3 requests per 125 ms when enabled
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    client_id: Option<ClientId>,
    client_secret: Option<ClientSecret>,
    password: Option<PasswordCredentials>,
    host: Option<Host>,
    protocol: Option<String>,
    version: Option<String>,
    name: Option<String>,
    storage: Option<Arc<dyn Storage>>,
    custom_fetch: Option<Arc<dyn Fetch>>,
    custom_authenticator: Option<Arc<dyn CustomAuthenticator>>,
    retry: RetryConfig,
    throttle: ThrottleConfig,
    disable_cart: bool,
    headers: HashMap<String, String>,
    application: Option<String>,
    currency: Option<String>,
    language: Option<String>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the client ID.
    #[must_use]
    pub fn client_id(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    /// Sets the client secret, switching authentication to the
    /// `client_credentials` grant.
    #[must_use]
    pub fn client_secret(mut self, secret: ClientSecret) -> Self {
        self.client_secret = Some(secret);
        self
    }

    /// Authenticates with the `password` grant using these credentials.
    #[must_use]
    pub fn password_grant(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.password = Some(PasswordCredentials::new(username, password));
        self
    }

    /// Sets the API host.
    #[must_use]
    pub fn host(mut self, host: Host) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the URL scheme (`https` by default).
    #[must_use]
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Sets the default API version path segment.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the instance name used to namespace storage keys.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the storage backend.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Replaces the default HTTP transport.
    #[must_use]
    pub fn custom_fetch(mut self, fetch: Arc<dyn Fetch>) -> Self {
        self.custom_fetch = Some(fetch);
        self
    }

    /// Replaces token acquisition with a caller-supplied authenticator.
    #[must_use]
    pub fn custom_authenticator(mut self, authenticator: Arc<dyn CustomAuthenticator>) -> Self {
        self.custom_authenticator = Some(authenticator);
        self
    }

    /// Sets the base delay between rate-limited attempts.
    #[must_use]
    pub const fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry.delay = delay;
        self
    }

    /// Sets the maximum random jitter added to each retry delay.
    #[must_use]
    pub const fn retry_jitter(mut self, jitter: Duration) -> Self {
        self.retry.jitter = jitter;
        self
    }

    /// Sets the total number of attempts for rate-limited requests.
    #[must_use]
    pub const fn fetch_max_attempts(mut self, attempts: u32) -> Self {
        self.retry.max_attempts = attempts;
        self
    }

    /// Enables or disables the throttle gate.
    #[must_use]
    pub const fn throttle_enabled(mut self, enabled: bool) -> Self {
        self.throttle.enabled = enabled;
        self
    }

    /// Sets the number of requests allowed per throttle interval.
    #[must_use]
    pub const fn throttle_limit(mut self, limit: u32) -> Self {
        self.throttle.limit = limit;
        self
    }

    /// Sets the throttle interval.
    #[must_use]
    pub const fn throttle_interval(mut self, interval: Duration) -> Self {
        self.throttle.interval = interval;
        self
    }

    /// Disables the persisted cart identifier.
    #[must_use]
    pub const fn disable_cart(mut self, disable: bool) -> Self {
        self.disable_cart = disable;
        self
    }

    /// Adds a header sent with every request, including token requests.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Replaces all extra headers at once.
    #[must_use]
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the application identifier.
    #[must_use]
    pub fn application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }

    /// Pins the currency sent with every request, overriding stored state.
    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Sets the content language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builds the [`ClientConfig`], validating numeric options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `fetch_max_attempts` is zero,
    /// or if throttling is enabled with a zero limit or interval, or if the
    /// protocol is empty.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch_max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.throttle.enabled && self.throttle.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "throttle_limit",
                reason: "must be at least 1 when throttling is enabled".to_string(),
            });
        }
        if self.throttle.enabled && self.throttle.interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "throttle_interval",
                reason: "must be greater than zero when throttling is enabled".to_string(),
            });
        }

        let protocol = self.protocol.unwrap_or_else(|| "https".to_string());
        if protocol.is_empty() || !protocol.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidValue {
                field: "protocol",
                reason: format!("'{protocol}' is not a URL scheme"),
            });
        }

        Ok(ClientConfig {
            client_id: self.client_id,
            client_secret: self.client_secret,
            password: self.password,
            host: self.host.unwrap_or_default(),
            protocol,
            version: self
                .version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            name: self.name.filter(|n| !n.is_empty()),
            storage: self
                .storage
                .unwrap_or_else(|| Arc::new(MemoryStorage::new())),
            custom_fetch: self.custom_fetch,
            custom_authenticator: self.custom_authenticator,
            retry: self.retry,
            throttle: self.throttle,
            disable_cart: self.disable_cart,
            headers: self.headers,
            application: self.application,
            currency: self.currency,
            language: self.language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ClientConfig::builder().build().unwrap();

        assert!(config.client_id().is_none());
        assert_eq!(config.host().as_ref(), "euwest.api.elasticpath.com");
        assert_eq!(config.protocol(), "https");
        assert_eq!(config.version(), "v2");
        assert!(config.name().is_none());
        assert_eq!(config.retry(), &RetryConfig::default());
        assert_eq!(config.retry().max_attempts, 4);
        assert!(!config.throttle().enabled);
        assert_eq!(config.throttle().limit, 3);
        assert_eq!(config.throttle().interval, Duration::from_millis(125));
        assert!(!config.disable_cart());
        assert!(config.custom_fetch().is_none());
        assert!(config.custom_authenticator().is_none());
    }

    #[test]
    fn test_builder_with_throttle_options() {
        let config = ClientConfig::builder()
            .throttle_enabled(true)
            .throttle_limit(3)
            .throttle_interval(Duration::from_millis(125))
            .build()
            .unwrap();

        assert!(config.throttle().enabled);
        assert_eq!(config.throttle().limit, 3);
        assert_eq!(config.throttle().interval, Duration::from_millis(125));
    }

    #[test]
    fn test_builder_rejects_zero_attempts() {
        let result = ClientConfig::builder().fetch_max_attempts(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "fetch_max_attempts",
                ..
            })
        ));
    }

    #[test]
    fn test_builder_rejects_zero_throttle_limit_only_when_enabled() {
        assert!(ClientConfig::builder().throttle_limit(0).build().is_ok());

        let result = ClientConfig::builder()
            .throttle_enabled(true)
            .throttle_limit(0)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "throttle_limit",
                ..
            })
        ));
    }

    #[test]
    fn test_builder_rejects_bad_protocol() {
        let result = ClientConfig::builder().protocol("http://").build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "protocol",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_name_is_treated_as_unset() {
        let config = ClientConfig::builder().name("").build().unwrap();
        assert!(config.name().is_none());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let config = ClientConfig::builder()
            .client_id(ClientId::new("id").unwrap())
            .client_secret(ClientSecret::new("very-secret").unwrap())
            .password_grant("user@example.com", "hunter2")
            .build()
            .unwrap();

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("ClientConfig"));
        assert!(!debug_str.contains("very-secret"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_retry_delay_is_linear_with_bounded_jitter() {
        let retry = RetryConfig {
            delay: Duration::from_millis(100),
            jitter: Duration::from_millis(10),
            max_attempts: 3,
        };

        for _ in 0..20 {
            let first = retry.delay_for(1);
            assert!(first >= Duration::from_millis(100));
            assert!(first <= Duration::from_millis(110));

            let second = retry.delay_for(2);
            assert!(second >= Duration::from_millis(200));
            assert!(second <= Duration::from_millis(210));
        }
    }

    #[test]
    fn test_retry_delay_without_jitter_is_exact() {
        let retry = RetryConfig {
            delay: Duration::from_millis(50),
            jitter: Duration::ZERO,
            max_attempts: 2,
        };
        assert_eq!(retry.delay_for(1), Duration::from_millis(50));
    }
}
