//! Bearer token acquisition.
//!
//! [`Authenticator`] returns cached credentials while they are valid and
//! requests a new token from `{protocol}://{host}/oauth/access_token`
//! otherwise. The grant type follows the configuration:
//!
//! | configuration | grant |
//! |---|---|
//! | `client_id` only | `implicit` |
//! | `client_id` + `client_secret` | `client_credentials` |
//! | `password_grant(username, password)` | `password` |
//!
//! A [`CustomAuthenticator`] replaces all of the above; its credentials are
//! returned verbatim and never cached.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::auth::credentials::{CredentialCache, Credentials, TokenStatus};
use crate::auth::error::AuthError;
use crate::clients::http_client::sdk_headers;
use crate::clients::http_response::parse_response_body;
use crate::clients::{Fetch, FetchRequest, HttpMethod};
use crate::config::ClientConfig;
use crate::error::ConfigError;

/// Caller-supplied token source.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use elasticpath::auth::{AuthError, Credentials, CustomAuthenticator};
///
/// #[derive(Debug)]
/// struct FromGateway;
///
/// #[async_trait]
/// impl CustomAuthenticator for FromGateway {
///     async fn authenticate(&self) -> Result<Credentials, AuthError> {
///         Ok(Credentials::new("gateway", "token-from-gateway", i64::MAX))
///     }
/// }
/// ```
#[async_trait]
pub trait CustomAuthenticator: fmt::Debug + Send + Sync {
    /// Returns credentials to use for the next request.
    async fn authenticate(&self) -> Result<Credentials, AuthError>;
}

/// OAuth grant used for token requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantType {
    /// Public storefront access with only a client ID.
    Implicit,
    /// Server-side access with a client ID and secret.
    ClientCredentials,
    /// Access on behalf of a user.
    Password,
}

impl GrantType {
    /// Selects the grant implied by `config`.
    #[must_use]
    pub const fn for_config(config: &ClientConfig) -> Self {
        if config.password().is_some() {
            Self::Password
        } else if config.client_secret().is_some() {
            Self::ClientCredentials
        } else {
            Self::Implicit
        }
    }

    /// Returns the `grant_type` form value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Implicit => "implicit",
            Self::ClientCredentials => "client_credentials",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Username and password for the `password` grant.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    username: String,
    password: String,
}

impl PasswordCredentials {
    /// Creates a username/password pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}

/// Obtains and caches bearer tokens for one client instance.
#[derive(Debug)]
pub struct Authenticator {
    config: Arc<ClientConfig>,
    fetch: Arc<dyn Fetch>,
    cache: CredentialCache,
}

// Verify Authenticator is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Authenticator>();
};

impl Authenticator {
    /// Creates an authenticator that sends token requests through `fetch`.
    #[must_use]
    pub fn new(config: Arc<ClientConfig>, fetch: Arc<dyn Fetch>) -> Self {
        let cache = CredentialCache::new(config.storage().clone(), config.name());
        Self {
            config,
            fetch,
            cache,
        }
    }

    /// Returns the credential cache.
    #[must_use]
    pub const fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    /// Returns the grant used for token requests.
    #[must_use]
    pub fn grant_type(&self) -> GrantType {
        GrantType::for_config(&self.config)
    }

    /// Returns the status of the stored credentials.
    #[must_use]
    pub fn token_status(&self) -> TokenStatus {
        self.cache.status(self.client_id())
    }

    /// Returns usable credentials, requesting a new token only when the cached
    /// ones are missing, expired or were issued for another client ID.
    ///
    /// Configuration is checked before the future is created, so a client
    /// without a client ID or custom authenticator fails immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingClientId`] synchronously when neither a
    /// client ID nor a custom authenticator is configured. The returned future
    /// resolves to [`AuthError`] if the token request fails.
    pub fn authenticate(
        &self,
    ) -> Result<impl Future<Output = Result<Credentials, AuthError>> + Send + '_, ConfigError> {
        if self.config.custom_authenticator().is_none() && self.config.client_id().is_none() {
            return Err(ConfigError::MissingClientId);
        }
        Ok(self.resolve())
    }

    async fn resolve(&self) -> Result<Credentials, AuthError> {
        if let Some(custom) = self.config.custom_authenticator() {
            return custom.authenticate().await;
        }

        match self.cache.check(self.client_id(), Utc::now().timestamp()) {
            Ok(credentials) => Ok(credentials),
            Err(status) => {
                tracing::info!("{}", status.reason());
                self.request_token().await
            }
        }
    }

    async fn request_token(&self) -> Result<Credentials, AuthError> {
        let client_id = self.client_id().ok_or(ConfigError::MissingClientId)?;
        let grant = self.grant_type();

        let mut headers = sdk_headers(&self.config);
        headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        headers.extend(
            self.config
                .headers()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let request = FetchRequest {
            url: format!(
                "{}://{}/oauth/access_token",
                self.config.protocol(),
                self.config.host()
            ),
            method: HttpMethod::Post,
            headers,
            body: Some(self.token_request_body(client_id, grant)),
        };

        tracing::debug!("Requesting {} token from {}", grant, request.url);
        let response = self.fetch.fetch(request).await?;
        let body = parse_response_body(response.status, &response.body);

        if !response.ok() {
            return Err(AuthError::TokenRequestFailed {
                status: response.status,
                body,
            });
        }

        let mut credentials: Credentials =
            serde_json::from_value(body).map_err(|e| AuthError::InvalidTokenResponse {
                message: e.to_string(),
            })?;
        if credentials.access_token.is_empty() {
            return Err(AuthError::InvalidTokenResponse {
                message: "response did not contain an access_token".to_string(),
            });
        }
        if credentials.expires == 0 {
            if let Some(expires_in) = credentials.expires_in {
                credentials.expires = Utc::now().timestamp() + expires_in;
            }
        }
        credentials.client_id = client_id.to_string();

        self.cache.store(&credentials)?;
        Ok(credentials)
    }

    fn token_request_body(&self, client_id: &str, grant: GrantType) -> String {
        let mut fields = vec![("grant_type", grant.as_str()), ("client_id", client_id)];
        match grant {
            GrantType::ClientCredentials => {
                if let Some(secret) = self.config.client_secret() {
                    fields.push(("client_secret", secret.as_ref()));
                }
            }
            GrantType::Password => {
                if let Some(password) = self.config.password() {
                    fields.push(("username", password.username()));
                    fields.push(("password", password.password()));
                }
            }
            GrantType::Implicit => {}
        }

        fields
            .into_iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn client_id(&self) -> Option<&str> {
        self.config.client_id().map(AsRef::as_ref)
    }
}
