//! Authentication error types.

use serde_json::Value;
use thiserror::Error;

use crate::clients::TransportError;
use crate::error::ConfigError;
use crate::storage::StorageError;

/// Errors that can occur while obtaining a bearer token.
///
/// # Example
///
/// ```rust
/// use elasticpath::auth::AuthError;
/// use serde_json::json;
///
/// let error = AuthError::TokenRequestFailed {
///     status: 401,
///     body: json!({"errors": [{"status": 401, "title": "Unauthorized"}]}),
/// };
/// assert!(error.to_string().contains("401"));
/// ```
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint responded with a non-2xx status.
    #[error("Token request failed with status {status}: {body}")]
    TokenRequestFailed {
        /// HTTP status code returned by the token endpoint.
        status: u16,
        /// Parsed response body.
        body: Value,
    },

    /// The token endpoint responded 2xx but the body was not a token.
    #[error("Invalid token response: {message}")]
    InvalidTokenResponse {
        /// What was wrong with the response.
        message: String,
    },

    /// Credentials could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The token request never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The client is not configured to authenticate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failure reported by a custom authenticator.
    #[error("Custom authenticator failed: {0}")]
    Custom(String),
}
