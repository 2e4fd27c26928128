//! Error types for the Elastic Path SDK.
//!
//! This module contains the configuration error type used when building a
//! [`ClientConfig`](crate::ClientConfig) and when authentication is attempted
//! without the settings it needs.
//!
//! # Example
//!
//! ```rust
//! use elasticpath::{ClientId, ConfigError};
//!
//! let result = ClientId::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyClientId)));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
///
/// Configuration errors are never retried. They are reported synchronously,
/// either from [`ClientConfigBuilder::build`](crate::ClientConfigBuilder::build)
/// or before an authentication future is created.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty. Please provide a valid Elastic Path client_id.")]
    EmptyClientId,

    /// Client secret cannot be empty.
    #[error("Client secret cannot be empty. Omit it to use the implicit grant.")]
    EmptyClientSecret,

    /// No client ID is configured and no custom authenticator was supplied.
    #[error("You must have a client_id set")]
    MissingClientId,

    /// Host is invalid.
    #[error("Invalid API host '{host}'. Expected a bare host name such as 'euwest.api.elasticpath.com'.")]
    InvalidHost {
        /// The invalid host that was provided.
        host: String,
    },

    /// A numeric option is outside its allowed range.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the offending option.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_client_id_message_matches_legacy_text() {
        let error = ConfigError::MissingClientId;
        assert_eq!(error.to_string(), "You must have a client_id set");
    }

    #[test]
    fn test_invalid_host_error_message() {
        let error = ConfigError::InvalidHost {
            host: "https://bad".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("https://bad"));
        assert!(message.contains("bare host name"));
    }

    #[test]
    fn test_invalid_value_error_message() {
        let error = ConfigError::InvalidValue {
            field: "fetch_max_attempts",
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid value for 'fetch_max_attempts': must be at least 1"
        );
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyClientId;
        let _: &dyn std::error::Error = &error;
    }
}
