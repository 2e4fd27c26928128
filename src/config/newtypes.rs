//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated Elastic Path client ID.
///
/// # Example
///
/// ```rust
/// use elasticpath::ClientId;
///
/// let id = ClientId::new("my-client-id").unwrap();
/// assert_eq!(id.as_ref(), "my-client-id");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new validated client ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientId`] if the ID is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ConfigError::EmptyClientId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ClientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ClientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated client secret.
///
/// The `Debug` implementation masks the value so secrets never end up in logs.
///
/// ```rust
/// use elasticpath::ClientSecret;
///
/// let secret = ClientSecret::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ClientSecret(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Creates a new validated client secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientSecret`] if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptyClientSecret);
        }
        Ok(Self(secret))
    }
}

impl AsRef<str> for ClientSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(*****)")
    }
}

/// A validated API host.
///
/// Hosts are bare authority strings (`name[:port]`). The scheme is configured
/// separately through the protocol option.
///
/// # Example
///
/// ```rust
/// use elasticpath::Host;
///
/// let host = Host::new("useast.api.elasticpath.com").unwrap();
/// assert_eq!(host.as_ref(), "useast.api.elasticpath.com");
///
/// let local = Host::new("127.0.0.1:8080").unwrap();
/// assert_eq!(local.host_name(), "127.0.0.1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Host(String);

impl Host {
    /// The default Elastic Path API host.
    pub const DEFAULT: &'static str = "euwest.api.elasticpath.com";

    /// Creates a new validated host.
    ///
    /// Surrounding whitespace and a single trailing slash are stripped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHost`] if the host is empty, carries a
    /// scheme or path, or contains whitespace.
    pub fn new(host: impl Into<String>) -> Result<Self, ConfigError> {
        let host = host.into();
        let trimmed = host.trim().trim_end_matches('/');

        let invalid = trimmed.is_empty()
            || trimmed.contains("://")
            || trimmed.contains('/')
            || trimmed.chars().any(char::is_whitespace);
        if invalid {
            return Err(ConfigError::InvalidHost { host });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the host name without any port.
    #[must_use]
    pub fn host_name(&self) -> &str {
        self.0.split(':').next().unwrap_or(&self.0)
    }
}

impl Default for Host {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl AsRef<str> for Host {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
