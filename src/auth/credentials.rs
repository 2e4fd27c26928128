//! Bearer credentials and their cache.
//!
//! Credentials are stored as a JSON record under a key derived from the
//! client's instance name. A record is only usable when it carries an access
//! token, was issued for the configured client ID, and has not expired.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::clients::http_response::try_parse_json;
use crate::storage::{resolve_credentials_storage_key, Storage, StorageError};

/// A bearer token together with its expiry and issuing client.
///
/// Unknown or missing fields deserialize to their defaults, so a partially
/// written record is treated as invalid rather than as a parse failure.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// The client ID the token was issued for.
    #[serde(default)]
    pub client_id: String,

    /// The bearer token.
    #[serde(default)]
    pub access_token: String,

    /// Expiry as Unix seconds.
    #[serde(default)]
    pub expires: i64,

    /// Lifetime in seconds as reported by the token endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Token type, usually `Bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Grant identifier, e.g. `implicit` or `client_credentials`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl Credentials {
    /// Creates credentials with only the required fields set.
    #[must_use]
    pub fn new(client_id: impl Into<String>, access_token: impl Into<String>, expires: i64) -> Self {
        Self {
            client_id: client_id.into(),
            access_token: access_token.into(),
            expires,
            ..Self::default()
        }
    }

    /// Returns `true` if the token has expired at `now` (Unix seconds).
    #[must_use]
    pub const fn expired_at(&self, now: i64) -> bool {
        now >= self.expires
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("access_token", &"*****")
            .field("expires", &self.expires)
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("identifier", &self.identifier)
            .finish()
    }
}

/// Why stored credentials can or cannot be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStatus {
    /// Nothing is stored.
    Missing,
    /// A record exists without an access token.
    MissingAccessToken,
    /// The token was issued for a different client ID.
    ClientIdMismatch,
    /// The token has expired.
    Expired,
    /// The token can be used.
    Valid,
}

impl TokenStatus {
    /// Returns `true` for every status other than [`TokenStatus::Valid`].
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        !matches!(self, Self::Valid)
    }

    /// Returns a human-readable description of the status.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Missing => "Token status: credentials do not exist",
            Self::MissingAccessToken => "Token status: credentials missing access_token",
            Self::ClientIdMismatch => "Token status: client_id mismatch",
            Self::Expired => "Token status: credentials expired",
            Self::Valid => "Token status: valid",
        }
    }
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Reads and writes the credentials record for one client instance.
#[derive(Clone, Debug)]
pub struct CredentialCache {
    storage: Arc<dyn Storage>,
    key: String,
}

impl CredentialCache {
    /// Creates a cache over `storage` for the instance called `name`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, name: Option<&str>) -> Self {
        Self {
            storage,
            key: resolve_credentials_storage_key(name),
        }
    }

    /// Returns the storage key holding the record.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the stored credentials, if a readable record exists.
    #[must_use]
    pub fn load(&self) -> Option<Credentials> {
        let raw = self.storage.get(&self.key)?;
        try_parse_json::<Option<Credentials>>(&raw, None)
    }

    /// Returns the stored credentials if they are usable for `client_id` at
    /// `now` (Unix seconds), or the reason they are not.
    ///
    /// # Errors
    ///
    /// Returns the invalid [`TokenStatus`] when the credentials cannot be used.
    pub fn check(&self, client_id: Option<&str>, now: i64) -> Result<Credentials, TokenStatus> {
        let credentials = self.load().ok_or(TokenStatus::Missing)?;

        if credentials.access_token.is_empty() {
            return Err(TokenStatus::MissingAccessToken);
        }
        if Some(credentials.client_id.as_str()) != client_id {
            return Err(TokenStatus::ClientIdMismatch);
        }
        if credentials.expired_at(now) {
            return Err(TokenStatus::Expired);
        }

        Ok(credentials)
    }

    /// Returns the status of the stored credentials right now.
    #[must_use]
    pub fn status(&self, client_id: Option<&str>) -> TokenStatus {
        match self.check(client_id, Utc::now().timestamp()) {
            Ok(_) => TokenStatus::Valid,
            Err(status) => status,
        }
    }

    /// Returns `true` if the stored credentials cannot be used right now.
    ///
    /// The reason is logged at `warn` level.
    #[must_use]
    pub fn is_invalid(&self, client_id: Option<&str>) -> bool {
        let status = self.status(client_id);
        if status.is_invalid() {
            tracing::warn!("{}", status.reason());
        }
        status.is_invalid()
    }

    /// Replaces the stored record with `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the record cannot be serialized or persisted.
    pub fn store(&self, credentials: &Credentials) -> Result<(), StorageError> {
        let raw = serde_json::to_string(credentials)?;
        self.storage.set(&self.key, &raw)
    }

    /// Removes the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the removal cannot be persisted.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.delete(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    const NOW: i64 = 1_700_000_000;

    fn cache() -> (Arc<MemoryStorage>, CredentialCache) {
        let storage = Arc::new(MemoryStorage::new());
        let cache = CredentialCache::new(storage.clone(), None);
        (storage, cache)
    }

    #[test]
    fn test_missing_record_is_reported() {
        let (_, cache) = cache();
        assert_eq!(cache.check(Some("abc"), NOW), Err(TokenStatus::Missing));
    }

    #[test]
    fn test_valid_record_is_returned() {
        let (_, cache) = cache();
        let credentials = Credentials::new("abc", "token-1", NOW + 3600);
        cache.store(&credentials).unwrap();

        assert_eq!(cache.check(Some("abc"), NOW), Ok(credentials));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let (_, cache) = cache();
        cache
            .store(&Credentials::new("abc", "token-1", NOW))
            .unwrap();

        assert_eq!(cache.check(Some("abc"), NOW - 1).map(|c| c.expires), Ok(NOW));
        assert_eq!(cache.check(Some("abc"), NOW), Err(TokenStatus::Expired));
    }

    #[test]
    fn test_client_id_mismatch_is_invalid() {
        let (_, cache) = cache();
        cache
            .store(&Credentials::new("abc", "token-1", NOW + 3600))
            .unwrap();

        assert_eq!(
            cache.check(Some("other"), NOW),
            Err(TokenStatus::ClientIdMismatch)
        );
        assert_eq!(cache.check(None, NOW), Err(TokenStatus::ClientIdMismatch));
    }

    #[test]
    fn test_record_without_access_token_is_invalid() {
        let (storage, cache) = cache();
        storage
            .set("epCredentials", r#"{"client_id":"abc","expires":99999999999}"#)
            .unwrap();

        assert_eq!(
            cache.check(Some("abc"), NOW),
            Err(TokenStatus::MissingAccessToken)
        );
    }

    #[test]
    fn test_unreadable_record_counts_as_missing() {
        let (storage, cache) = cache();
        storage.set("epCredentials", "not json").unwrap();

        assert!(cache.load().is_none());
        assert_eq!(cache.check(Some("abc"), NOW), Err(TokenStatus::Missing));
    }

    #[test]
    fn test_store_overwrites_whole_record() {
        let (storage, cache) = cache();
        let mut first = Credentials::new("abc", "token-1", NOW + 10);
        first.identifier = Some("implicit".to_string());
        cache.store(&first).unwrap();

        cache
            .store(&Credentials::new("abc", "token-2", NOW + 20))
            .unwrap();

        let raw = storage.get("epCredentials").unwrap();
        assert!(!raw.contains("implicit"));
        assert_eq!(cache.load().unwrap().access_token, "token-2");
    }

    #[test]
    fn test_named_instance_uses_namespaced_key() {
        let storage = Arc::new(MemoryStorage::new());
        let cache = CredentialCache::new(storage.clone(), Some("admin"));
        cache
            .store(&Credentials::new("abc", "token-1", NOW))
            .unwrap();

        assert_eq!(cache.key(), "admin_ep_credentials");
        assert!(storage.get("admin_ep_credentials").is_some());
        assert!(storage.get("epCredentials").is_none());
    }

    #[test]
    fn test_clear_removes_record() {
        let (_, cache) = cache();
        cache
            .store(&Credentials::new("abc", "token-1", NOW))
            .unwrap();
        cache.clear().unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn test_debug_masks_access_token() {
        let credentials = Credentials::new("abc", "super-secret-token", NOW);
        let debug_str = format!("{credentials:?}");
        assert!(!debug_str.contains("super-secret-token"));
        assert!(debug_str.contains("abc"));
    }

    #[test]
    fn test_token_status_reasons() {
        assert!(TokenStatus::Expired.is_invalid());
        assert!(!TokenStatus::Valid.is_invalid());
        assert_eq!(
            TokenStatus::ClientIdMismatch.to_string(),
            "Token status: client_id mismatch"
        );
    }
}
