//! Pluggable key/value storage for credentials, cart and currency state.
//!
//! The SDK persists a small amount of state between calls: the current
//! bearer credentials, the shopper's cart identifier and the active currency.
//! Storage is injected through [`ClientConfigBuilder::storage`](crate::ClientConfigBuilder::storage),
//! so several client instances can share one backend. Each instance namespaces
//! its keys with the configured `name` (see [`resolve_credentials_storage_key`]).
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryStorage`]: process-local, lost on exit (the default)
//! - [`LocalStorage`]: persisted to a JSON file on disk

mod local;
mod memory;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

use std::fmt::Debug;

use rand::Rng;
use thiserror::Error;

/// Key used for credentials when no instance name is configured.
pub const DEFAULT_CREDENTIALS_KEY: &str = "epCredentials";

/// Key used for the cart identifier when no instance name is configured.
pub const DEFAULT_CART_KEY: &str = "epCart";

/// Key used for the active currency when no instance name is configured.
pub const DEFAULT_CURRENCY_KEY: &str = "epCurrency";

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data could not be (de)serialised.
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A synchronous key/value store.
///
/// Implementations must make each `set` an atomic replacement of the value:
/// a concurrent `get` observes either the old or the new value, never a mix.
pub trait Storage: Debug + Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot persist the value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key` from the store. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot persist the removal.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

fn namespaced(name: Option<&str>, suffix: &str, default: &str) -> String {
    match name {
        Some(name) if !name.is_empty() => format!("{name}_{suffix}"),
        _ => default.to_string(),
    }
}

/// Returns the storage key for credentials of the instance called `name`.
///
/// ```rust
/// use elasticpath::storage::resolve_credentials_storage_key;
///
/// assert_eq!(resolve_credentials_storage_key(None), "epCredentials");
/// assert_eq!(resolve_credentials_storage_key(Some("admin")), "admin_ep_credentials");
/// ```
#[must_use]
pub fn resolve_credentials_storage_key(name: Option<&str>) -> String {
    namespaced(name, "ep_credentials", DEFAULT_CREDENTIALS_KEY)
}

/// Returns the storage key for the cart identifier of the instance called `name`.
#[must_use]
pub fn resolve_cart_storage_key(name: Option<&str>) -> String {
    namespaced(name, "ep_cart", DEFAULT_CART_KEY)
}

/// Returns the storage key for the active currency of the instance called `name`.
#[must_use]
pub fn resolve_currency_storage_key(name: Option<&str>) -> String {
    namespaced(name, "ep_currency", DEFAULT_CURRENCY_KEY)
}

/// Generates a fresh random cart identifier of 32 lowercase hex digits.
#[must_use]
pub fn create_cart_identifier() -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| char::from(HEX[rng.gen_range(0..16)]))
        .collect()
}

/// Returns the cart identifier stored for `name`, creating and persisting one
/// on first access.
///
/// # Errors
///
/// Returns [`StorageError`] if a newly created identifier cannot be persisted.
pub fn cart_identifier(storage: &dyn Storage, name: Option<&str>) -> Result<String, StorageError> {
    let key = resolve_cart_storage_key(name);

    if let Some(existing) = storage.get(&key) {
        return Ok(existing);
    }

    let cart_id = create_cart_identifier();
    storage.set(&key, &cart_id)?;
    tracing::debug!("Created cart identifier under storage key {}", key);
    Ok(cart_id)
}
