//! The SDK entry point.

use std::future::Future;
use std::sync::Arc;

use crate::auth::{AuthError, Credentials, TokenStatus};
use crate::clients::HttpClient;
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::rest::{Cart, Customers, Endpoint};
use crate::storage::{cart_identifier, StorageError};

/// A client for one Elastic Path store.
///
/// Cloning is cheap; clones share the dispatcher, storage and throttle gate.
///
/// # Example
///
/// ```rust,ignore
/// use elasticpath::{ClientConfig, ClientId, ElasticPath};
/// use elasticpath::query::Filter;
///
/// let client = ElasticPath::new(
///     ClientConfig::builder()
///         .client_id(ClientId::new("my-client-id")?)
///         .build()?,
/// )?;
///
/// let products = client
///     .products()
///     .filter(Filter::new().eq("status", "live"))
///     .limit(10)
///     .all()
///     .await?;
///
/// if let Some(cart) = client.cart() {
///     cart.add_product("product-id", 1).await?;
/// }
/// ```
#[derive(Clone, Debug)]
pub struct ElasticPath {
    http: Arc<HttpClient>,
    cart_id: Option<String>,
}

// Verify ElasticPath is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ElasticPath>();
};

impl ElasticPath {
    /// Creates a client.
    ///
    /// Unless `disable_cart` is set, the shopper's cart ID is read from
    /// storage, or created and persisted on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a new cart ID cannot be persisted.
    pub fn new(config: ClientConfig) -> Result<Self, StorageError> {
        let config = Arc::new(config);
        let cart_id = if config.disable_cart() {
            None
        } else {
            Some(cart_identifier(&**config.storage(), config.name())?)
        };

        Ok(Self {
            http: Arc::new(HttpClient::new(config)),
            cart_id,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        self.http.config()
    }

    /// Returns the request dispatcher.
    #[must_use]
    pub const fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    /// Returns usable credentials, fetching a token if the stored ones are
    /// missing, expired or for another client ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingClientId`] immediately when neither a
    /// client ID nor a custom authenticator is configured.
    pub fn authenticate(
        &self,
    ) -> Result<impl Future<Output = Result<Credentials, AuthError>> + Send + '_, ConfigError> {
        self.http.authenticator().authenticate()
    }

    /// Returns the stored credentials, valid or not.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        self.http.authenticator().cache().load()
    }

    /// Returns the status of the stored credentials.
    #[must_use]
    pub fn token_status(&self) -> TokenStatus {
        self.http.authenticator().token_status()
    }

    /// Returns `true` if the next authenticated call will fetch a new token.
    ///
    /// The reason is logged at `warn` level.
    #[must_use]
    pub fn is_token_invalid(&self) -> bool {
        let client_id = self.config().client_id().map(AsRef::as_ref);
        self.http.authenticator().cache().is_invalid(client_id)
    }

    /// Returns the shopper's cart ID, unless carts are disabled.
    #[must_use]
    pub fn cart_id(&self) -> Option<&str> {
        self.cart_id.as_deref()
    }

    /// Returns the shopper's cart, unless carts are disabled.
    #[must_use]
    pub fn cart(&self) -> Option<Cart> {
        self.cart_id
            .as_ref()
            .map(|id| Cart::new(self.http.clone(), id.clone()))
    }

    /// Returns the cart with an explicit ID.
    #[must_use]
    pub fn cart_with_id(&self, id: impl Into<String>) -> Cart {
        Cart::new(self.http.clone(), id)
    }

    /// Returns the active currency code.
    #[must_use]
    pub fn currency(&self) -> Option<String> {
        self.http.currency()
    }

    /// Persists `code` as the active currency for subsequent requests.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value cannot be persisted.
    pub fn set_currency(&self, code: &str) -> Result<(), StorageError> {
        self.http.set_currency(code)
    }

    /// Returns an endpoint for an arbitrary resource path.
    #[must_use]
    pub fn endpoint(&self, path: impl Into<String>) -> Endpoint {
        Endpoint::new(self.http.clone(), path)
    }

    /// The `customers` endpoint.
    #[must_use]
    pub fn customers(&self) -> Customers {
        Customers::new(self.http.clone())
    }

    /// The legacy `products` endpoint.
    #[must_use]
    pub fn products(&self) -> Endpoint {
        self.endpoint("products")
    }

    /// Product Content Management products.
    #[must_use]
    pub fn pcm_products(&self) -> Endpoint {
        self.endpoint("products").with_version("pcm")
    }

    /// Product Content Management hierarchies.
    #[must_use]
    pub fn hierarchies(&self) -> Endpoint {
        self.endpoint("hierarchies").with_version("pcm")
    }

    /// Price books.
    #[must_use]
    pub fn price_books(&self) -> Endpoint {
        self.endpoint("pricebooks").with_version("pcm")
    }

    /// Catalogs.
    #[must_use]
    pub fn catalogs(&self) -> Endpoint {
        self.endpoint("catalogs").with_version("pcm")
    }

    /// Orders.
    #[must_use]
    pub fn orders(&self) -> Endpoint {
        self.endpoint("orders")
    }

    /// Accounts.
    #[must_use]
    pub fn accounts(&self) -> Endpoint {
        self.endpoint("accounts")
    }

    /// Account tags.
    #[must_use]
    pub fn account_tags(&self) -> Endpoint {
        self.endpoint("account-tags")
    }

    /// Currencies.
    #[must_use]
    pub fn currencies(&self) -> Endpoint {
        self.endpoint("currencies")
    }

    /// Files.
    #[must_use]
    pub fn files(&self) -> Endpoint {
        self.endpoint("files")
    }

    /// Flows.
    #[must_use]
    pub fn flows(&self) -> Endpoint {
        self.endpoint("flows")
    }

    /// Fields.
    #[must_use]
    pub fn fields(&self) -> Endpoint {
        self.endpoint("fields")
    }

    /// Payment gateways.
    #[must_use]
    pub fn gateways(&self) -> Endpoint {
        self.endpoint("gateways")
    }

    /// Inventories.
    #[must_use]
    pub fn inventories(&self) -> Endpoint {
        self.endpoint("inventories")
    }

    /// Inventory locations.
    #[must_use]
    pub fn inventory_locations(&self) -> Endpoint {
        self.endpoint("inventories/locations")
    }

    /// Jobs.
    #[must_use]
    pub fn jobs(&self) -> Endpoint {
        self.endpoint("jobs")
    }

    /// Promotions.
    #[must_use]
    pub fn promotions(&self) -> Endpoint {
        self.endpoint("promotions")
    }

    /// Rule promotions.
    #[must_use]
    pub fn rule_promotions(&self) -> Endpoint {
        self.endpoint("rule-promotions")
    }

    /// Subscriptions.
    #[must_use]
    pub fn subscriptions(&self) -> Endpoint {
        self.endpoint("subscriptions/subscriptions")
    }

    /// Subscription invoices.
    #[must_use]
    pub fn subscription_invoices(&self) -> Endpoint {
        self.endpoint("subscriptions/invoices")
    }

    /// Custom relationships.
    #[must_use]
    pub fn custom_relationships(&self) -> Endpoint {
        self.endpoint("custom_relationships")
    }

    /// Store metrics.
    #[must_use]
    pub fn metrics(&self) -> Endpoint {
        self.endpoint("metrics")
    }

    /// Settings.
    #[must_use]
    pub fn settings(&self) -> Endpoint {
        self.endpoint("settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientId;
    use crate::storage::{MemoryStorage, Storage};

    #[test]
    fn test_cart_id_is_created_once_per_namespace() {
        let storage = Arc::new(MemoryStorage::new());
        let config = || {
            ClientConfig::builder()
                .client_id(ClientId::new("abc").unwrap())
                .storage(storage.clone())
                .build()
                .unwrap()
        };

        let first = ElasticPath::new(config()).unwrap();
        let second = ElasticPath::new(config()).unwrap();

        let id = first.cart_id().unwrap();
        assert_eq!(id.len(), 32);
        assert_eq!(second.cart_id(), Some(id));
        assert_eq!(storage.get("epCart").as_deref(), Some(id));
    }

    #[test]
    fn test_disable_cart() {
        let storage = Arc::new(MemoryStorage::new());
        let client = ElasticPath::new(
            ClientConfig::builder()
                .storage(storage.clone())
                .disable_cart(true)
                .build()
                .unwrap(),
        )
        .unwrap();

        assert!(client.cart_id().is_none());
        assert!(client.cart().is_none());
        assert!(storage.get("epCart").is_none());
    }

    #[test]
    fn test_authenticate_without_client_id_is_config_error() {
        let client = ElasticPath::new(ClientConfig::builder().build().unwrap()).unwrap();
        assert!(matches!(
            client.authenticate(),
            Err(ConfigError::MissingClientId)
        ));
    }

    #[test]
    fn test_named_endpoints() {
        let client = ElasticPath::new(ClientConfig::builder().build().unwrap()).unwrap();
        assert_eq!(client.products().path(), "products");
        assert_eq!(client.account_tags().path(), "account-tags");
        assert_eq!(client.customers().path(), "customers");
        assert_eq!(client.cart_with_id("c1").id(), "c1");
    }

    #[test]
    fn test_token_status_without_credentials() {
        let client = ElasticPath::new(
            ClientConfig::builder()
                .client_id(ClientId::new("abc").unwrap())
                .build()
                .unwrap(),
        )
        .unwrap();

        assert!(client.credentials().is_none());
        assert_eq!(client.token_status(), TokenStatus::Missing);
        assert!(client.is_token_invalid());
    }
}
