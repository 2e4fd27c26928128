use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::Endpoint;
use crate::clients::{HttpClient, HttpError, HttpMethod};

/// Kind of line item added to a cart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CartItemType {
    /// A product line, addressed by product ID or SKU.
    CartItem,
    /// A promotion code.
    PromotionItem,
    /// A free-form custom line.
    CustomItem,
}

impl CartItemType {
    /// Returns the `type` value sent to the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CartItem => "cart_item",
            Self::PromotionItem => "promotion_item",
            Self::CustomItem => "custom_item",
        }
    }
}

/// Builds a cart item payload.
///
/// `extra` fields (custom flow data, for example) are merged first so the
/// item fields always win.
///
/// ```rust
/// use elasticpath::rest::{build_cart_item_data, CartItemType};
/// use serde_json::json;
///
/// assert_eq!(
///     build_cart_item_data("p1", 2, CartItemType::CartItem, None, false),
///     json!({"type": "cart_item", "id": "p1", "quantity": 2})
/// );
/// assert_eq!(
///     build_cart_item_data("SUMMER", 0, CartItemType::PromotionItem, None, false),
///     json!({"type": "promotion_item", "code": "SUMMER"})
/// );
/// ```
#[must_use]
pub fn build_cart_item_data(
    id: &str,
    quantity: u32,
    item_type: CartItemType,
    extra: Option<&Map<String, Value>>,
    is_sku: bool,
) -> Value {
    let mut payload = Map::new();
    payload.insert("type".to_string(), json!(item_type.as_str()));
    if let Some(extra) = extra {
        payload.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    match item_type {
        CartItemType::CartItem => {
            let key = if is_sku { "sku" } else { "id" };
            payload.insert(key.to_string(), json!(id));
            payload.insert("quantity".to_string(), json!(quantity));
        }
        CartItemType::PromotionItem => {
            payload.insert("code".to_string(), json!(id));
        }
        CartItemType::CustomItem => {}
    }

    Value::Object(payload)
}

/// Who is checking out a cart.
#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutContact {
    /// An existing customer, by ID.
    CustomerId(String),
    /// Guest customer details such as `{"name": ..., "email": ...}`.
    Customer(Value),
    /// An account member checking out for an account.
    AccountMember(Value),
}

/// Builds a checkout payload.
///
/// Customers are sent under `customer`; account members under `contact`.
#[must_use]
pub fn build_cart_checkout_data(contact: CheckoutContact, billing_address: Value, shipping_address: Value) -> Value {
    let mut data = Map::new();
    data.insert("billing_address".to_string(), billing_address);
    data.insert("shipping_address".to_string(), shipping_address);

    match contact {
        CheckoutContact::CustomerId(id) => {
            data.insert("customer".to_string(), json!({ "id": id }));
        }
        CheckoutContact::Customer(customer) => {
            data.insert("customer".to_string(), customer);
        }
        CheckoutContact::AccountMember(member) => {
            data.insert("contact".to_string(), member);
        }
    }

    Value::Object(data)
}

/// Facade for one shopper cart.
#[derive(Clone)]
pub struct Cart {
    endpoint: Endpoint,
    id: String,
}

impl fmt::Debug for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart").field("id", &self.id).finish()
    }
}

impl Cart {
    /// Creates a facade for the cart `id`.
    #[must_use]
    pub fn new(client: Arc<HttpClient>, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            endpoint: Endpoint::new(client, format!("carts/{id}")),
            id,
        }
    }

    /// Returns the cart ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fetches the cart.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn get(&self) -> Result<Value, HttpError> {
        self.send("", HttpMethod::Get, None).await
    }

    /// Updates cart attributes such as `name` or `description`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn update(&self, body: Value) -> Result<Value, HttpError> {
        self.send("", HttpMethod::Put, Some(body)).await
    }

    /// Fetches the cart's items.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn items(&self) -> Result<Value, HttpError> {
        self.send("/items", HttpMethod::Get, None).await
    }

    /// Adds `quantity` of a product.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn add_product(&self, product_id: &str, quantity: u32) -> Result<Value, HttpError> {
        let item = build_cart_item_data(product_id, quantity, CartItemType::CartItem, None, false);
        self.send("/items", HttpMethod::Post, Some(item)).await
    }

    /// Adds `quantity` of a product by SKU.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn add_sku(&self, sku: &str, quantity: u32) -> Result<Value, HttpError> {
        let item = build_cart_item_data(sku, quantity, CartItemType::CartItem, None, true);
        self.send("/items", HttpMethod::Post, Some(item)).await
    }

    /// Applies a promotion code.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn add_promotion(&self, code: &str) -> Result<Value, HttpError> {
        let item = build_cart_item_data(code, 0, CartItemType::PromotionItem, None, false);
        self.send("/items", HttpMethod::Post, Some(item)).await
    }

    /// Adds a custom line item. `item` is sent with `type: custom_item`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn add_custom_item(&self, item: Map<String, Value>) -> Result<Value, HttpError> {
        let item = build_cart_item_data("", 0, CartItemType::CustomItem, Some(&item), false);
        self.send("/items", HttpMethod::Post, Some(item)).await
    }

    /// Sets the quantity of an existing line item.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn update_item(&self, item_id: &str, quantity: u32) -> Result<Value, HttpError> {
        let item = build_cart_item_data(item_id, quantity, CartItemType::CartItem, None, false);
        self.send(&format!("/items/{item_id}"), HttpMethod::Put, Some(item))
            .await
    }

    /// Removes a line item.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn remove_item(&self, item_id: &str) -> Result<Value, HttpError> {
        self.send(&format!("/items/{item_id}"), HttpMethod::Delete, None)
            .await
    }

    /// Removes every line item.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn remove_all_items(&self) -> Result<Value, HttpError> {
        self.send("/items", HttpMethod::Delete, None).await
    }

    /// Converts the cart into an order.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn checkout(
        &self,
        contact: CheckoutContact,
        billing_address: Value,
        shipping_address: Value,
    ) -> Result<Value, HttpError> {
        let body = build_cart_checkout_data(contact, billing_address, shipping_address);
        self.send("/checkout", HttpMethod::Post, Some(body)).await
    }

    /// Deletes the cart.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn delete(&self) -> Result<Value, HttpError> {
        self.send("", HttpMethod::Delete, None).await
    }

    async fn send(&self, suffix: &str, method: HttpMethod, body: Option<Value>) -> Result<Value, HttpError> {
        self.endpoint
            .send(format!("{}{suffix}", self.endpoint.path()), method, body)
            .await
    }
}
