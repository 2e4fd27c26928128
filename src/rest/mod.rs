//! Resource facades for the Elastic Path API.
//!
//! Facades are thin: each one supplies a resource path and a body shape and
//! hands the call to the [`HttpClient`](crate::clients::HttpClient).
//!
//! - [`Endpoint`]: list/get/create/update/delete and relationship calls for
//!   any resource collection
//! - [`ListRequest`]: a single list call with pagination, sort, filter and
//!   includes, consumed by [`ListRequest::all`]
//! - [`Cart`]: the shopper's cart, its items and checkout
//! - [`Customers`]: the customers collection plus customer token requests
//! - [`ApiResponse`]: typed, `Deref`-based view over a response envelope
//!
//! # Example
//!
//! ```rust,ignore
//! use elasticpath::query::Filter;
//!
//! let products = client.products();
//!
//! let page = products
//!     .with(["main_image"])
//!     .filter(Filter::new().eq("status", "live"))
//!     .limit(25)
//!     .all()
//!     .await?;
//!
//! let created = products
//!     .create(json!({"type": "product", "name": "Shirt", "slug": "shirt"}))
//!     .await?;
//!
//! products
//!     .create_relationships(created["data"]["id"].as_str().unwrap(), "category", &json!(["c1"]))
//!     .await?;
//! ```

mod cart;
mod customers;
mod endpoint;
mod relationships;
mod response;

pub use cart::{build_cart_checkout_data, build_cart_item_data, Cart, CartItemType, CheckoutContact};
pub use customers::Customers;
pub use endpoint::{Endpoint, ListRequest};
pub use relationships::{build_relationship_data, format_url_resource, underscore};
pub use response::ApiResponse;
