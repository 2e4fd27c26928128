//! Typed view over the API's response envelope.
//!
//! Endpoint calls return raw JSON. [`ApiResponse<T>`] deserializes the
//! `{ data, meta?, links?, included? }` envelope into a concrete type and
//! implements `Deref<Target = T>` for ergonomic access to `data`:
//!
//! ```rust
//! use elasticpath::rest::ApiResponse;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize)]
//! struct Product {
//!     id: String,
//! }
//!
//! let body = json!({
//!     "data": [{"id": "p1"}, {"id": "p2"}],
//!     "meta": {"results": {"total": 2}}
//! });
//! let response: ApiResponse<Vec<Product>> = ApiResponse::from_value(body).unwrap();
//!
//! assert_eq!(response.len(), 2);
//! assert_eq!(response[0].id, "p1");
//! assert_eq!(response.total(), Some(2));
//! ```

use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// A deserialized response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    data: T,
    #[serde(default)]
    meta: Option<Value>,
    #[serde(default)]
    links: Option<Value>,
    #[serde(default)]
    included: Option<Value>,
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Deserializes an envelope from a response body.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is missing or does not match `T`.
    pub fn from_value(body: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(body)
    }
}

impl<T> ApiResponse<T> {
    /// Consumes the response and returns `data`.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Returns the `meta` object, if present.
    #[must_use]
    pub const fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    /// Returns the `links` object, if present.
    #[must_use]
    pub const fn links(&self) -> Option<&Value> {
        self.links.as_ref()
    }

    /// Returns the `included` object, if present.
    #[must_use]
    pub const fn included(&self) -> Option<&Value> {
        self.included.as_ref()
    }

    /// Returns `meta.results.total`, if present.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.meta
            .as_ref()?
            .pointer("/results/total")
            .and_then(Value::as_u64)
    }

    /// Returns the `links.next` URL, if present.
    #[must_use]
    pub fn next_link(&self) -> Option<&str> {
        self.links.as_ref()?.get("next").and_then(Value::as_str)
    }
}

impl<T> Deref for ApiResponse<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for ApiResponse<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}
