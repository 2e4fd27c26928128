//! # Elastic Path Rust SDK
//!
//! A Rust SDK for the Elastic Path Commerce Cloud API, providing type-safe
//! configuration, token management and a rate-limit aware request dispatcher.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Validated newtypes for credentials and the API host
//! - Implicit, client-credentials and password token grants, cached in a
//!   pluggable [`Storage`]
//! - Async request dispatch with 429 retry, linear backoff and jitter
//! - An optional FIFO throttle gate for outgoing requests
//! - A filter encoder for the Elastic Path filter grammar
//! - Endpoint facades with a per-call query builder, carts and customer tokens
//!
//! ## Quick Start
//!
//! ```rust
//! use elasticpath::{ClientConfig, ClientId, ElasticPath};
//!
//! let config = ClientConfig::builder()
//!     .client_id(ClientId::new("your-client-id").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let client = ElasticPath::new(config).unwrap();
//! assert!(client.cart_id().is_some());
//! ```
//!
//! ## Listing Resources
//!
//! ```rust,ignore
//! use elasticpath::query::Filter;
//!
//! let products = client
//!     .products()
//!     .with(["main_image"])
//!     .filter(Filter::new().eq("status", "live").gt("stock", 0))
//!     .sort("-created_at")
//!     .limit(25)
//!     .all()
//!     .await?;
//! ```
//!
//! ## Client Credentials
//!
//! Configuring a secret switches token requests to the `client_credentials`
//! grant:
//!
//! ```rust,ignore
//! use elasticpath::{ClientConfig, ClientId, ClientSecret, ElasticPath};
//!
//! let client = ElasticPath::new(
//!     ClientConfig::builder()
//!         .client_id(ClientId::new("your-client-id")?)
//!         .client_secret(ClientSecret::new("your-secret")?)
//!         .name("admin")
//!         .build()?,
//! )?;
//!
//! let credentials = client.authenticate()?.await?;
//! println!("Token expires at {}", credentials.expires);
//! ```
//!
//! ## Persistent State
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use elasticpath::{ClientConfig, ClientId, LocalStorage};
//!
//! let config = ClientConfig::builder()
//!     .client_id(ClientId::new("your-client-id")?)
//!     .storage(Arc::new(LocalStorage::open("elasticpath.json")?))
//!     .build()?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration and storage are passed explicitly
//! - **Fail-fast validation**: newtypes and the builder validate on construction
//! - **Thread-safe**: clients are `Send + Sync` and cheap to clone
//! - **Async-first**: designed for use with the Tokio runtime
//! - **Stateless endpoints**: list options live on a per-call request value

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod query;
pub mod rest;
pub mod storage;

mod client;

// Re-export public types at crate root for convenience
pub use client::ElasticPath;
pub use config::{
    ClientConfig, ClientConfigBuilder, ClientId, ClientSecret, Host, RetryConfig, ThrottleConfig,
};
pub use error::ConfigError;

pub use auth::{AuthError, Credentials, CustomAuthenticator, GrantType, TokenStatus};

// Re-export HTTP client types
pub use clients::{
    Fetch, FetchRequest, FetchResponse, HttpClient, HttpError, HttpMethod, HttpRequest,
    HttpResponseError, MaxHttpRetriesExceededError, TransportError,
};

pub use query::{Filter, FilterValue, QueryParams};
pub use rest::{ApiResponse, Cart, Customers, Endpoint};
pub use storage::{LocalStorage, MemoryStorage, Storage, StorageError};
