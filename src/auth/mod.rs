//! Authentication for the Elastic Path SDK.
//!
//! # Overview
//!
//! - [`Credentials`]: a bearer token, its expiry and the client it belongs to
//! - [`CredentialCache`]: reads and validates the stored credentials record
//! - [`Authenticator`]: returns cached credentials or requests a new token
//! - [`CustomAuthenticator`]: plug in an external token source
//!
//! # Token lifecycle
//!
//! Stored credentials are reused until one of these holds:
//!
//! - nothing is stored, or the record has no access token
//! - the record was issued for a different client ID
//! - the current time is at or past `expires`
//!
//! When that happens the next authenticated request fetches a new token and
//! overwrites the whole record.
//!
//! # Example
//!
//! ```rust,ignore
//! use elasticpath::{ClientConfig, ClientId, ElasticPath};
//!
//! let client = ElasticPath::new(
//!     ClientConfig::builder()
//!         .client_id(ClientId::new("my-client-id")?)
//!         .build()?,
//! )?;
//!
//! let credentials = client.authenticate()?.await?;
//! println!("token expires at {}", credentials.expires);
//! ```

mod authenticator;
mod credentials;
mod error;

pub use authenticator::{Authenticator, CustomAuthenticator, GrantType, PasswordCredentials};
pub use credentials::{CredentialCache, Credentials, TokenStatus};
pub use error::AuthError;
