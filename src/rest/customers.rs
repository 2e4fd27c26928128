use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use serde_json::{json, Value};

use super::Endpoint;
use crate::clients::{HttpClient, HttpError, HttpMethod};

/// The `customers` endpoint, with customer token requests.
///
/// Derefs to [`Endpoint`] for the usual CRUD calls.
#[derive(Clone, Debug)]
pub struct Customers {
    endpoint: Endpoint,
}

impl Customers {
    /// Creates the facade.
    #[must_use]
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self {
            endpoint: Endpoint::new(client, "customers"),
        }
    }

    /// Uses `token` as the bearer token for every call instead of authenticating.
    #[must_use]
    pub fn with_token(self, token: impl Into<String>) -> Self {
        Self {
            endpoint: self.endpoint.with_token(token),
        }
    }

    /// Exchanges an email and password for a customer token.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn token_via_password(
        &self,
        email: &str,
        password: &str,
        headers: HashMap<String, String>,
    ) -> Result<Value, HttpError> {
        let body = json!({
            "type": "token",
            "authentication_mechanism": "password",
            "email": email,
            "password": password,
        });
        self.send_token(body, headers).await
    }

    /// Exchanges an OpenID Connect authorization code for a customer token.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn token_via_oidc(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
        headers: HashMap<String, String>,
    ) -> Result<Value, HttpError> {
        let body = json!({
            "type": "token",
            "authentication_mechanism": "oidc",
            "oauth_authorization_code": code,
            "oauth_redirect_uri": redirect_uri,
            "oauth_code_verifier": code_verifier,
        });
        self.send_token(body, headers).await
    }

    async fn send_token(&self, body: Value, headers: HashMap<String, String>) -> Result<Value, HttpError> {
        let mut request = self.endpoint.request(
            format!("{}/tokens", self.endpoint.path()),
            HttpMethod::Post,
            Some(body),
        );
        request.extra_headers.extend(headers);
        self.endpoint.client().request(request).await
    }
}

impl Deref for Customers {
    type Target = Endpoint;

    fn deref(&self) -> &Self::Target {
        &self.endpoint
    }
}
