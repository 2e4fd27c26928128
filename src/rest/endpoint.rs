use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::relationships::{build_relationship_data, format_url_resource};
use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::query::{build_url, Filter, QueryParams};

/// CRUD facade for one API resource collection, such as `products`.
///
/// An endpoint holds no list state. Each list call starts a fresh
/// [`ListRequest`], so options set for one call never leak into the next.
///
/// # Example
///
/// ```rust,ignore
/// let products = client.products();
///
/// let live = products
///     .filter(Filter::new().eq("status", "live"))
///     .limit(10)
///     .all()
///     .await?;
///
/// // Runs without the filter or limit above.
/// let everything = products.all().await?;
/// ```
#[derive(Clone)]
pub struct Endpoint {
    client: Arc<HttpClient>,
    path: String,
    token: Option<String>,
    version: Option<String>,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("path", &self.path)
            .field("token", &self.token.as_ref().map(|_| "*****"))
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl Endpoint {
    /// Creates an endpoint for `path` relative to the versioned base URL.
    #[must_use]
    pub fn new(client: Arc<HttpClient>, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into().trim_matches('/').to_string(),
            token: None,
            version: None,
        }
    }

    /// Returns the resource path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the dispatcher this endpoint sends through.
    #[must_use]
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Uses `token` as the bearer token for every call instead of authenticating.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Overrides the API version path segment for every call.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Returns an endpoint for a sub-path, e.g. `products/{id}/variations`.
    #[must_use]
    pub fn child(&self, segment: impl fmt::Display) -> Self {
        Self {
            client: self.client.clone(),
            path: format!("{}/{}", self.path, segment.to_string().trim_matches('/')),
            token: self.token.clone(),
            version: self.version.clone(),
        }
    }

    /// Starts a list request with no options set.
    #[must_use]
    pub fn list(&self) -> ListRequest<'_> {
        ListRequest {
            endpoint: self,
            params: QueryParams::new(),
        }
    }

    /// Starts a list request with a page size.
    #[must_use]
    pub fn limit(&self, limit: u32) -> ListRequest<'_> {
        self.list().limit(limit)
    }

    /// Starts a list request with a page start.
    #[must_use]
    pub fn offset(&self, offset: u32) -> ListRequest<'_> {
        self.list().offset(offset)
    }

    /// Starts a list request with a sort expression.
    #[must_use]
    pub fn sort(&self, sort: impl Into<String>) -> ListRequest<'_> {
        self.list().sort(sort)
    }

    /// Starts a list request with a filter.
    #[must_use]
    pub fn filter(&self, filter: impl Into<Filter>) -> ListRequest<'_> {
        self.list().filter(filter)
    }

    /// Starts a list request including related resources.
    #[must_use]
    pub fn with<I, S>(&self, includes: I) -> ListRequest<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list().with(includes)
    }

    /// Starts a list request with a total count method.
    #[must_use]
    pub fn total_method(&self, method: impl Into<String>) -> ListRequest<'_> {
        self.list().total_method(method)
    }

    /// Lists the collection with no options.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn all(&self) -> Result<Value, HttpError> {
        self.list().all().await
    }

    /// Fetches one resource by ID.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn get(&self, id: impl fmt::Display) -> Result<Value, HttpError> {
        self.send(format!("{}/{id}", self.path), HttpMethod::Get, None)
            .await
    }

    /// Creates a resource. `body` is wrapped in `{"data": ...}`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn create(&self, body: Value) -> Result<Value, HttpError> {
        self.send(self.path.clone(), HttpMethod::Post, Some(body))
            .await
    }

    /// Updates a resource by ID. `body` is wrapped in `{"data": ...}`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn update(&self, id: impl fmt::Display, body: Value) -> Result<Value, HttpError> {
        self.send(format!("{}/{id}", self.path), HttpMethod::Put, Some(body))
            .await
    }

    /// Deletes a resource by ID.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn delete(&self, id: impl fmt::Display) -> Result<Value, HttpError> {
        self.send(format!("{}/{id}", self.path), HttpMethod::Delete, None)
            .await
    }

    /// Adds relationships of `resource_type` to the resource `id`.
    ///
    /// `ids` accepts anything [`build_relationship_data`] does.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn create_relationships(
        &self,
        id: impl fmt::Display,
        resource_type: &str,
        ids: &Value,
    ) -> Result<Value, HttpError> {
        self.relationships(HttpMethod::Post, id, resource_type, ids)
            .await
    }

    /// Replaces relationships of `resource_type` on the resource `id`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn update_relationships(
        &self,
        id: impl fmt::Display,
        resource_type: &str,
        ids: &Value,
    ) -> Result<Value, HttpError> {
        self.relationships(HttpMethod::Put, id, resource_type, ids)
            .await
    }

    /// Removes relationships of `resource_type` from the resource `id`.
    ///
    /// The relationship list is sent as a DELETE body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn delete_relationships(
        &self,
        id: impl fmt::Display,
        resource_type: &str,
        ids: &Value,
    ) -> Result<Value, HttpError> {
        self.relationships(HttpMethod::Delete, id, resource_type, ids)
            .await
    }

    async fn relationships(
        &self,
        method: HttpMethod,
        id: impl fmt::Display,
        resource_type: &str,
        ids: &Value,
    ) -> Result<Value, HttpError> {
        let path = format!(
            "{}/{id}/relationships/{}",
            self.path,
            format_url_resource(resource_type)
        );
        let body = Value::Array(build_relationship_data(resource_type, ids));
        self.send(path, method, Some(body)).await
    }

    /// Sends a request on this endpoint's token and version settings.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn send(
        &self,
        path: String,
        method: HttpMethod,
        body: Option<Value>,
    ) -> Result<Value, HttpError> {
        self.client.request(self.request(path, method, body)).await
    }

    pub(crate) fn request(&self, path: String, method: HttpMethod, body: Option<Value>) -> HttpRequest {
        let mut builder = HttpRequest::builder(method, path)
            .maybe_body(body)
            .token(self.token.clone());
        if let Some(version) = &self.version {
            builder = builder.version(version.clone());
        }
        builder.build()
    }
}

/// A single list call on an [`Endpoint`].
///
/// Options accumulate on the value and are consumed by [`ListRequest::all`].
#[derive(Debug)]
#[must_use = "a list request does nothing until `all()` is awaited"]
pub struct ListRequest<'a> {
    endpoint: &'a Endpoint,
    params: QueryParams,
}

impl ListRequest<'_> {
    /// Sets the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.params = self.params.limit(limit);
        self
    }

    /// Sets the page start.
    pub fn offset(mut self, offset: u32) -> Self {
        self.params = self.params.offset(offset);
        self
    }

    /// Sets the sort expression.
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.params = self.params.sort(sort);
        self
    }

    /// Sets the filter.
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.params = self.params.filter(filter.into());
        self
    }

    /// Adds related resources to include.
    pub fn with<I, S>(mut self, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = self.params.includes(includes);
        self
    }

    /// Sets the total count method.
    pub fn total_method(mut self, method: impl Into<String>) -> Self {
        self.params = self.params.total_method(method);
        self
    }

    /// Returns the path and query string this request will fetch.
    #[must_use]
    pub fn url(&self) -> String {
        build_url(&self.endpoint.path, &self.params)
    }

    /// Sends the list request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn all(self) -> Result<Value, HttpError> {
        let url = self.url();
        self.endpoint.send(url, HttpMethod::Get, None).await
    }
}
