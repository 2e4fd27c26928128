use super::Filter;

/// List options rendered into a request's query string.
///
/// Parameters are emitted in a fixed order: `include`, `sort`,
/// `page[limit]`, `page[offset]`, `filter`, `total_method`. Unset parameters
/// are omitted, as is an offset of zero.
///
/// # Example
///
/// ```rust
/// use elasticpath::query::{build_url, Filter, QueryParams};
///
/// let params = QueryParams::new()
///     .limit(20)
///     .offset(100)
///     .filter(Filter::new().eq("status", "live"));
///
/// assert_eq!(
///     build_url("products", &params),
///     "products?page[limit]=20&page[offset]=100&filter=eq(status,live)"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// Page size.
    pub limit: Option<u32>,
    /// Page start.
    pub offset: Option<u32>,
    /// Sort expression, e.g. `-created_at`.
    pub sort: Option<String>,
    /// Filter expression.
    pub filter: Option<Filter>,
    /// Related resources to include.
    pub includes: Vec<String>,
    /// How the total count is computed, e.g. `lower_bound`.
    pub total_method: Option<String>,
}

impl QueryParams {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the page start.
    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the sort expression.
    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Sets the filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Adds related resources to include.
    #[must_use]
    pub fn includes<I, S>(mut self, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(includes.into_iter().map(Into::into));
        self
    }

    /// Sets the total count method.
    #[must_use]
    pub fn total_method(mut self, method: impl Into<String>) -> Self {
        self.total_method = Some(method.into());
        self
    }

    /// Renders the parameters without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();

        if !self.includes.is_empty() {
            parts.push(format!("include={}", self.includes.join(",")));
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("sort={sort}"));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("page[limit]={limit}"));
        }
        if let Some(offset) = self.offset.filter(|&o| o > 0) {
            parts.push(format!("page[offset]={offset}"));
        }
        if let Some(filter) = self.filter.as_ref().filter(|f| !f.is_empty()) {
            parts.push(format!("filter={filter}"));
        }
        if let Some(method) = self.total_method.as_deref().filter(|m| !m.is_empty()) {
            parts.push(format!("total_method={method}"));
        }

        parts.join("&")
    }

    /// Returns `true` if no parameter would be rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_query_string().is_empty()
    }
}

/// Appends the query string for `params` to `endpoint`.
#[must_use]
pub fn build_url(endpoint: &str, params: &QueryParams) -> String {
    let query = params.to_query_string();
    if query.is_empty() {
        endpoint.to_string()
    } else {
        format!("{endpoint}?{query}")
    }
}
