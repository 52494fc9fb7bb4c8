//! HTTP record source backed by reqwest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::RecordSource;
use super::parse_payload;
use crate::error::FetchError;
use crate::model::Record;
use crate::query::Query;

/// Fetches records from a JSON endpoint with a GET request.
///
/// Cheap to clone; the HTTP client is shared.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use datagrid_lib::source::HttpSource;
///
/// let source = HttpSource::builder()
///     .endpoint("https://jsonplaceholder.typicode.com/users")
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct HttpSource {
    inner: Arc<HttpSourceInner>,
}

#[derive(Debug)]
struct HttpSourceInner {
    endpoint: Url,
    http_client: Client,
    timeout: Option<Duration>,
}

impl HttpSource {
    /// Creates a source for an endpoint with default settings.
    pub fn new(endpoint: &str) -> Result<Self, FetchError> {
        Self::builder().endpoint(endpoint).build()
    }

    /// Creates a new builder for constructing a source.
    pub fn builder() -> HttpSourceBuilder<Missing> {
        HttpSourceBuilder::new()
    }

    /// Returns the endpoint URL without query parameters added.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Builds the request URL for a query.
    ///
    /// Parameters are form-encoded and appended after any query the
    /// endpoint already carries.
    pub fn request_url(&self, query: &Query) -> Url {
        let mut url = self.inner.endpoint.clone();
        let params = query.params();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        url
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch_records(&self, query: &Query) -> Result<Vec<Record>, FetchError> {
        let url = self.request_url(query);
        log::debug!("GET {}", url);

        let mut request = self.inner.http_client.get(url);
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        if !status.is_success() {
            return Err(FetchError::http(status.as_u16(), body));
        }

        let payload = serde_json::from_str(&body)
            .map_err(|e| FetchError::parse_with_body(e.to_string(), body))?;
        parse_payload(payload)
    }
}

impl HttpSource {
    fn map_error(&self, error: reqwest::Error) -> FetchError {
        match self.inner.timeout {
            Some(timeout) if error.is_timeout() => FetchError::Timeout(timeout),
            _ => FetchError::Network(error),
        }
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`HttpSource`].
///
/// The endpoint is required and enforced at compile time.
pub struct HttpSourceBuilder<Endpoint> {
    endpoint: Endpoint,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl HttpSourceBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            endpoint: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the endpoint URL.
    pub fn endpoint(self, endpoint: impl Into<String>) -> HttpSourceBuilder<Set<String>> {
        HttpSourceBuilder {
            endpoint: Set(endpoint.into()),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for HttpSourceBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> HttpSourceBuilder<E> {
    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// Only applied when the builder creates the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl HttpSourceBuilder<Set<String>> {
    /// Builds the [`HttpSource`].
    ///
    /// Fails if the endpoint is not an absolute URL or the HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<HttpSource, FetchError> {
        let endpoint = Url::parse(&self.endpoint.0)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.endpoint.0, e)))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(HttpSource {
            inner: Arc::new(HttpSourceInner {
                endpoint,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}
