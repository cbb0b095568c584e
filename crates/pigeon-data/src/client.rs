//! HTTP client with base URL, default headers and retries.

use crate::executor::RetryExecutor;
use crate::request::{Method, RequestBuilder};
use crate::response::Response;
use crate::retry::{RetryConfig, RetryOverride};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::{FetchError, CORRELATION_ID_HEADER};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;

/// Generate a random token for the `X-Correlation-ID` header.
pub fn correlation_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// HTTP client for making outbound requests.
///
/// Every call is routed through a [`RetryExecutor`] using the request's
/// method, and carries a fresh correlation id.
#[derive(Clone)]
pub struct FetchClient {
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    transport: Arc<dyn HttpTransport>,
    executor: RetryExecutor,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    /// Create a client over `reqwest` with the default retry policy.
    pub fn new() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new()))
    }

    /// Create a client over any transport.
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: None,
            default_headers: HashMap::new(),
            transport,
            executor: RetryExecutor::default(),
        }
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Replace the base retry policy.
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.executor = RetryExecutor::new(config);
        self
    }

    /// The base retry policy.
    pub fn retry_config(&self) -> &RetryConfig {
        self.executor.config()
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Put, url)
    }

    /// Create a PATCH request.
    pub fn patch(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Patch, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url,
        };

        let builder = RequestBuilder::new(method, full_url).headers(self.default_headers.clone());

        ClientRequestBuilder {
            client: self,
            builder,
            overrides: RetryOverride::default(),
        }
    }

    /// Send a prepared request through the retry executor.
    ///
    /// Non-2xx responses become [`FetchError::Http`]. All attempts of one
    /// call share a correlation id.
    pub async fn send(
        &self,
        request: RequestBuilder,
        overrides: &RetryOverride,
    ) -> Result<Response, FetchError> {
        let request = request.header(CORRELATION_ID_HEADER, correlation_id());
        let method = request.method;

        tracing::debug!(method = %method, url = %request.url, "Sending request");

        self.executor
            .execute_with(method, overrides, || {
                let transport = Arc::clone(&self.transport);
                let request = request.clone();
                async move { transport.send(request).await?.error_for_status() }
            })
            .await
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder<'a> {
    client: &'a FetchClient,
    builder: RequestBuilder,
    overrides: RetryOverride,
}

impl ClientRequestBuilder<'_> {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Send `If-Match` when a concurrency token is known.
    pub fn if_match(mut self, etag: Option<&str>) -> Self {
        if let Some(etag) = etag {
            self.builder = self.builder.if_match(etag);
        }
        self
    }

    /// Override the retry policy for this call only.
    pub fn retry(mut self, overrides: RetryOverride) -> Self {
        self.overrides = overrides;
        self
    }

    /// Send the request and return the successful response.
    pub async fn send(self) -> Result<Response, FetchError> {
        self.client.send(self.builder, &self.overrides).await
    }
}
