//! Transport seam between the client and the network.

use crate::request::RequestBuilder;
use crate::response::Response;
use crate::FetchError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Sends a single request and returns whatever the server answered.
///
/// Implementations report non-2xx responses as `Ok`; status handling and
/// retries happen above this layer.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one attempt.
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError>;
}

/// Transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with reqwest defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport with a per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Connection(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_builder() {
        FetchError::InvalidUrl(e.to_string())
    } else {
        FetchError::Connection(e.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.as_str());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(Response::new(status, headers, body.to_vec()))
    }
}

/// Scripted transport (for development/testing).
///
/// Answers with queued responses in order and records every request it
/// receives. An empty queue answers `204 No Content`.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Response, FetchError>>>,
    requests: Mutex<Vec<RequestBuilder>>,
}

impl MockTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw outcome.
    pub fn push(&self, outcome: Result<Response, FetchError>) -> &Self {
        self.lock_responses().push_back(outcome);
        self
    }

    /// Queue a response with a status and no body.
    pub fn push_status(&self, status: u16) -> &Self {
        self.push(Ok(Response::new(status, HashMap::new(), Vec::new())))
    }

    /// Queue a response with a JSON body.
    pub fn push_json(&self, status: u16, body: &serde_json::Value) -> &Self {
        let headers = HashMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]);
        self.push(Ok(Response::new(status, headers, body.to_string().into_bytes())))
    }

    /// Queue a fully specified response.
    pub fn push_response(&self, response: Response) -> &Self {
        self.push(Ok(response))
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RequestBuilder> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<Response, FetchError>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
        self.lock_responses()
            .pop_front()
            .unwrap_or_else(|| Ok(Response::new(204, HashMap::new(), Vec::new())))
    }
}
