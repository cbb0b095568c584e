//! HTTP client error types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured problem body returned by the cart API on errors
/// (`application/problem+json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetail {
    /// Problem type URI.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// HTTP status echoed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Human-readable explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// URI of the failing request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Extension members (e.g., per-field validation errors).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, serde_json::Value>,
}

impl ProblemDetail {
    /// Best available one-line description.
    pub fn summary(&self) -> Option<&str> {
        self.detail.as_deref().or(self.title.as_deref())
    }
}

/// Errors that can occur when making HTTP requests.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// Non-2xx response.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code.
        status: u16,
        /// Problem summary or raw body.
        message: String,
        /// Raw `Retry-After` header, if the server sent one.
        retry_after: Option<String>,
        /// Parsed problem body, if the server sent one.
        problem: Option<Box<ProblemDetail>>,
    },

    /// The request never produced a response (DNS, refused, reset).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The transport gave up waiting.
    #[error("Request timed out")]
    Timeout,

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl FetchError {
    /// HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw `Retry-After` header value from the failed response.
    pub fn retry_after(&self) -> Option<&str> {
        match self {
            Self::Http { retry_after, .. } => retry_after.as_deref(),
            _ => None,
        }
    }

    /// Problem body from the failed response.
    pub fn problem(&self) -> Option<&ProblemDetail> {
        match self {
            Self::Http { problem, .. } => problem.as_deref(),
            _ => None,
        }
    }

    /// Whether the failure happened below HTTP (no status code).
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }

    /// Whether the server rejected the request as invalid (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Json(e.to_string())
    }
}
