//! HTTP response handling.

use crate::error::ProblemDetail;
use crate::FetchError;
use http::header::{CONTENT_TYPE, ETAG, LOCATION, RETRY_AFTER};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: HashMap<String, String>,
    /// The response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, FetchError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| FetchError::Parse(format!("Invalid UTF-8: {}", e)))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::Parse(e.to_string()))
    }

    /// Get a header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Get the ETag header.
    pub fn etag(&self) -> Option<&str> {
        self.header(ETAG.as_str())
    }

    /// Get the Location header.
    pub fn location(&self) -> Option<&str> {
        self.header(LOCATION.as_str())
    }

    /// Parse the body as a problem detail, if it looks like one.
    pub fn problem(&self) -> Option<ProblemDetail> {
        if self.body.is_empty() {
            return None;
        }
        let problem: ProblemDetail = serde_json::from_slice(&self.body).ok()?;
        if problem.title.is_none() && problem.detail.is_none() && problem.problem_type.is_none() {
            return None;
        }
        Some(problem)
    }

    /// Convert to a Result, returning an error for non-2xx status codes.
    ///
    /// The error keeps the raw `Retry-After` header and any problem body so
    /// callers can decide how to react.
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            return Ok(self);
        }
        let problem = self.problem();
        let message = match problem.as_ref().and_then(|p| p.summary()) {
            Some(summary) => summary.to_string(),
            None => match self.text() {
                Ok(text) if !text.trim().is_empty() => text,
                _ => "Unknown error".to_string(),
            },
        };
        Err(FetchError::Http {
            status: self.status,
            message,
            retry_after: self.header(RETRY_AFTER.as_str()).map(str::to_string),
            problem: problem.map(Box::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(status: u16, body: &[u8]) -> Response {
        Response::new(status, HashMap::new(), body.to_vec())
    }

    fn make_response_with_headers(
        status: u16,
        headers: Vec<(&str, &str)>,
        body: &[u8],
    ) -> Response {
        let headers: HashMap<String, String> = headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Response::new(status, headers, body.to_vec())
    }

    #[test]
    fn test_response_is_success() {
        assert!(make_response(200, b"").is_success());
        assert!(make_response(201, b"").is_success());
        assert!(make_response(204, b"").is_success());
        assert!(!make_response(304, b"").is_success());
        assert!(!make_response(429, b"").is_success());
    }

    #[test]
    fn test_response_text_invalid_utf8() {
        let resp = make_response(200, &[0xff, 0xfe]);
        assert!(resp.text().is_err());
    }

    #[test]
    fn test_response_header_case_insensitive() {
        let resp = make_response_with_headers(200, vec![("etag", "\"abc\"")], b"");
        assert_eq!(resp.etag(), Some("\"abc\""));
        assert_eq!(resp.header("ETAG"), Some("\"abc\""));
        assert_eq!(resp.location(), None);
    }

    #[test]
    fn test_error_for_status_keeps_retry_after() {
        let resp = make_response_with_headers(429, vec![("Retry-After", "2")], b"");
        let err = resp.error_for_status().unwrap_err();
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.retry_after(), Some("2"));
        assert!(err.problem().is_none());
    }

    #[test]
    fn test_error_for_status_parses_problem() {
        let body = br#"{"type":"about:blank","title":"Conflict","status":409,"detail":"Cart was modified"}"#;
        let resp = make_response_with_headers(
            409,
            vec![("Content-Type", "application/problem+json")],
            body,
        );
        let err = resp.error_for_status().unwrap_err();
        assert_eq!(err.to_string(), "HTTP 409: Cart was modified");
        assert_eq!(err.problem().and_then(|p| p.title.as_deref()), Some("Conflict"));
    }

    #[test]
    fn test_error_for_status_plain_body() {
        let err = make_response(502, b"Bad Gateway").error_for_status().unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");

        let err = make_response(500, b"").error_for_status().unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500: Unknown error");
    }

    #[test]
    fn test_arbitrary_json_is_not_a_problem() {
        let resp = make_response(400, br#"{"foo": 1}"#);
        assert!(resp.problem().is_none());
    }
}
