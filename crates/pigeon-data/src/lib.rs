//! HTTP client utilities for Pigeon.
//!
//! Requests are plain data ([`RequestBuilder`]) sent through an
//! [`HttpTransport`]. [`FetchClient`] adds a base URL, default headers and a
//! fresh `X-Correlation-ID` per call, and routes every call through a
//! [`RetryExecutor`]:
//!
//! - `GET`, `PUT` and `DELETE` are retried on 500/502/503/504 and network
//!   failures with jittered exponential backoff
//! - 429 is retried only when `Retry-After` can be parsed, waiting exactly
//!   that long
//! - everything else fails on the first error
//!
//! # Example
//!
//! ```rust,no_run
//! use pigeon_data::{FetchClient, RetryConfig};
//!
//! # async fn run() -> Result<(), pigeon_data::FetchError> {
//! let client = FetchClient::new()
//!     .with_base_url("https://shop.example/api")
//!     .with_retry_config(RetryConfig::default());
//!
//! let response = client.get("/cart").send().await?;
//! println!("etag: {:?}", response.etag());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod executor;
mod request;
mod response;
mod retry;
mod transport;

pub use client::{correlation_id, ClientRequestBuilder, FetchClient};
pub use error::{FetchError, ProblemDetail};
pub use executor::RetryExecutor;
pub use request::{Method, RequestBuilder};
pub use response::Response;
pub use retry::{
    parse_retry_after, parse_retry_after_at, RetryConfig, RetryOverride, DEFAULT_BASE_DELAY_MS,
    DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RETRIES, DEFAULT_RETRYABLE_STATUS_CODES,
};
pub use transport::{HttpTransport, MockTransport, ReqwestTransport};

/// Header carrying the per-call tracing token.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        FetchClient, FetchError, HttpTransport, Method, Response, RetryConfig, RetryExecutor,
        RetryOverride,
    };
}
