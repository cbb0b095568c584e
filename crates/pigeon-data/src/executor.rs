//! Retrying request executor.

use crate::request::Method;
use crate::retry::{parse_retry_after, RetryConfig, RetryOverride};
use crate::FetchError;
use std::future::Future;
use std::time::Duration;

/// Runs a request with the retry policy appropriate for its method.
///
/// Attempts are strictly sequential. Callers only ever see the final
/// outcome: the first success, or the last error once the policy gives up.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create an executor with the given base policy.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The base policy.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `request_fn` under the base policy.
    pub async fn execute<T, F, Fut>(&self, method: Method, request_fn: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        self.execute_with(method, &RetryOverride::default(), request_fn)
            .await
    }

    /// Run `request_fn` with per-call overrides applied to the base policy.
    pub async fn execute_with<T, F, Fut>(
        &self,
        method: Method,
        overrides: &RetryOverride,
        mut request_fn: F,
    ) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let config = self.config.merged(overrides);
        let mut attempt = 0u32;

        loop {
            let err = match request_fn().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let Some(delay) = retry_delay(&config, method, &err, attempt) else {
                return Err(err);
            };

            tracing::warn!(
                method = %method,
                attempt = attempt + 1,
                max_retries = config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// How long to wait before retrying, or `None` to give up.
fn retry_delay(
    config: &RetryConfig,
    method: Method,
    err: &FetchError,
    attempt: u32,
) -> Option<Duration> {
    if !method.is_idempotent() || attempt >= config.max_retries {
        return None;
    }

    match err.status() {
        // Rate limited: only the server's hint is honored.
        Some(429) => parse_retry_after(err.retry_after()),
        Some(status) if config.is_retryable_status(status) => Some(config.backoff_delay(attempt)),
        Some(_) => None,
        None if err.is_network() => Some(config.backoff_delay(attempt)),
        None => None,
    }
}
