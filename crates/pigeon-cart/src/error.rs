//! Cart error types.

use pigeon_commerce::CommerceError;
use pigeon_data::FetchError;
use thiserror::Error;

/// Errors surfaced by cart operations.
///
/// Retries have already been exhausted by the time a [`CartError::Fetch`]
/// reaches the caller.
#[derive(Error, Debug, Clone)]
pub enum CartError {
    /// The request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The change was rejected locally.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// An operation needs a cart that has not been loaded yet.
    #[error("Cart has not been loaded")]
    NotLoaded,

    /// The server answered with something the client cannot use.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl CartError {
    /// HTTP status of the final failed attempt, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the caller should correct the request rather than try again.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_client_error() && e.status() != Some(429),
            Self::Commerce(_) => true,
            _ => false,
        }
    }
}
