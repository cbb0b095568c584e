//! Cache error types.

use thiserror::Error;

/// Errors that can occur when using the cache or the key-value store.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// Failed to serialize value.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to perform store operation.
    #[error("Store operation failed: {0}")]
    StoreError(#[from] std::io::Error),

    /// A stored value could not be understood.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Store key.
        key: String,
        /// Raw stored value.
        value: String,
    },
}
