//! Client-side state for Pigeon.
//!
//! - [`QueryCache`]: keyed query results with snapshots, cancel-then-mutate
//!   generations and background refetch
//! - [`Store`]: JSON key-value store, file-backed or in memory
//! - [`Settings`]: observable preferences persisted in a [`Store`]
//!
//! # Example
//!
//! ```rust
//! use pigeon_cache::{cache_key, QueryCache};
//!
//! let cache: QueryCache<u32> = QueryCache::new();
//! let key = cache_key!("cart", "current");
//!
//! cache.set(&key, 1);
//! let snapshot = cache.snapshot(&key);
//! cache.update(&key, |v| *v += 1);
//! cache.restore(&key, snapshot);
//! assert_eq!(cache.get(&key), Some(1));
//! ```

mod error;
mod kv;
mod query;
mod settings;

pub use error::CacheError;
pub use kv::{Store, STORE_FILE};
pub use query::{CacheStatus, QueryCache, Snapshot};
pub use settings::{Settings, ThemeMode, THEME_MODE_KEY};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{CacheError, CacheStatus, QueryCache, Settings, Snapshot, Store, ThemeMode};
}
