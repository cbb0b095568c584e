//! Key-value store with automatic JSON serialization.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// File name used inside a state directory.
pub const STORE_FILE: &str = "store.json";

/// Type-safe key-value store.
///
/// Values are kept as JSON. A file-backed store writes the whole map through
/// to `<dir>/store.json` on every change; an in-memory store never touches
/// disk.
#[derive(Debug)]
pub struct Store {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl Store {
    /// Open (or create) the store in a state directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .map_err(|e| CacheError::OpenError(format!("{}: {}", dir.display(), e)))?;

        let path = dir.join(STORE_FILE);
        let entries = if path.exists() {
            let raw = fs::read(&path)
                .map_err(|e| CacheError::OpenError(format!("{}: {}", path.display(), e)))?;
            if raw.is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_slice(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    /// Create a store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a value from the store.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.lock().get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Set a value in the store.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let value = serde_json::to_value(value)?;
        let mut entries = self.lock();
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    /// Delete a value from the store.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    /// Check if a key exists in the store.
    pub fn exists(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Get all keys in the store, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, serde_json::Value>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, entries: &BTreeMap<String, serde_json::Value>) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        // Write then rename so a crash never leaves a truncated file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust
/// use pigeon_cache::cache_key;
///
/// let key = cache_key!("cart", "current");
/// assert_eq!(key, "cart:current");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let store = Store::in_memory();
        assert_eq!(store.get::<String>("theme-mode").unwrap(), None);

        store.set("theme-mode", &"dark").unwrap();
        assert!(store.exists("theme-mode"));
        assert_eq!(
            store.get::<String>("theme-mode").unwrap().as_deref(),
            Some("dark")
        );

        store.delete("theme-mode").unwrap();
        assert!(!store.exists("theme-mode"));
        assert!(store.path().is_none());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Store::open(dir.path()).unwrap();
            store.set("b", &2).unwrap();
            store.set("a", &1).unwrap();
        }
        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.get::<i32>("b").unwrap(), Some(2));
        assert!(dir.path().join(STORE_FILE).exists());
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let store = Store::in_memory();
        store.set("n", &"not a number").unwrap();
        assert!(store.get::<u32>("n").is_err());
    }

    #[test]
    fn test_cache_key_macro() {
        assert_eq!(cache_key!("cart", "current"), "cart:current");
        assert_eq!(cache_key!("quote", "c-1", 2), "quote:c-1:2");
    }
}
