//! Keyed in-memory query cache with snapshots and background refetch.
//!
//! Each key holds at most one value and at most one in-flight refetch.
//! Every entry carries a generation counter: a refetch remembers the
//! generation it started under and only writes its result if that
//! generation is still current. [`QueryCache::cancel_refetch`] bumps the
//! generation, so a refetch that was already past the network call when it
//! got cancelled still cannot overwrite a newer speculative value.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// State of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Value reflects the last successful write or fetch.
    Fresh,
    /// A background refetch is in flight.
    Fetching,
    /// Value was invalidated and no refetch is running.
    Stale,
    /// The last refetch failed; the previous value is kept.
    Failed,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => write!(f, "FRESH"),
            Self::Fetching => write!(f, "FETCHING"),
            Self::Stale => write!(f, "STALE"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Point-in-time copy of an entry, consumed by [`QueryCache::restore`].
#[derive(Debug, Clone)]
pub struct Snapshot<V> {
    value: Option<V>,
    status: Option<CacheStatus>,
}

impl<V> Snapshot<V> {
    /// The captured value.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }
}

struct Entry<V> {
    value: Option<V>,
    status: CacheStatus,
    generation: u64,
    error: Option<String>,
    task: Option<JoinHandle<()>>,
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            value: None,
            status: CacheStatus::Stale,
            generation: 0,
            error: None,
            task: None,
        }
    }
}

impl<V> Entry<V> {
    /// Fence out and abort the in-flight refetch. Returns whether one was running.
    fn cancel(&mut self) -> bool {
        self.generation += 1;
        let running = match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        };
        if self.status == CacheStatus::Fetching {
            self.status = CacheStatus::Stale;
        }
        running
    }
}

/// Keyed cache of query results.
///
/// Cloning is cheap; clones share the same entries. All writes are atomic
/// per key. Locks are never held across an `.await`.
pub struct QueryCache<V> {
    entries: Arc<Mutex<HashMap<String, Entry<V>>>>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<V> QueryCache<V> {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<V> fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("keys", &self.lock().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<V: Clone + Send + 'static> QueryCache<V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value for `key`.
    pub fn get(&self, key: &str) -> Option<V> {
        self.lock().get(key).and_then(|e| e.value.clone())
    }

    /// Status for `key`, or `None` if the key was never written.
    pub fn status(&self, key: &str) -> Option<CacheStatus> {
        self.lock().get(key).map(|e| e.status)
    }

    /// Message of the last failed refetch, if the entry is `Failed`.
    pub fn last_error(&self, key: &str) -> Option<String> {
        self.lock().get(key).and_then(|e| e.error.clone())
    }

    /// Whether a refetch is in flight for `key`.
    pub fn is_fetching(&self, key: &str) -> bool {
        self.lock().get(key).is_some_and(|e| e.task.is_some())
    }

    /// Replace the value for `key`.
    pub fn set(&self, key: &str, value: V) {
        let mut entries = self.lock();
        let entry = entries.entry(key.to_string()).or_default();
        entry.value = Some(value);
        entry.error = None;
        if entry.status != CacheStatus::Fetching {
            entry.status = CacheStatus::Fresh;
        }
    }

    /// Transform the value for `key` in place. Returns `None` if there is no value.
    pub fn update<F, R>(&self, key: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        let mut entries = self.lock();
        let value = entries.get_mut(key)?.value.as_mut()?;
        Some(f(value))
    }

    /// Drop the entry for `key`, cancelling any refetch.
    pub fn remove(&self, key: &str) -> Option<V> {
        let mut entry = self.lock().remove(key)?;
        entry.cancel();
        entry.value
    }

    /// Capture the current value and status of `key`.
    pub fn snapshot(&self, key: &str) -> Snapshot<V> {
        let entries = self.lock();
        match entries.get(key) {
            Some(e) => Snapshot {
                value: e.value.clone(),
                status: Some(e.status),
            },
            None => Snapshot {
                value: None,
                status: None,
            },
        }
    }

    /// Put back a snapshot taken earlier.
    pub fn restore(&self, key: &str, snapshot: Snapshot<V>) {
        let mut entries = self.lock();
        match snapshot.status {
            None => {
                if let Some(mut entry) = entries.remove(key) {
                    entry.cancel();
                }
            }
            Some(status) => {
                let entry = entries.entry(key.to_string()).or_default();
                entry.value = snapshot.value;
                entry.status = match status {
                    // The refetch that was running then is gone now.
                    CacheStatus::Fetching if entry.task.is_none() => CacheStatus::Stale,
                    other => other,
                };
            }
        }
    }

    /// Cancel any in-flight refetch for `key` so it can never write.
    ///
    /// Returns whether a refetch was running.
    pub fn cancel_refetch(&self, key: &str) -> bool {
        match self.lock().get_mut(key) {
            Some(entry) => entry.cancel(),
            None => false,
        }
    }

    /// Mark `key` stale without fetching.
    pub fn invalidate(&self, key: &str) {
        if let Some(entry) = self.lock().get_mut(key) {
            if entry.status != CacheStatus::Fetching {
                entry.status = CacheStatus::Stale;
            }
        }
    }

    /// Start a background refetch of `key`, superseding any running one.
    ///
    /// On success the fetched value replaces the cached one. On failure the
    /// cached value is kept and the entry is marked `Failed`. Must be called
    /// from within a tokio runtime.
    pub fn refetch<F, E>(&self, key: &str, fetch: F)
    where
        F: Future<Output = Result<V, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let mut entries = self.lock();
        let entry = entries.entry(key.to_string()).or_default();
        entry.cancel();
        entry.status = CacheStatus::Fetching;
        let generation = entry.generation;

        let cache = self.clone();
        let owned_key = key.to_string();
        let task = tokio::spawn(async move {
            let result = fetch.await;
            cache.complete_refetch(&owned_key, generation, result);
        });
        entry.task = Some(task);
    }

    /// Wait for the in-flight refetch of `key`, if any, to finish.
    pub async fn settle(&self, key: &str) {
        let task = self.lock().get_mut(key).and_then(|e| e.task.take());
        if let Some(task) = task {
            // A cancelled task has nothing left to write.
            let _ = task.await;
        }
    }

    fn complete_refetch<E: fmt::Display>(&self, key: &str, generation: u64, result: Result<V, E>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.generation != generation {
            tracing::debug!(key, "Discarding superseded refetch");
            return;
        }

        entry.task = None;
        match result {
            Ok(value) => {
                entry.value = Some(value);
                entry.status = CacheStatus::Fresh;
                entry.error = None;
                tracing::debug!(key, "Refetch complete");
            }
            Err(e) => {
                entry.status = CacheStatus::Failed;
                entry.error = Some(e.to_string());
                tracing::warn!(key, error = %e, "Refetch failed, keeping cached value");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    const KEY: &str = "cart:current";

    #[test]
    fn test_set_get_update_remove() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        assert_eq!(cache.get(KEY), None);
        assert_eq!(cache.status(KEY), None);

        cache.set(KEY, vec![1]);
        assert_eq!(cache.status(KEY), Some(CacheStatus::Fresh));

        let len = cache.update(KEY, |v| {
            v.push(2);
            v.len()
        });
        assert_eq!(len, Some(2));
        assert_eq!(cache.get(KEY), Some(vec![1, 2]));
        assert_eq!(cache.update("missing", |v: &mut Vec<u32>| v.len()), None);

        assert_eq!(cache.remove(KEY), Some(vec![1, 2]));
        assert_eq!(cache.get(KEY), None);
    }

    #[test]
    fn test_snapshot_restore() {
        let cache: QueryCache<&'static str> = QueryCache::new();
        cache.set(KEY, "before");
        let snapshot = cache.snapshot(KEY);
        assert_eq!(snapshot.value(), Some(&"before"));

        cache.set(KEY, "speculative");
        cache.restore(KEY, snapshot);
        assert_eq!(cache.get(KEY), Some("before"));
        assert_eq!(cache.status(KEY), Some(CacheStatus::Fresh));
    }

    #[test]
    fn test_restore_empty_snapshot_removes_entry() {
        let cache: QueryCache<u32> = QueryCache::new();
        let snapshot = cache.snapshot(KEY);
        cache.set(KEY, 1);
        cache.restore(KEY, snapshot);
        assert_eq!(cache.get(KEY), None);
        assert_eq!(cache.status(KEY), None);
    }

    #[tokio::test]
    async fn test_refetch_replaces_value() {
        let cache: QueryCache<u32> = QueryCache::new();
        cache.set(KEY, 1);
        cache.refetch(KEY, async { Ok::<_, String>(2) });
        assert_eq!(cache.status(KEY), Some(CacheStatus::Fetching));

        cache.settle(KEY).await;
        assert_eq!(cache.get(KEY), Some(2));
        assert_eq!(cache.status(KEY), Some(CacheStatus::Fresh));
        assert!(!cache.is_fetching(KEY));
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_value() {
        let cache: QueryCache<u32> = QueryCache::new();
        cache.set(KEY, 1);
        cache.refetch(KEY, async { Err::<u32, _>("HTTP 503: unavailable") });
        cache.settle(KEY).await;

        assert_eq!(cache.get(KEY), Some(1));
        assert_eq!(cache.status(KEY), Some(CacheStatus::Failed));
        assert_eq!(cache.last_error(KEY).as_deref(), Some("HTTP 503: unavailable"));
    }

    #[tokio::test]
    async fn test_cancelled_refetch_never_writes() {
        let cache: QueryCache<u32> = QueryCache::new();
        cache.set(KEY, 1);

        let (tx, rx) = oneshot::channel::<u32>();
        cache.refetch(KEY, async move { rx.await.map_err(|e| e.to_string()) });

        assert!(cache.cancel_refetch(KEY));
        assert_eq!(cache.status(KEY), Some(CacheStatus::Stale));
        cache.set(KEY, 10);

        // The server answers after the cancel; the answer must be dropped.
        let _ = tx.send(99);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.get(KEY), Some(10));
        assert!(!cache.cancel_refetch(KEY));
    }

    #[tokio::test]
    async fn test_generation_fences_completed_fetch() {
        let cache: QueryCache<u32> = QueryCache::new();
        cache.set(KEY, 1);
        cache.refetch(KEY, async { Ok::<_, String>(2) });
        // Bump the generation without giving the task a chance to finish.
        cache.lock().get_mut(KEY).unwrap().generation += 1;
        cache.complete_refetch(KEY, 0, Ok::<_, String>(7));
        assert_eq!(cache.get(KEY), Some(1));
    }

    #[tokio::test]
    async fn test_new_refetch_supersedes_old() {
        let cache: QueryCache<u32> = QueryCache::new();
        let (_tx, rx) = oneshot::channel::<u32>();
        cache.refetch(KEY, async move { rx.await.map_err(|e| e.to_string()) });
        cache.refetch(KEY, async { Ok::<_, String>(5) });
        cache.settle(KEY).await;
        assert_eq!(cache.get(KEY), Some(5));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(CacheStatus::Fetching.to_string(), "FETCHING");
        assert_eq!(CacheStatus::Failed.to_string(), "FAILED");
    }
}
