//! Cache for public query results.
//!
//! Public pages and `/api/query` repeat the same handful of reads on every
//! request. Results are cached by function path and arguments for a short
//! time, and the whole cache is dropped after any successful mutation so an
//! edit in the back office shows up on the next page load.
//!
//! A result is only stored if no mutation happened since the read that
//! produced it began; see [`QueryCache::generation`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;

/// How long a cached result is served.
const TTL: Duration = Duration::from_secs(60);

/// Cached query results keyed by `path` and serialized arguments.
#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<String, Value>,
    generation: Arc<AtomicU64>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl QueryCache {
    /// Create a cache holding at most `capacity` results.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(TTL)
                .build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn key(path: &str, args: &Value) -> String {
        format!("{path}|{args}")
    }

    /// A cached result, if fresh.
    pub async fn get(&self, path: &str, args: &Value) -> Option<Value> {
        self.entries.get(&Self::key(path, args)).await
    }

    /// The current generation. Capture it before reading the store and
    /// pass it to [`insert`](Self::insert).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store a result read during generation `seen`.
    ///
    /// Does nothing if the cache was invalidated since, so a read that
    /// raced a mutation is never served afterwards.
    pub async fn insert(&self, path: &str, args: &Value, value: Value, seen: u64) {
        if self.generation() != seen {
            return;
        }
        let key = Self::key(path, args);
        self.entries.insert(key.clone(), value).await;
        // An invalidation between the check and the insert
        if self.generation() != seen {
            self.entries.invalidate(&key).await;
        }
    }

    /// Drop every cached result.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.invalidate_all();
        tracing::debug!("Query cache invalidated");
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .field("generation", &self.generation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_keyed_by_path_and_args() {
        let cache = QueryCache::default();
        let seen = cache.generation();
        cache
            .insert("puppies:listAvailable", &json!({}), json!(["Milo"]), seen)
            .await;

        assert_eq!(
            cache.get("puppies:listAvailable", &json!({})).await,
            Some(json!(["Milo"]))
        );
        assert_eq!(cache.get("puppies:list", &json!({})).await, None);
        assert_eq!(
            cache
                .get("puppies:listAvailable", &json!({"extra": 1}))
                .await,
            None
        );
    }

    #[tokio::test]
    async fn test_invalidate_drops_everything() {
        let cache = QueryCache::default();
        let seen = cache.generation();
        cache.insert("litters:list", &json!({}), json!([]), seen).await;
        cache.invalidate();
        assert_eq!(cache.get("litters:list", &json!({})).await, None);
    }

    #[tokio::test]
    async fn test_read_that_raced_a_mutation_is_not_stored() {
        let cache = QueryCache::default();

        // The read starts, a mutation lands, then the read finishes.
        let seen = cache.generation();
        cache.invalidate();
        cache
            .insert("puppies:list", &json!({}), json!(["stale"]), seen)
            .await;
        assert_eq!(cache.get("puppies:list", &json!({})).await, None);

        // The next read is cached normally.
        let seen = cache.generation();
        cache
            .insert("puppies:list", &json!({}), json!(["fresh"]), seen)
            .await;
        assert_eq!(
            cache.get("puppies:list", &json!({})).await,
            Some(json!(["fresh"]))
        );
    }

    #[tokio::test]
    async fn test_clones_share_generation() {
        let cache = QueryCache::default();
        let handle = cache.clone();
        let seen = cache.generation();
        handle.invalidate();
        assert_ne!(cache.generation(), seen);
    }
}
