//! Bounded concurrent caches shared by every pipeline stage.
//!
//! All caches in the crate go through [`BoundedCache`]: a size-bounded
//! `moka` cache with an optional time-to-live and hit/miss counters. Entries
//! are only ever dropped by eviction; the knowledge base is read-only for the
//! lifetime of the process, so nothing is invalidated on content change.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// A named, size-bounded, thread-safe cache.
pub struct BoundedCache<K, V> {
    name: &'static str,
    inner: moka::sync::Cache<K, V>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Counters reported by [`BoundedCache::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache holding at most `capacity` entries.
    pub fn new(name: &'static str, capacity: u64) -> Self {
        Self::with_ttl(name, capacity, None)
    }

    /// Create a cache with an optional time-to-live per entry.
    pub fn with_ttl(name: &'static str, capacity: u64, ttl: Option<Duration>) -> Self {
        let mut builder = moka::sync::Cache::builder().max_capacity(capacity);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        let inner = builder
            .eviction_listener(move |_key, _value, cause| {
                if cause == moka::notification::RemovalCause::Size {
                    tracing::trace!(cache = name, "evicted entry (capacity)");
                }
            })
            .build();

        Self {
            name,
            inner,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.inner.get(key);
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Flush pending maintenance so that `stats().entries` is exact.
    pub fn sync(&self) {
        self.inner.run_pending_tasks();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.inner.entry_count(),
        }
    }
}

impl<K, V> std::fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("name", &self.name)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}
