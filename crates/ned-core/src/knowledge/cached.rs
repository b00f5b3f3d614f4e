//! Result cache in front of any knowledge store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::error::KnowledgeError;
use super::models::{Fact, Query};
use super::KnowledgeStore;
use crate::cache::{BoundedCache, CacheStats};

/// Caches successful query results by the full query (pattern and limit).
///
/// Failed lookups are never cached, so a transient outage does not pin an
/// empty answer.
pub struct CachedStore {
    inner: Arc<dyn KnowledgeStore>,
    results: BoundedCache<Query, Arc<Vec<Fact>>>,
}

impl CachedStore {
    pub fn new(inner: Arc<dyn KnowledgeStore>, capacity: u64, ttl: Option<Duration>) -> Self {
        Self {
            inner,
            results: BoundedCache::with_ttl("triples", capacity, ttl),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.results.stats()
    }
}

#[async_trait]
impl KnowledgeStore for CachedStore {
    async fn search(&self, query: &Query) -> Result<Vec<Fact>, KnowledgeError> {
        if let Some(hit) = self.results.get(query) {
            return Ok(hit.as_ref().clone());
        }
        let facts = self.inner.search(query).await?;
        self.results.insert(query.clone(), Arc::new(facts.clone()));
        Ok(facts)
    }
}
