//! Per-entity lookups shared by candidate generation and winner selection.

use std::sync::Arc;

use crate::cache::{BoundedCache, CacheStats};
use crate::config::{Config, KnowledgeBaseConfig, DEFAULT_POPULARITY_WINDOW};
use crate::knowledge::{vocab, Fact, KnowledgeError, KnowledgeStore, Object, Query};

/// Redirects, disambiguation pages, labels, types and popularity of entities.
pub struct EntityResolver {
    store: Arc<dyn KnowledgeStore>,
    kb: KnowledgeBaseConfig,
    type_lookup_limit: usize,
    disambiguation_pages: BoundedCache<String, bool>,
}

impl EntityResolver {
    pub fn new(store: Arc<dyn KnowledgeStore>, config: &Config) -> Self {
        Self {
            store,
            kb: config.knowledge_base.clone(),
            type_lookup_limit: config.whitelist.type_lookup_limit,
            disambiguation_pages: BoundedCache::with_ttl(
                "disambiguation_pages",
                config.cache.disambiguation_pages,
                config.cache.ttl(),
            ),
        }
    }

    pub fn store(&self) -> &Arc<dyn KnowledgeStore> {
        &self.store
    }

    pub fn disambiguation_stats(&self) -> CacheStats {
        self.disambiguation_pages.stats()
    }

    /// Follow a single redirect hop.
    ///
    /// Exactly one redirect target replaces the URI; none or several keep it.
    pub async fn redirect(&self, uri: &str) -> Result<String, KnowledgeError> {
        let query = Query::new()
            .subject(uri)
            .predicate(self.kb.redirect_predicate.as_str())
            .limit(2);
        let facts = self.store.search(&query).await?;
        match facts.as_slice() {
            [Fact {
                object: Object::Uri(target),
                ..
            }] if !target.is_empty() => Ok(target.clone()),
            _ => Ok(uri.to_string()),
        }
    }

    /// Whether `uri` is a disambiguation page. Cached by URI.
    pub async fn is_disambiguation_page(&self, uri: &str) -> Result<bool, KnowledgeError> {
        let key = uri.to_string();
        if let Some(known) = self.disambiguation_pages.get(&key) {
            return Ok(known);
        }
        let query = Query::new()
            .subject(uri)
            .predicate(self.kb.disambiguates_predicate.as_str())
            .limit(1);
        let is_page = !self.store.search(&query).await?.is_empty();
        self.disambiguation_pages.insert(key, is_page);
        Ok(is_page)
    }

    /// First primary label of `uri`.
    pub async fn label(&self, uri: &str) -> Result<Option<String>, KnowledgeError> {
        let query = Query::new()
            .subject(uri)
            .predicate(self.kb.label_predicate.as_str())
            .limit(1);
        Ok(self
            .store
            .search(&query)
            .await?
            .into_iter()
            .next()
            .map(|f| f.object.as_str().to_string()))
    }

    /// Types of `uri` after one redirect hop, restricted to the type prefix.
    ///
    /// `owl:Thing` is dropped; order follows the store and duplicates are removed.
    pub async fn types(&self, uri: &str) -> Result<Vec<String>, KnowledgeError> {
        let entity = self.redirect(uri).await?;
        let query = Query::new()
            .subject(entity)
            .predicate(vocab::RDF_TYPE)
            .limit(self.type_lookup_limit);

        let mut types: Vec<String> = Vec::new();
        for fact in self.store.search(&query).await? {
            let Some(t) = fact.object.uri() else { continue };
            if t == vocab::OWL_THING || !t.starts_with(&self.kb.type_prefix) {
                continue;
            }
            if !types.iter().any(|seen| seen == t) {
                types.push(t.to_string());
            }
        }
        Ok(types)
    }

    /// Stored popularity of `uri`; 0 when missing or not numeric.
    pub async fn popularity(&self, uri: &str) -> Result<f64, KnowledgeError> {
        let query = Query::new()
            .subject(uri)
            .predicate(self.kb.popularity_predicate.as_str())
            .limit(1);
        Ok(self
            .store
            .search(&query)
            .await?
            .first()
            .and_then(|f| f.object.as_str().trim().parse::<f64>().ok())
            .unwrap_or(0.0))
    }

    /// Keep the top hits and order them by popularity, most popular first.
    ///
    /// The sort is stable, so equally popular hits keep their store order.
    pub async fn sort_by_popularity(&self, mut hits: Vec<Fact>) -> Result<Vec<Fact>, KnowledgeError> {
        hits.truncate(DEFAULT_POPULARITY_WINDOW);
        let mut scored = Vec::with_capacity(hits.len());
        for hit in hits {
            let score = self.popularity(&hit.subject).await?;
            scored.push((score, hit));
        }
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored.into_iter().map(|(_, hit)| hit).collect())
    }

    /// Whether a direct edge links `a` and `b` in either direction.
    pub async fn connected(&self, a: &str, b: &str) -> Result<bool, KnowledgeError> {
        for (s, o) in [(a, b), (b, a)] {
            let query = Query::new().subject(s).object(o).limit(1);
            if !self.store.search(&query).await?.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
