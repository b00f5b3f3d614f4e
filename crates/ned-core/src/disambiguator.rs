//! Per-document orchestration of the disambiguation pipeline.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::candidates::{CandidateGenerator, DocumentContext, EntityResolver};
use crate::config::Config;
use crate::document::{CandidateDump, Document, DocumentResult, ScoredCandidate};
use crate::error::NedError;
use crate::graph::{DisambiguationGraph, GraphExpander};
use crate::knowledge::{CachedStore, HttpStore, KnowledgeError, KnowledgeStore, MemoryStore};
use crate::ranking::{ranker_for, LinkRanker, ScoreTable};
use crate::whitelist::DomainWhitelist;

/// Runs candidate generation, graph expansion and ranking for documents.
///
/// One instance is shared by all concurrently processed documents; each
/// document gets its own graph, while caches and stores are shared.
pub struct Disambiguator {
    config: Arc<Config>,
    generator: CandidateGenerator,
    expander: GraphExpander,
    ranker: Box<dyn LinkRanker>,
    resolver: Arc<EntityResolver>,
    post_whitelist: DomainWhitelist,
}

impl Disambiguator {
    /// Build the pipeline, rejecting an invalid configuration.
    pub fn new(config: Arc<Config>, store: Arc<dyn KnowledgeStore>) -> Result<Self, NedError> {
        config.validate()?;

        let cache = &config.cache;
        let whitelist_config = &config.whitelist;
        let pre_whitelist = match &whitelist_config.pre_path {
            Some(path) => DomainWhitelist::from_file(
                path,
                store.clone(),
                whitelist_config,
                cache.whitelist,
                cache.ttl(),
            )?,
            None => DomainWhitelist::empty(store.clone(), whitelist_config, cache.whitelist, cache.ttl()),
        };
        let post_whitelist = match &whitelist_config.post_path {
            Some(path) => DomainWhitelist::from_file(
                path,
                store.clone(),
                whitelist_config,
                cache.whitelist,
                cache.ttl(),
            )?,
            None => DomainWhitelist::empty(store.clone(), whitelist_config, cache.whitelist, cache.ttl()),
        };

        let resolver = Arc::new(EntityResolver::new(store.clone(), &config));
        let generator = CandidateGenerator::new(
            &config,
            store.clone(),
            resolver.clone(),
            Arc::new(pre_whitelist),
        )?;
        let expander = GraphExpander::new(
            store,
            config.knowledge_base.edge_type.as_str(),
            config.knowledge_base.node_type.as_str(),
        )
        .with_limit(config.graph.expansion_limit);
        let ranker = ranker_for(&config.graph);

        Ok(Self {
            config,
            generator,
            expander,
            ranker,
            resolver,
            post_whitelist,
        })
    }

    /// Index searched by the context fallback of candidate generation.
    pub fn with_context_store(mut self, store: Arc<dyn KnowledgeStore>) -> Self {
        self.generator = self.generator.with_context_store(store);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn generator(&self) -> &CandidateGenerator {
        &self.generator
    }

    /// Disambiguate every mention of `document` in place.
    ///
    /// Mentions without a qualifying candidate stay unresolved. Fails only if
    /// the knowledge base could not be reached for any mention.
    pub async fn run(
        &self,
        document: &mut Document,
        want_candidates: bool,
    ) -> Result<Option<CandidateDump>, NedError> {
        for mention in &mut document.mentions {
            mention.clear_resolution();
        }

        let mut graph = DisambiguationGraph::new();
        let mut context = DocumentContext::new(document);

        // Longest labels first, so expansions only point at labels already seen.
        let mut order: Vec<usize> = (0..document.mentions.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&document.mentions[a], &document.mentions[b]);
            b.surface
                .chars()
                .count()
                .cmp(&a.surface.chars().count())
                .then(a.offset.cmp(&b.offset))
        });

        let mut failed = 0usize;
        let mut last_error: Option<KnowledgeError> = None;
        for &i in &order {
            let mention = &document.mentions[i];
            match self.generator.generate(mention, &mut graph, &mut context).await {
                Ok(count) => debug!(surface = %mention.surface, count, "candidates"),
                Err(e) => {
                    warn!(surface = %mention.surface, error = %e, "candidate generation failed");
                    if e.is_lookup_failure() {
                        failed += 1;
                    }
                    last_error = Some(e);
                }
            }
        }
        if !document.mentions.is_empty() && failed == document.mentions.len() {
            return Err(NedError::DocumentFailed {
                document: document.id.clone(),
                message: last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "knowledge base unavailable".to_string()),
            });
        }

        let seeds = graph.len();
        let stats = self.expander.expand(&mut graph, self.config.graph.max_depth).await;
        let table = self.ranker.rank(&mut graph);
        debug!(
            seeds,
            nodes = graph.len(),
            edges = graph.edge_count(),
            failed_lookups = stats.failed_lookups,
            ranker = self.ranker.name(),
            "ranked graph"
        );

        let mut resolved = 0usize;
        for mention in &mut document.mentions {
            for entry in table.iter() {
                if !graph.node(entry.node).is_candidate_for(mention.offset) {
                    continue;
                }
                match self
                    .post_whitelist
                    .accepts(&entry.uri, mention.mention_type.as_deref())
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        warn!(uri = %entry.uri, error = %e, "whitelist lookup failed, skipping candidate");
                        continue;
                    }
                }

                mention.uri = Some(entry.uri.clone());
                mention.score = Some(entry.score);
                mention.label = self.resolver.label(&entry.uri).await.unwrap_or_else(|e| {
                    warn!(uri = %entry.uri, error = %e, "label lookup failed");
                    None
                });
                mention.types = self.resolver.types(&entry.uri).await.unwrap_or_else(|e| {
                    warn!(uri = %entry.uri, error = %e, "type lookup failed");
                    Vec::new()
                });
                resolved += 1;
                break;
            }
        }

        info!(
            document = %document.id,
            mentions = document.mentions.len(),
            resolved,
            nodes = graph.len(),
            "document disambiguated"
        );

        Ok(want_candidates.then(|| candidate_dump(document, &graph, &table)))
    }

    /// Disambiguate documents concurrently, returning results in input order.
    pub async fn run_batch(
        &self,
        documents: Vec<Document>,
        concurrency: usize,
        want_candidates: bool,
    ) -> Vec<Result<DocumentResult, NedError>> {
        stream::iter(documents)
            .map(|mut document| async move {
                let candidates = self.run(&mut document, want_candidates).await?;
                Ok::<_, NedError>(document.result(candidates))
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

fn candidate_dump(document: &Document, graph: &DisambiguationGraph, table: &ScoreTable) -> CandidateDump {
    let mut dump = CandidateDump::default();
    for mention in &document.mentions {
        let ranked = table
            .iter()
            .filter(|e| graph.node(e.node).is_candidate_for(mention.offset))
            .map(|e| ScoredCandidate {
                uri: e.uri.clone(),
                score: e.score,
            })
            .collect();
        dump.by_offset.insert(mention.offset, ranked);
    }
    dump
}

/// Open the store named by the configuration, behind a result cache.
///
/// A remote endpoint takes precedence over a local N-Triples file; with
/// neither, the store is empty.
pub fn open_store(config: &Config) -> Result<Arc<dyn KnowledgeStore>, NedError> {
    let kb = &config.knowledge_base;
    let inner: Arc<dyn KnowledgeStore> = if let Some(endpoint) = &kb.endpoint {
        Arc::new(HttpStore::new(endpoint.as_str()))
    } else if let Some(path) = &kb.store_path {
        let store = MemoryStore::from_ntriples(path)?;
        info!(path = %path, facts = store.len(), "loaded knowledge base");
        Arc::new(store)
    } else {
        warn!("no knowledge base configured, every mention will stay unresolved");
        Arc::new(MemoryStore::new())
    };
    Ok(Arc::new(CachedStore::new(inner, config.cache.triples, config.cache.ttl())))
}

/// Open the context index, if one is configured.
pub fn open_context_store(config: &Config) -> Result<Option<Arc<dyn KnowledgeStore>>, NedError> {
    match &config.knowledge_base.context_store_path {
        Some(path) => {
            let store = MemoryStore::from_ntriples(path)?;
            Ok(Some(Arc::new(store)))
        }
        None => Ok(None),
    }
}
