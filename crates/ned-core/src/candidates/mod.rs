//! Candidate generation: from a mention's surface string to seed graph nodes.
//!
//! For each mention the generator walks an ordered chain of searches and
//! stops at the first stage that accepts at least one entity:
//!
//! 1. acronym index (upper-case labels of at most four characters)
//! 2. primary-label search for the cleaned label
//! 3. label variants: possessive stripped, camel case split, the heuristic
//!    expansion, the stemmed label
//! 4. context index, keeping hits connected to other context hits
//!
//! If nothing is accepted the chain is run once more against alternate
//! labels. Every raw hit is pruned by string similarity, disambiguation pages
//! are dropped, one redirect hop is followed and the pre-disambiguation
//! whitelist has the final say.

mod expansion;
mod resolve;

pub use expansion::HeuristicExpander;
pub use resolve::EntityResolver;

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::{BoundedCache, CacheStats};
use crate::config::{CandidateConfig, Config, ConfigError, KnowledgeBaseConfig};
use crate::document::{Document, Mention};
use crate::graph::DisambiguationGraph;
use crate::knowledge::{vocab, Fact, KnowledgeError, KnowledgeStore, Query};
use crate::normalize::LabelNormalizer;
use crate::similarity::SimilarityMetric;
use crate::whitelist::DomainWhitelist;

/// Tolerance for the near-exact primary-label match.
const EXACT_EPSILON: f64 = 1e-9;

/// Per-document state carried across the mentions of one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    labels: Vec<String>,
    expander: HeuristicExpander,
}

impl DocumentContext {
    pub fn new(document: &Document) -> Self {
        Self {
            labels: document.mentions.iter().map(|m| m.surface.clone()).collect(),
            expander: HeuristicExpander::new(),
        }
    }

    /// Text used to query the context index for `label`.
    fn context_text(&self, label: &str) -> String {
        let mut text = self.labels.join(" ");
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(label);
        text
    }
}

/// Which label predicate a pass searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    Primary,
    Alternate,
}

/// Turns mentions into level-0 graph nodes.
pub struct CandidateGenerator {
    store: Arc<dyn KnowledgeStore>,
    context_store: Option<Arc<dyn KnowledgeStore>>,
    options: CandidateConfig,
    kb: KnowledgeBaseConfig,
    enforce_types: bool,
    metric: SimilarityMetric,
    normalizer: LabelNormalizer,
    resolver: Arc<EntityResolver>,
    whitelist: Arc<DomainWhitelist>,
    cache: BoundedCache<String, Arc<Vec<String>>>,
}

impl CandidateGenerator {
    pub fn new(
        config: &Config,
        store: Arc<dyn KnowledgeStore>,
        resolver: Arc<EntityResolver>,
        whitelist: Arc<DomainWhitelist>,
    ) -> Result<Self, ConfigError> {
        let metric = SimilarityMetric::from_str(&config.candidates.similarity_metric)?;
        let normalizer = match &config.candidates.corporate_affixes_path {
            Some(path) => LabelNormalizer::from_file(path)?,
            None => LabelNormalizer::default(),
        };

        Ok(Self {
            store,
            context_store: None,
            options: config.candidates.clone(),
            kb: config.knowledge_base.clone(),
            enforce_types: config.whitelist.enforce_types,
            metric,
            normalizer,
            resolver,
            whitelist,
            cache: BoundedCache::with_ttl("candidates", config.cache.candidates, config.cache.ttl()),
        })
    }

    /// Index searched by the context fallback.
    pub fn with_context_store(mut self, store: Arc<dyn KnowledgeStore>) -> Self {
        self.context_store = Some(store);
        self
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Insert the candidates of `mention` into `graph`, linked to its offset.
    ///
    /// Returns the number of accepted candidates; zero is not an error. A
    /// failed lookup aborts this mention only.
    pub async fn generate(
        &self,
        mention: &Mention,
        graph: &mut DisambiguationGraph,
        context: &mut DocumentContext,
    ) -> Result<usize, KnowledgeError> {
        let label = self.normalizer.clean(&mention.surface);
        if label.is_empty() {
            return Ok(0);
        }
        let expansion = if self.options.heuristic_expansion {
            context.expander.expand(&label)
        } else {
            label.clone()
        };
        let mention_type = mention.mention_type.as_deref();

        let mut accepted = self
            .run_chain(&label, &expansion, mention_type, context, LabelKind::Primary)
            .await?;
        if accepted.is_empty() && self.options.surface_forms {
            debug!(label = %label, "retrying against alternate labels");
            accepted = self
                .run_chain(&label, &expansion, mention_type, context, LabelKind::Alternate)
                .await?;
        }

        for uri in &accepted {
            graph.add_candidate(uri, mention.offset);
        }
        debug!(
            label = %label,
            expansion = %expansion,
            candidates = accepted.len(),
            "generated candidates"
        );
        Ok(accepted.len())
    }

    async fn run_chain(
        &self,
        label: &str,
        expansion: &str,
        mention_type: Option<&str>,
        context: &DocumentContext,
        kind: LabelKind,
    ) -> Result<Vec<String>, KnowledgeError> {
        if kind == LabelKind::Primary
            && self.options.acronym
            && LabelNormalizer::is_acronym(label)
        {
            let found = self.acronym_candidates(label, mention_type).await?;
            if !found.is_empty() {
                return Ok(found);
            }
        }

        let found = self.label_candidates(label, expansion, mention_type, kind).await?;
        if !found.is_empty() {
            return Ok(found.to_vec());
        }

        for variant in self.variants(label, expansion) {
            trace!(label, variant = %variant, "trying label variant");
            let found = self
                .label_candidates(&variant, expansion, mention_type, kind)
                .await?;
            if !found.is_empty() {
                return Ok(found.to_vec());
            }
        }

        if kind == LabelKind::Primary && self.options.context {
            if let Some(store) = &self.context_store {
                return self
                    .context_candidates(store.as_ref(), label, mention_type, context)
                    .await;
            }
        }

        Ok(Vec::new())
    }

    /// Fallback labels in search order, without repeats of the label itself.
    fn variants(&self, label: &str, expansion: &str) -> Vec<String> {
        let mut variants: Vec<String> = Vec::new();
        let mut push = |v: String| {
            if !v.is_empty() && v != label && !variants.contains(&v) {
                variants.push(v);
            }
        };

        if let Some(v) = LabelNormalizer::strip_possessive(label) {
            push(v);
        }
        if let Some(v) = LabelNormalizer::split_camel_case(label) {
            push(v);
        }
        if self.options.heuristic_expansion && expansion != label {
            push(expansion.to_string());
        }
        push(LabelNormalizer::stem(label));
        variants
    }

    /// Accepted entities whose label (or alternate label) matches `search`.
    async fn label_candidates(
        &self,
        search: &str,
        expansion: &str,
        mention_type: Option<&str>,
        kind: LabelKind,
    ) -> Result<Arc<Vec<String>>, KnowledgeError> {
        let key = self.cache_key(search, expansion, mention_type, kind);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let predicate = match kind {
            LabelKind::Primary => self.kb.label_predicate.as_str(),
            LabelKind::Alternate => self.kb.alt_label_predicate.as_str(),
        };
        let query = Query::new()
            .predicate(predicate)
            .object(search)
            .limit(self.options.max_candidate_lookups);
        let mut hits = self.store.search(&query).await?;
        if self.options.popularity {
            hits = self.resolver.sort_by_popularity(hits).await?;
        }

        let target = LabelNormalizer::preprocess(search);
        let expansion_key = LabelNormalizer::preprocess(expansion);
        let mut accepted = Vec::new();
        for hit in hits {
            let literal = LabelNormalizer::preprocess(hit.object.as_str());
            let similarity = self.metric.similarity(&literal, &target);
            let keep = match kind {
                LabelKind::Primary => {
                    let looping = target != expansion_key && literal == expansion_key;
                    similarity >= 1.0 - EXACT_EPSILON && !looping
                }
                LabelKind::Alternate => similarity >= self.options.similarity_threshold,
            };
            if !keep {
                trace!(uri = %hit.subject, literal = %literal, similarity, "pruned");
                continue;
            }
            if let Some(uri) = self.accept(&hit.subject, mention_type).await? {
                push_unique(&mut accepted, uri);
            }
        }

        let accepted = Arc::new(accepted);
        self.cache.insert(key, accepted.clone());
        Ok(accepted)
    }

    /// Entities whose acronym equals `label` and whose own label agrees with it.
    async fn acronym_candidates(
        &self,
        label: &str,
        mention_type: Option<&str>,
    ) -> Result<Vec<String>, KnowledgeError> {
        let query = Query::new()
            .predicate(self.kb.acronym_predicate.as_str())
            .object(label)
            .limit(self.options.max_acronym_lookups);
        let hits = self.store.search(&query).await?;

        let target = LabelNormalizer::preprocess(label);
        let mut accepted = Vec::new();
        for hit in hits {
            let Some(entity_label) = self.resolver.label(&hit.subject).await? else {
                continue;
            };
            let initials = LabelNormalizer::preprocess(&LabelNormalizer::acronym_of(&entity_label));
            let similarity = self
                .metric
                .similarity(&target, &initials)
                .max(self.metric.similarity(&target, &LabelNormalizer::preprocess(&entity_label)));
            if similarity < self.options.similarity_threshold {
                continue;
            }
            if let Some(uri) = self.accept(&hit.subject, mention_type).await? {
                push_unique(&mut accepted, uri);
            }
        }
        debug!(label, candidates = accepted.len(), "acronym search");
        Ok(accepted)
    }

    /// Context-index hits resembling `label` that are directly linked to
    /// another context hit.
    async fn context_candidates(
        &self,
        store: &dyn KnowledgeStore,
        label: &str,
        mention_type: Option<&str>,
        context: &DocumentContext,
    ) -> Result<Vec<String>, KnowledgeError> {
        let query = Query::new()
            .predicate(self.kb.context_predicate.as_str())
            .object(context.context_text(label))
            .limit(self.options.max_candidate_lookups);
        let hits: Vec<Fact> = store.search(&query).await?;

        let mut subjects: Vec<String> = Vec::new();
        for hit in hits {
            push_unique(&mut subjects, hit.subject);
        }
        subjects.truncate(self.options.max_connection_lookups);

        let target = LabelNormalizer::preprocess(label);
        let similar: Vec<&String> = subjects
            .iter()
            .filter(|uri| {
                let name = LabelNormalizer::preprocess(&vocab::local_name(uri));
                self.metric.similarity(&name, &target) >= self.options.similarity_threshold
            })
            .collect();

        let mut accepted = Vec::new();
        for &candidate in &similar {
            let mut linked = false;
            for other in subjects.iter().filter(|o| *o != candidate) {
                if self.resolver.connected(candidate, other).await? {
                    linked = true;
                    break;
                }
            }
            if !linked {
                continue;
            }
            if let Some(uri) = self.accept(candidate, mention_type).await? {
                push_unique(&mut accepted, uri);
            }
        }
        debug!(label, hits = similar.len(), candidates = accepted.len(), "context search");
        Ok(accepted)
    }

    /// Redirect, reject disambiguation pages and apply the whitelist.
    async fn accept(
        &self,
        uri: &str,
        mention_type: Option<&str>,
    ) -> Result<Option<String>, KnowledgeError> {
        if self.resolver.is_disambiguation_page(uri).await? {
            return Ok(None);
        }
        let target = self.resolver.redirect(uri).await?;
        if target != uri && self.resolver.is_disambiguation_page(&target).await? {
            return Ok(None);
        }
        if !target.starts_with(&self.kb.node_type) {
            return Ok(None);
        }
        if self.options.common_entities || self.whitelist.accepts(&target, mention_type).await? {
            Ok(Some(target))
        } else {
            Ok(None)
        }
    }

    fn cache_key(
        &self,
        search: &str,
        expansion: &str,
        mention_type: Option<&str>,
        kind: LabelKind,
    ) -> String {
        let kind = match kind {
            LabelKind::Primary => "label",
            LabelKind::Alternate => "alt",
        };
        let ner = if self.enforce_types {
            mention_type.unwrap_or_default().to_uppercase()
        } else {
            String::new()
        };
        if search == expansion {
            format!("{kind}|{ner}|{search}")
        } else {
            format!("{kind}|{ner}|{search}|{expansion}")
        }
    }
}

fn push_unique(uris: &mut Vec<String>, uri: String) {
    if !uris.contains(&uri) {
        uris.push(uri);
    }
}
