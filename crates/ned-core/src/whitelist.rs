//! Domain whitelists applied before and after ranking.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{BoundedCache, CacheStats};
use crate::config::WhitelistConfig;
use crate::knowledge::{vocab, KnowledgeError, KnowledgeStore, Query};

/// Accepts resources that are listed, or whose types are listed.
///
/// With type forcing enabled, a candidate for a typed mention must also carry
/// one of the knowledge-base types mapped to the mention's NER type. Mention
/// types absent from the mapping impose no constraint.
pub struct DomainWhitelist {
    entries: HashSet<String>,
    store: Arc<dyn KnowledgeStore>,
    enforce_types: bool,
    type_mapping: BTreeMap<String, Vec<String>>,
    type_lookup_limit: usize,
    decisions: BoundedCache<String, bool>,
}

impl DomainWhitelist {
    pub fn new(
        entries: impl IntoIterator<Item = String>,
        store: Arc<dyn KnowledgeStore>,
        config: &WhitelistConfig,
        capacity: u64,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            store,
            enforce_types: config.enforce_types,
            type_mapping: config
                .type_mapping
                .iter()
                .map(|(ner, types)| (ner.to_uppercase(), types.clone()))
                .collect(),
            type_lookup_limit: config.type_lookup_limit,
            decisions: BoundedCache::with_ttl("whitelist", capacity, ttl),
        }
    }

    /// A whitelist that lists nothing: only type forcing can reject.
    pub fn empty(
        store: Arc<dyn KnowledgeStore>,
        config: &WhitelistConfig,
        capacity: u64,
        ttl: Option<Duration>,
    ) -> Self {
        Self::new(Vec::new(), store, config, capacity, ttl)
    }

    /// Load entries from a file with one URI per line.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn from_file(
        path: impl AsRef<Path>,
        store: Arc<dyn KnowledgeStore>,
        config: &WhitelistConfig,
        capacity: u64,
        ttl: Option<Duration>,
    ) -> Result<Self, KnowledgeError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| KnowledgeError::io(path, e))?;
        let entries = parse_entries(&content);
        debug!(path = %path.display(), entries = entries.len(), "loaded whitelist");
        Ok(Self::new(entries, store, config, capacity, ttl))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.decisions.stats()
    }

    /// Whether `uri` may be used for a mention of `mention_type`.
    ///
    /// Decisions are cached per URI (and mention type when forcing is on).
    /// A failed type lookup is returned as an error and leaves no decision
    /// behind, so the next call asks the store again.
    pub async fn accepts(&self, uri: &str, mention_type: Option<&str>) -> Result<bool, KnowledgeError> {
        let required = self.required_types(mention_type);
        let key = match (required.is_some(), mention_type) {
            (true, Some(ner)) => format!("{uri}|{}", ner.to_uppercase()),
            _ => uri.to_string(),
        };

        if let Some(decision) = self.decisions.get(&key) {
            return Ok(decision);
        }

        if self.entries.contains(uri) {
            self.decisions.insert(key, true);
            return Ok(true);
        }

        if self.entries.is_empty() && required.is_none() {
            self.decisions.insert(key, true);
            return Ok(true);
        }

        let query = Query::new()
            .subject(uri)
            .predicate(vocab::RDF_TYPE)
            .limit(self.type_lookup_limit);
        let types: Vec<String> = self
            .store
            .search(&query)
            .await?
            .into_iter()
            .filter_map(|f| f.object.uri().map(str::to_string))
            .filter(|t| !vocab::is_ignored_type(t))
            .collect();

        let in_domain = self.entries.is_empty() || types.iter().any(|t| self.entries.contains(t));
        let compliant = required.map_or(true, |accepted| {
            types.iter().any(|t| accepted.contains(t))
        });

        let decision = in_domain && compliant;
        self.decisions.insert(key, decision);
        Ok(decision)
    }

    /// Knowledge-base types a mention of `mention_type` must carry, if forced.
    fn required_types(&self, mention_type: Option<&str>) -> Option<&Vec<String>> {
        if !self.enforce_types {
            return None;
        }
        self.type_mapping.get(&mention_type?.to_uppercase())
    }
}

fn parse_entries(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
