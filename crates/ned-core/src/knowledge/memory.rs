//! In-memory triple index implementing the store query contract.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use super::error::KnowledgeError;
use super::models::{tokenize, Fact, Object, ObjectPattern, Query};
use super::ntriples;
use super::KnowledgeStore;

/// Triple index held entirely in memory.
///
/// Facts are indexed by subject, predicate, object URI and literal term.
/// Literal matches are ranked by the share of the literal's terms covered by
/// the query, so an exact label outranks a longer label containing it; ties
/// keep insertion order, which makes results deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    facts: Vec<Fact>,
    literal_terms: Vec<Vec<String>>,
    by_subject: HashMap<String, Vec<usize>>,
    by_predicate: HashMap<String, Vec<usize>>,
    by_object_uri: HashMap<String, Vec<usize>>,
    by_term: HashMap<String, Vec<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an iterator of facts.
    pub fn from_facts(facts: impl IntoIterator<Item = Fact>) -> Self {
        let mut store = Self::new();
        for fact in facts {
            store.insert(fact);
        }
        store
    }

    /// Load an N-Triples file.
    pub fn from_ntriples(path: impl AsRef<Path>) -> Result<Self, KnowledgeError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| KnowledgeError::io(path, e))?;
        let facts = ntriples::parse(&content, &path.display().to_string())?;
        Ok(Self::from_facts(facts))
    }

    /// Add a fact. Duplicate triples are ignored.
    pub fn insert(&mut self, fact: Fact) {
        let duplicate = self
            .by_subject
            .get(&fact.subject)
            .map(|ids| ids.iter().any(|&i| self.facts[i] == fact))
            .unwrap_or(false);
        if duplicate {
            return;
        }

        let id = self.facts.len();
        self.by_subject.entry(fact.subject.clone()).or_default().push(id);
        self.by_predicate
            .entry(fact.predicate.clone())
            .or_default()
            .push(id);

        let terms = match &fact.object {
            Object::Uri(uri) => {
                self.by_object_uri.entry(uri.clone()).or_default().push(id);
                Vec::new()
            }
            Object::Literal(text) => {
                let mut terms = tokenize(text);
                terms.dedup();
                for term in &terms {
                    let ids = self.by_term.entry(term.clone()).or_default();
                    if ids.last() != Some(&id) {
                        ids.push(id);
                    }
                }
                terms
            }
        };

        self.literal_terms.push(terms);
        self.facts.push(fact);
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Candidate fact ids from the most selective index available.
    fn candidate_ids(&self, query: &Query, pattern: Option<&ObjectPattern>) -> Vec<usize> {
        let mut lists: Vec<&[usize]> = Vec::new();
        let empty: &[usize] = &[];

        if let Some(subject) = &query.subject {
            lists.push(self.by_subject.get(subject).map(Vec::as_slice).unwrap_or(empty));
        }
        if let Some(predicate) = &query.predicate {
            lists.push(
                self.by_predicate
                    .get(predicate)
                    .map(Vec::as_slice)
                    .unwrap_or(empty),
            );
        }
        match pattern {
            Some(ObjectPattern::Uri(uri)) => {
                lists.push(self.by_object_uri.get(uri).map(Vec::as_slice).unwrap_or(empty));
            }
            Some(ObjectPattern::Terms(terms)) => {
                for term in terms {
                    lists.push(self.by_term.get(term).map(Vec::as_slice).unwrap_or(empty));
                }
            }
            _ => {}
        }

        match lists.into_iter().min_by_key(|l| l.len()) {
            Some(list) => list.to_vec(),
            None => (0..self.facts.len()).collect(),
        }
    }

    /// Relevance of fact `id` for the query, or `None` if it does not match.
    fn score(&self, id: usize, query: &Query, pattern: Option<&ObjectPattern>) -> Option<f64> {
        let fact = &self.facts[id];
        if query.subject.as_deref().is_some_and(|s| s != fact.subject) {
            return None;
        }
        if query.predicate.as_deref().is_some_and(|p| p != fact.predicate) {
            return None;
        }

        match pattern {
            None => Some(1.0),
            Some(ObjectPattern::Uri(uri)) => (fact.object.uri() == Some(uri.as_str())).then_some(1.0),
            Some(ObjectPattern::Numeric(value)) => match &fact.object {
                Object::Literal(text) => text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v == value)
                    .map(|_| 1.0),
                Object::Uri(_) => None,
            },
            Some(ObjectPattern::Terms(terms)) => {
                if terms.is_empty() || fact.object.is_uri() {
                    return None;
                }
                let literal = &self.literal_terms[id];
                if !terms.iter().all(|t| literal.contains(t)) {
                    return None;
                }
                let matched = literal.iter().filter(|t| terms.contains(t)).count();
                Some(matched as f64 / literal.len().max(1) as f64)
            }
        }
    }
}

#[async_trait]
impl KnowledgeStore for MemoryStore {
    async fn search(&self, query: &Query) -> Result<Vec<Fact>, KnowledgeError> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        let pattern = query.object_pattern();
        let mut ids = self.candidate_ids(query, pattern.as_ref());
        ids.sort_unstable();
        ids.dedup();

        let mut scored: Vec<(usize, f64)> = ids
            .into_iter()
            .filter_map(|id| self.score(id, query, pattern.as_ref()).map(|s| (id, s)))
            .collect();

        // Highest relevance first, insertion order among equals.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(scored
            .into_iter()
            .take(query.limit)
            .map(|(id, _)| self.facts[id].clone())
            .collect())
    }
}
