//! Breadth-first expansion of the candidate graph.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::{DisambiguationGraph, NodeId};
use crate::config::DEFAULT_EXPANSION_LIMIT;
use crate::knowledge::{KnowledgeError, KnowledgeStore, Query};

/// What one expansion pass did to the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionStats {
    /// Nodes whose outgoing facts were fetched.
    pub expanded: usize,
    pub nodes_added: usize,
    pub edges_added: usize,
    /// Facts skipped for an empty predicate or object.
    pub malformed: usize,
    /// Nodes skipped because their lookup failed.
    pub failed_lookups: usize,
}

/// Grows the graph from its seeds along typed knowledge-base edges.
pub struct GraphExpander {
    store: Arc<dyn KnowledgeStore>,
    edge_type: String,
    node_type: String,
    limit: usize,
}

impl GraphExpander {
    /// Follow predicates starting with `edge_type` to resources starting with `node_type`.
    pub fn new(
        store: Arc<dyn KnowledgeStore>,
        edge_type: impl Into<String>,
        node_type: impl Into<String>,
    ) -> Self {
        Self {
            store,
            edge_type: edge_type.into(),
            node_type: node_type.into(),
            limit: DEFAULT_EXPANSION_LIMIT,
        }
    }

    /// Outgoing facts fetched per node.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Expand every node above `max_depth`, seeding the BFS with all current nodes.
    ///
    /// New nodes are created one level below the node they were reached from,
    /// so no node ends up deeper than `max_depth`. Each node is expanded at
    /// most once. A failed lookup skips that node only.
    pub async fn expand(&self, graph: &mut DisambiguationGraph, max_depth: usize) -> ExpansionStats {
        let mut stats = ExpansionStats::default();
        let mut queue: VecDeque<NodeId> = graph.nodes().map(|(id, _)| id).collect();
        let mut visited: HashSet<NodeId> = HashSet::new();

        while let Some(id) = queue.pop_front() {
            let level = graph.node(id).level;
            if level >= max_depth || !visited.insert(id) {
                continue;
            }

            let uri = graph.node(id).uri.clone();
            let query = Query::new().subject(uri.as_str()).limit(self.limit);
            let facts = match self.store.search(&query).await {
                Ok(facts) => facts,
                Err(e) => {
                    warn!(uri = %uri, error = %e, "skipping node, lookup failed");
                    stats.failed_lookups += 1;
                    continue;
                }
            };
            stats.expanded += 1;

            for fact in facts {
                if fact.is_malformed() {
                    let err = KnowledgeError::MalformedFact {
                        subject: fact.subject.clone(),
                    };
                    warn!(error = %err, "skipping fact");
                    stats.malformed += 1;
                    continue;
                }
                if !fact.predicate.starts_with(&self.edge_type) {
                    continue;
                }
                let Some(target_uri) = fact.object.uri() else {
                    continue;
                };
                if !target_uri.starts_with(&self.node_type) {
                    continue;
                }

                let (target, created) = graph.get_or_insert(target_uri, level + 1);
                if created {
                    stats.nodes_added += 1;
                    queue.push_back(target);
                }
                if graph.add_edge(id, target, &fact.predicate) {
                    stats.edges_added += 1;
                }
            }
        }

        debug!(
            expanded = stats.expanded,
            nodes = graph.len(),
            edges = graph.edge_count(),
            "graph expanded"
        );
        stats
    }
}
