//! Link analysis over the candidate graph.
//!
//! A [`LinkRanker`] writes its weights into the graph nodes and returns a
//! [`ScoreTable`]: every node with its score, best first. Equal scores are
//! ordered by URI so that a ranking is reproducible across runs.

mod hits;
mod pagerank;

pub use hits::Hits;
pub use pagerank::PageRank;

use std::cmp::Ordering;

use serde::Serialize;

use crate::config::{GraphConfig, RankingAlgorithm};
use crate::graph::{DisambiguationGraph, GraphNode, NodeId};

/// Scores the nodes of a candidate graph.
pub trait LinkRanker: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run the algorithm, store the weights on the nodes and return them ranked.
    fn rank(&self, graph: &mut DisambiguationGraph) -> ScoreTable;
}

/// Pick the ranker for the configured algorithm.
pub fn ranker_for(config: &GraphConfig) -> Box<dyn LinkRanker> {
    match config.algorithm {
        RankingAlgorithm::Hits => Box::new(Hits::new(config.hits_iterations)),
        RankingAlgorithm::PageRank => {
            Box::new(PageRank::new(config.pagerank_iterations, config.damping))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedNode {
    #[serde(skip)]
    pub node: NodeId,
    pub uri: String,
    pub score: f64,
}

/// Graph nodes ordered by descending score, URI ascending among ties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScoreTable {
    entries: Vec<RankedNode>,
}

impl ScoreTable {
    /// Rank every node of `graph` by `key`.
    pub fn from_graph(graph: &DisambiguationGraph, key: impl Fn(&GraphNode) -> f64) -> Self {
        let mut entries: Vec<RankedNode> = graph
            .nodes()
            .map(|(id, node)| RankedNode {
                node: id,
                uri: node.uri.clone(),
                score: key(node),
            })
            .collect();
        entries.sort_by(compare);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedNode> {
        self.entries.iter()
    }

    pub fn score_of(&self, uri: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.uri == uri).map(|e| e.score)
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.uri.as_str())
    }
}

fn compare(a: &RankedNode, b: &RankedNode) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.uri.cmp(&b.uri))
}
