use super::{LinkRanker, ScoreTable};
use crate::config::{DEFAULT_DAMPING, DEFAULT_PAGERANK_ITERATIONS};
use crate::graph::DisambiguationGraph;

/// PageRank with uniform random jumps.
///
/// `damping` is the random-jump probability. Rank held by nodes without
/// outgoing edges is spread uniformly, so total rank stays 1.
#[derive(Debug, Clone)]
pub struct PageRank {
    iterations: usize,
    damping: f64,
}

impl Default for PageRank {
    fn default() -> Self {
        Self::new(DEFAULT_PAGERANK_ITERATIONS, DEFAULT_DAMPING)
    }
}

impl PageRank {
    pub fn new(iterations: usize, damping: f64) -> Self {
        Self {
            iterations,
            damping,
        }
    }
}

impl LinkRanker for PageRank {
    fn name(&self) -> &'static str {
        "pagerank"
    }

    fn rank(&self, graph: &mut DisambiguationGraph) -> ScoreTable {
        let ids: Vec<_> = graph.nodes().map(|(id, _)| id).collect();
        let n = ids.len();
        if n == 0 {
            return ScoreTable::default();
        }

        let uniform = 1.0 / n as f64;
        let follow = 1.0 - self.damping;
        let mut rank = vec![uniform; n];

        for _ in 0..self.iterations {
            let dangling: f64 = ids
                .iter()
                .filter(|&&id| graph.out_degree(id) == 0)
                .map(|id| rank[id.index()])
                .sum();
            let base = self.damping * uniform + follow * dangling * uniform;

            rank = ids
                .iter()
                .map(|&id| {
                    let inflow: f64 = graph
                        .predecessors(id)
                        .map(|p| rank[p.index()] / graph.out_degree(p) as f64)
                        .sum();
                    base + follow * inflow
                })
                .collect();
        }

        for (node, r) in graph.nodes_mut().zip(&rank) {
            node.page_rank = *r;
        }
        ScoreTable::from_graph(graph, |n| n.page_rank)
    }
}
