use super::{LinkRanker, ScoreTable};
use crate::config::DEFAULT_HITS_ITERATIONS;
use crate::graph::DisambiguationGraph;

/// Hubs and authorities; nodes are ranked by authority.
#[derive(Debug, Clone)]
pub struct Hits {
    iterations: usize,
}

impl Default for Hits {
    fn default() -> Self {
        Self::new(DEFAULT_HITS_ITERATIONS)
    }
}

impl Hits {
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }
}

impl LinkRanker for Hits {
    fn name(&self) -> &'static str {
        "hits"
    }

    fn rank(&self, graph: &mut DisambiguationGraph) -> ScoreTable {
        let ids: Vec<_> = graph.nodes().map(|(id, _)| id).collect();
        let mut authority = vec![1.0_f64; ids.len()];
        let mut hub = vec![1.0_f64; ids.len()];

        for _ in 0..self.iterations {
            // Both updates read the previous iteration's vectors.
            let next_authority: Vec<f64> = ids
                .iter()
                .map(|&id| graph.predecessors(id).map(|p| hub[p.index()]).sum())
                .collect();
            let next_hub: Vec<f64> = ids
                .iter()
                .map(|&id| graph.successors(id).map(|s| authority[s.index()]).sum())
                .collect();

            authority = normalized(next_authority);
            hub = normalized(next_hub);
        }

        for (node, (a, h)) in graph.nodes_mut().zip(authority.iter().zip(&hub)) {
            node.authority = *a;
            node.hub = *h;
        }
        ScoreTable::from_graph(graph, |n| n.authority)
    }
}

/// Scale to unit L2 norm; an all-zero vector stays zero.
fn normalized(mut v: Vec<f64>) -> Vec<f64> {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}
