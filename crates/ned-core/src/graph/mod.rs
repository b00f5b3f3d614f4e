//! Query-specific candidate graph.
//!
//! Nodes live in an arena owned by [`DisambiguationGraph`] and are addressed
//! by [`NodeId`]. The graph keeps a URI index so a resource is never inserted
//! twice, and refuses duplicate `(source, target, predicate)` edges. Adjacency
//! is stored as edge indices, so nodes hold no references to each other.

mod expander;

pub use expander::{ExpansionStats, GraphExpander};

use std::collections::{BTreeSet, HashMap, HashSet};

/// Index of a node in its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A knowledge-base resource in the candidate graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub uri: String,

    /// Start offsets of the mentions this node is a candidate for.
    pub mentions: BTreeSet<usize>,

    /// BFS distance from the candidate seeds (seeds are level 0).
    pub level: usize,

    pub hub: f64,
    pub authority: f64,
    pub page_rank: f64,
}

impl GraphNode {
    fn new(uri: impl Into<String>, level: usize) -> Self {
        Self {
            uri: uri.into(),
            mentions: BTreeSet::new(),
            level,
            hub: 1.0,
            authority: 1.0,
            page_rank: 0.0,
        }
    }

    /// Whether this node is a candidate for the mention starting at `offset`.
    pub fn is_candidate_for(&self, offset: usize) -> bool {
        self.mentions.contains(&offset)
    }
}

impl PartialEq for GraphNode {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for GraphNode {}

/// A directed, predicate-labelled edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// `"<insertion-index>;<predicate>"`.
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    pub predicate: String,
}

#[derive(Debug, Default)]
pub struct DisambiguationGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, NodeId>,
    edges: Vec<Edge>,
    edge_keys: HashSet<(NodeId, NodeId, String)>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl DisambiguationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn find(&self, uri: &str) -> Option<NodeId> {
        self.index.get(uri).copied()
    }

    pub fn get(&self, uri: &str) -> Option<&GraphNode> {
        self.find(uri).map(|id| &self.nodes[id.0])
    }

    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut GraphNode {
        &mut self.nodes[id.0]
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut GraphNode> {
        self.nodes.iter_mut()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Return the node for `uri`, creating it at `level` if absent.
    ///
    /// The boolean is `true` when the node was created by this call.
    pub fn get_or_insert(&mut self, uri: &str, level: usize) -> (NodeId, bool) {
        if let Some(id) = self.find(uri) {
            return (id, false);
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(GraphNode::new(uri, level));
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        self.index.insert(uri.to_string(), id);
        (id, true)
    }

    /// Register `uri` as a level-0 candidate for the mention at `offset`.
    ///
    /// A resource shared by several mentions keeps a single node that
    /// records every offset.
    pub fn add_candidate(&mut self, uri: &str, offset: usize) -> NodeId {
        let (id, _) = self.get_or_insert(uri, 0);
        let node = &mut self.nodes[id.0];
        node.level = 0;
        node.mentions.insert(offset);
        id
    }

    /// Add an edge unless the same `(source, target, predicate)` edge exists.
    ///
    /// Returns `true` when an edge was added.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, predicate: &str) -> bool {
        if !self
            .edge_keys
            .insert((source, target, predicate.to_string()))
        {
            return false;
        }
        let index = self.edges.len();
        self.edges.push(Edge {
            id: format!("{index};{predicate}"),
            source,
            target,
            predicate: predicate.to_string(),
        });
        self.outgoing[source.0].push(index);
        self.incoming[target.0].push(index);
        true
    }

    /// Targets of the outgoing edges of `id`, one entry per edge.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing[id.0].iter().map(|&e| self.edges[e].target)
    }

    /// Sources of the incoming edges of `id`, one entry per edge.
    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming[id.0].iter().map(|&e| self.edges[e].source)
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.outgoing[id.0].len()
    }

    /// Deepest discovery level in the graph (0 for an empty graph).
    pub fn max_level(&self) -> usize {
        self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
    }
}
