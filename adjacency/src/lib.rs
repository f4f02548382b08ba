//! A builder-style adjacency list implementing [`wayfind_core::Graph`].
//!
//! Most callers of `wayfind-core` expand nodes lazily from their own
//! domain model and never need this crate; it exists for graphs that are
//! simplest expressed as an explicit edge list upfront (fixtures, demos,
//! small hand-built instances) rather than a lazy closure.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::hash::Hash;

use wayfind_core::{Edge, Graph};

/// An explicit directed weighted graph, built incrementally with
/// [`AdjacencyGraph::add_edge`] and queried through [`Graph::outgoing_edges`].
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph<N: Eq + Hash> {
    edges: HashMap<N, Vec<Edge<N>>>,
}

impl<N: Clone + Eq + Hash> AdjacencyGraph<N> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            edges: HashMap::new(),
        }
    }

    /// Add a directed edge `from -> to`. Calling this more than once for
    /// the same `(from, to)` pair adds a parallel edge rather than
    /// replacing the existing one.
    pub fn add_edge(&mut self, from: N, label: Option<String>, weight: f64, to: N) -> &mut Self {
        tracing::trace!(weight, "adjacency graph add_edge");
        self.edges
            .entry(from)
            .or_default()
            .push(Edge::new(label, weight, to));
        self
    }

    /// Add an edge in both directions with the same weight and no label.
    pub fn add_undirected_edge(&mut self, a: N, weight: f64, b: N) -> &mut Self {
        self.add_edge(a.clone(), None, weight, b.clone());
        self.add_edge(b, None, weight, a);
        self
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }
}

impl<N: Clone + Eq + Hash> Graph<N> for AdjacencyGraph<N> {
    fn outgoing_edges(&self, node: &N) -> Vec<Edge<N>> {
        self.edges.get(node).cloned().unwrap_or_default()
    }
}
