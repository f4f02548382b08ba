//! Greedy best-first engine.
//!
//! Same skeleton as [`crate::bestfirst::MinCostSearch`] but the frontier
//! key is `h` alone: no relaxation, no decrease-key, each node enters the
//! map exactly once. The returned path is not guaranteed optimal.

use std::collections::HashSet;

use crate::heap::FibonacciHeap;
use crate::lineage::{LineageArena, LineageId};
use crate::{is_target, Graph, Heuristic, NodeValue, SearchOutcome, TargetRule};

pub struct GreedyBestFirstSearch<N, G, H> {
    graph: G,
    heuristic: H,
    target: TargetRule<N>,
}

impl<N, G, H> GreedyBestFirstSearch<N, G, H>
where
    N: NodeValue,
    G: Graph<N>,
    H: Heuristic<N>,
{
    #[must_use]
    pub fn new(graph: G, heuristic: H, target: Option<TargetRule<N>>) -> Self {
        Self {
            graph,
            heuristic,
            target: target.unwrap_or(TargetRule::HeuristicZero),
        }
    }

    pub fn run(&self, start: N, mut on_visit: impl FnMut(&N)) -> SearchOutcome<N> {
        let mut lineage: LineageArena<N> = LineageArena::new();
        let mut heap: FibonacciHeap<(N, LineageId, f64)> = FibonacciHeap::new();
        let mut discovered: HashSet<N> = HashSet::new();

        let start_id = lineage.push_root(start.clone());
        let start_h = self.heuristic.h(&start);
        discovered.insert(start.clone());
        heap.insert(start_h, (start.clone(), start_id, start_h))
            .expect("heuristic values are never NaN by contract");

        while let Some((_key, (current, current_id, current_h))) = heap.extract_min() {
            on_visit(&current);

            if is_target(&self.target, &current, current_h) {
                return SearchOutcome::Found(lineage.reconstruct(current_id));
            }

            let g = lineage.get(current_id).g;
            for edge in self.graph.outgoing_edges(&current) {
                if !discovered.insert(edge.destination.clone()) {
                    continue;
                }
                let h = self.heuristic.h(&edge.destination);
                let dest = edge.destination.clone();
                let dest_g = g + edge.weight;
                let dest_id = lineage.push(current_id, edge, dest_g);
                heap.insert(h, (dest, dest_id, h))
                    .expect("heuristic values are never NaN by contract");
            }
        }

        SearchOutcome::NoPath
    }
}
