//! Best-first engine: A* / weighted A* / Dijkstra.
//!
//! Dijkstra is just this engine with a [`crate::ZeroHeuristic`]. Weighted
//! A* (`hMul > 1`) is a bounded-suboptimality variant: the returned cost is
//! <= `hMul * optimum` when the heuristic is consistent, which this engine
//! does not check — verifying consistency would mean evaluating the
//! heuristic against every neighbour before it's otherwise needed, so the
//! precondition is documented rather than enforced.

use std::collections::HashMap;

use crate::error::ConstructionError;
use crate::heap::{FibonacciHeap, Handle};
use crate::lineage::{LineageArena, LineageId};
use crate::{is_target, Graph, Heuristic, NodeValue, SearchOutcome, TargetRule};

/// Per-node bookkeeping kept alongside the lineage arena: the cached
/// heuristic value and the frontier handle, `None` once the node has been
/// popped ("expanded" == handle cleared).
struct BestFirstNode {
    lineage: LineageId,
    h: f64,
    handle: Option<Handle>,
}

/// A* / weighted A* / Dijkstra over a caller-supplied [`Graph`].
pub struct MinCostSearch<N, G, H> {
    graph: G,
    heuristic: H,
    target: TargetRule<N>,
    h_mul: f64,
}

impl<N, G, H> MinCostSearch<N, G, H>
where
    N: NodeValue,
    G: Graph<N>,
    H: Heuristic<N>,
{
    /// `h_mul >= 1`; pass `1.0` for plain A* (or Dijkstra, with a
    /// [`crate::ZeroHeuristic`]). `target` defaults to "heuristic is zero"
    /// when `None`.
    pub fn new(
        graph: G,
        heuristic: H,
        target: Option<TargetRule<N>>,
        h_mul: f64,
    ) -> Result<Self, ConstructionError> {
        if !(h_mul >= 1.0) {
            return Err(ConstructionError::HeuristicMultiplierTooSmall { supplied: h_mul });
        }
        Ok(Self {
            graph,
            heuristic,
            target: target.unwrap_or(TargetRule::HeuristicZero),
            h_mul,
        })
    }

    /// Run the search from `start`, invoking `on_visit` with every node as
    /// it is popped from the frontier.
    pub fn run(&self, start: N, mut on_visit: impl FnMut(&N)) -> SearchOutcome<N> {
        let mut lineage: LineageArena<N> = LineageArena::new();
        let mut heap: FibonacciHeap<N> = FibonacciHeap::new();
        let mut known: HashMap<N, BestFirstNode> = HashMap::new();

        let start_id = lineage.push_root(start.clone());
        let start_h = self.heuristic.h(&start);
        let start_handle = heap
            .insert(0.0, start.clone())
            .expect("initial key 0.0 is never NaN");
        known.insert(
            start.clone(),
            BestFirstNode {
                lineage: start_id,
                h: start_h,
                handle: Some(start_handle),
            },
        );

        while let Some((_key, current)) = heap.extract_min() {
            let current_id;
            let current_g;
            let current_h;
            {
                let rec = known.get_mut(&current).expect("popped node must be known");
                rec.handle = None;
                current_id = rec.lineage;
                current_g = lineage.get(current_id).g;
                current_h = rec.h;
            }

            on_visit(&current);
            tracing::trace!(?current_g, ?current_h, "best-first pop");

            if is_target(&self.target, &current, current_h) {
                return SearchOutcome::Found(lineage.reconstruct(current_id));
            }

            for edge in self.graph.outgoing_edges(&current) {
                let tentative_g = current_g + edge.weight;
                let dest = edge.destination.clone();

                match known.get(&dest) {
                    None => {
                        let h = self.heuristic.h(&dest);
                        let dest_id = lineage.push(current_id, edge, tentative_g);
                        let key = tentative_g + h * self.h_mul;
                        let handle = heap
                            .insert(key, dest.clone())
                            .expect("frontier keys are never NaN for finite weights/heuristics");
                        known.insert(
                            dest,
                            BestFirstNode {
                                lineage: dest_id,
                                h,
                                handle: Some(handle),
                            },
                        );
                    }
                    Some(rec) if rec.handle.is_some() && tentative_g < lineage.get(rec.lineage).g => {
                        let dest_id = rec.lineage;
                        let h = rec.h;
                        let handle = rec.handle.expect("checked Some above");
                        lineage.set_parent(dest_id, current_id, edge, tentative_g);
                        let new_key = tentative_g + h * self.h_mul;
                        heap.decrease_key(handle, new_key)
                            .expect("relaxation only ever lowers the key");
                    }
                    Some(_) => {
                        // Already expanded, or not an improvement: ignore.
                    }
                }
            }
        }

        SearchOutcome::NoPath
    }
}
