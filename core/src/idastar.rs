//! IDA* engine: iterative cost-bounded DFS over an explicit stack.
//! Supply a [`crate::ZeroHeuristic`] for plain IDDFS.
//!
//! Cycle avoidance walks the lineage arena's parent chain rather than
//! maintaining a separate visited set, keeping memory proportional to
//! current search depth instead of to the number of nodes seen so far.

use crate::lineage::{LineageArena, LineageId};
use crate::{is_target, Graph, Heuristic, NodeValue, SearchOutcome, TargetRule};

pub struct IdaStarSearch<N, G, H> {
    graph: G,
    heuristic: H,
    target: TargetRule<N>,
}

struct Frame {
    lineage: LineageId,
}

impl<N, G, H> IdaStarSearch<N, G, H>
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
        let mut bound = self.heuristic.h(&start);
        if !bound.is_finite() {
            return SearchOutcome::NoPath;
        }

        loop {
            let mut next_bound = f64::INFINITY;
            let mut lineage: LineageArena<N> = LineageArena::new();
            let mut stack: Vec<(N, Frame)> = Vec::new();
            let root_id = lineage.push_root(start.clone());
            stack.push((start.clone(), Frame { lineage: root_id }));

            while let Some((value, frame)) = stack.pop() {
                let g = lineage.get(frame.lineage).g;
                let h = self.heuristic.h(&value);
                let f = g + h;

                if f > bound {
                    if f < next_bound {
                        next_bound = f;
                    }
                    continue;
                }

                on_visit(&value);
                tracing::debug!(bound, f, "idastar visit");

                if is_target(&self.target, &value, h) {
                    return SearchOutcome::Found(lineage.reconstruct(frame.lineage));
                }

                for edge in self.graph.outgoing_edges(&value) {
                    if lineage.is_ancestor(frame.lineage, &edge.destination) {
                        continue;
                    }
                    let dest = edge.destination.clone();
                    let dest_g = g + edge.weight;
                    let dest_id = lineage.push(frame.lineage, edge, dest_g);
                    stack.push((dest, Frame { lineage: dest_id }));
                }
            }

            if !next_bound.is_finite() {
                return SearchOutcome::NoPath;
            }
            bound = next_bound;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Edge;

    fn diamond(n: &u32) -> Vec<Edge<u32>> {
        match n {
            0 => vec![Edge::new(None, 1.0, 1), Edge::new(None, 4.0, 2)],
            1 => vec![Edge::new(None, 1.0, 3)],
            2 => vec![Edge::new(None, 1.0, 3)],
            _ => vec![],
        }
    }

    #[test]
    fn finds_optimal_cost_with_consistent_heuristic() {
        let h = |n: &u32| if *n == 3 { 0.0 } else { 1.0 };
        let engine = IdaStarSearch::new(diamond, h, None);
        let outcome = engine.run(0, |_| {});
        assert_eq!(outcome.path().unwrap().cost, 2.0);
    }

    #[test]
    fn iddfs_with_zero_heuristic_finds_a_path() {
        let engine = IdaStarSearch::new(
            diamond,
            crate::ZeroHeuristic,
            Some(TargetRule::predicate(|n: &u32| *n == 3)),
        );
        let outcome = engine.run(0, |_| {});
        assert!(outcome.is_found());
    }

    #[test]
    fn infinite_initial_heuristic_returns_no_path_immediately() {
        let h = |_: &u32| f64::INFINITY;
        let engine = IdaStarSearch::new(diamond, h, Some(TargetRule::predicate(|n: &u32| *n == 3)));
        assert_eq!(engine.run(0, |_| {}), SearchOutcome::NoPath);
    }

    #[test]
    fn no_path_returns_sentinel() {
        fn empty(_: &u32) -> Vec<Edge<u32>> {
            vec![]
        }
        let h = |n: &u32| if *n == 99 { 0.0 } else { 1.0 };
        let engine = IdaStarSearch::new(empty, h, None);
        assert_eq!(engine.run(0, |_| {}), SearchOutcome::NoPath);
    }

    #[test]
    fn does_not_revisit_an_ancestor_on_a_cyclic_graph() {
        // 0 <-> 1 -> 2 (target); without ancestor-chain pruning this would
        // loop forever between 0 and 1.
        fn cyclic(n: &u32) -> Vec<Edge<u32>> {
            match n {
                0 => vec![Edge::new(None, 1.0, 1)],
                1 => vec![Edge::new(None, 1.0, 0), Edge::new(None, 1.0, 2)],
                _ => vec![],
            }
        }
        let h = |n: &u32| if *n == 2 { 0.0 } else { 1.0 };
        let engine = IdaStarSearch::new(cyclic, h, None);
        let outcome = engine.run(0, |_| {});
        assert_eq!(outcome.path().unwrap().cost, 2.0);
    }

    #[test]
    fn observer_sees_every_destination_on_the_returned_path() {
        use std::cell::RefCell;
        let visited: RefCell<Vec<u32>> = RefCell::new(Vec::new());
        let h = |n: &u32| if *n == 3 { 0.0 } else { 1.0 };
        let engine = IdaStarSearch::new(diamond, h, None);
        let outcome = engine.run(0, |n| visited.borrow_mut().push(*n));
        let path = outcome.path().unwrap();
        let seen = visited.borrow();
        for d in path.destinations() {
            assert!(seen.contains(d));
        }
    }

    #[test]
    fn running_the_same_search_twice_yields_equal_cost() {
        let h = |n: &u32| if *n == 3 { 0.0 } else { 1.0 };
        let engine = IdaStarSearch::new(diamond, h, None);
        let first = engine.run(0, |_| {});
        let second = engine.run(0, |_| {});
        assert_eq!(first.path().unwrap().cost, second.path().unwrap().cost);
    }
}
