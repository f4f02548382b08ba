//! Steepest descent local search.
//!
//! Not a shortest-path engine: there is no target rule and no optimality
//! guarantee. At each step the engine looks at every outgoing neighbour,
//! keeps the ones whose heuristic is no worse than the current node's, and
//! narrows that set to its minimum; ties are broken uniformly at random.
//! A run of non-improving (but non-worsening) side moves is bounded by
//! `max_sides`.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::error::ConstructionError;
use crate::{Edge, Graph, Heuristic, NodeValue};

pub struct SteepestDescent<N, G, H> {
    graph: G,
    heuristic: H,
    max_sides: u32,
    supplier: Option<Box<dyn Fn(&mut dyn RngCore) -> N>>,
}

impl<N, G, H> SteepestDescent<N, G, H>
where
    N: NodeValue,
    G: Graph<N>,
    H: Heuristic<N>,
{
    /// `max_sides >= 0`. `supplier` generates a random start node for
    /// callers that invoke `run` with `start: None`.
    pub fn new(
        graph: G,
        heuristic: H,
        supplier: Option<Box<dyn Fn(&mut dyn RngCore) -> N>>,
        max_sides: i64,
    ) -> Result<Self, ConstructionError> {
        if max_sides < 0 {
            return Err(ConstructionError::MaxSidesNegative {
                supplied: max_sides,
            });
        }
        Ok(Self {
            graph,
            heuristic,
            max_sides: u32::try_from(max_sides).expect("checked non-negative above"),
            supplier,
        })
    }

    /// Climb down from `start`, or from the random-node supplier if `start`
    /// is `None`. Returns the node where the descent got stuck: either no
    /// neighbour is as good as the current node, or `max_sides` consecutive
    /// non-improving moves were made.
    ///
    /// # Panics
    ///
    /// Panics if `start` is `None` and no supplier was given at construction.
    pub fn run(&self, start: Option<N>, rng: &mut dyn RngCore, mut on_visit: impl FnMut(&N)) -> N {
        let mut current = start.unwrap_or_else(|| {
            (self
                .supplier
                .as_ref()
                .expect("run called with no start and no random-node supplier configured"))(rng)
        });
        on_visit(&current);

        let mut sides = 0u32;
        loop {
            let h_current = self.heuristic.h(&current);
            let candidates: Vec<Edge<N>> = self
                .graph
                .outgoing_edges(&current)
                .into_iter()
                .filter(|edge| self.heuristic.h(&edge.destination) <= h_current)
                .collect();

            if candidates.is_empty() {
                tracing::debug!(sides, "steepest descent stuck: no non-worsening neighbour");
                return current;
            }

            let min_h = candidates
                .iter()
                .map(|edge| self.heuristic.h(&edge.destination))
                .fold(f64::INFINITY, f64::min);
            let best: Vec<Edge<N>> = candidates
                .into_iter()
                .filter(|edge| self.heuristic.h(&edge.destination) == min_h)
                .collect();

            let chosen = best
                .choose(rng)
                .expect("best is non-empty: candidates was non-empty and min_h is one of its values");
            let strictly_better = min_h < h_current;
            current = chosen.destination.clone();
            on_visit(&current);

            if !strictly_better {
                sides += 1;
                if sides >= self.max_sides {
                    tracing::debug!(sides, "steepest descent stopped: max_sides reached");
                    return current;
                }
            } else {
                sides = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// A strictly descending line 0..10, h = distance to 9.
    fn line(n: &u32) -> Vec<Edge<u32>> {
        let mut edges = Vec::new();
        if *n > 0 {
            edges.push(Edge::new(None, 1.0, n - 1));
        }
        if *n < 9 {
            edges.push(Edge::new(None, 1.0, n + 1));
        }
        edges
    }

    fn distance_to_nine(n: &u32) -> f64 {
        (9_i64 - i64::from(*n)).unsigned_abs() as f64
    }

    #[test]
    fn descends_to_the_unique_minimum() {
        let engine = SteepestDescent::new(line, distance_to_nine, None, 0).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let result = engine.run(Some(3), &mut rng, |_| {});
        assert_eq!(result, 9);
    }

    #[test]
    fn a_local_minimum_with_no_downhill_neighbour_is_returned_immediately() {
        // A V-shaped landscape around node 2: h(1) = h(2) = h(3) = 0, so a
        // descent that starts at the bottom has nowhere strictly better to
        // go and no side moves are allowed (max_sides = 0).
        fn flat_bottom(n: &u32) -> Vec<Edge<u32>> {
            match n {
                1 => vec![Edge::new(None, 1.0, 2)],
                2 => vec![Edge::new(None, 1.0, 1), Edge::new(None, 1.0, 3)],
                3 => vec![Edge::new(None, 1.0, 2)],
                _ => vec![],
            }
        }
        let h = |n: &u32| if (1..=3).contains(n) { 0.0 } else { 5.0 };
        let engine = SteepestDescent::new(flat_bottom, h, None, 0).unwrap();
        let mut rng = SmallRng::seed_from_u64(2);
        let result = engine.run(Some(2), &mut rng, |_| {});
        assert!((1..=3).contains(&result));
    }

    #[test]
    fn side_moves_are_bounded_by_max_sides() {
        // A perfectly flat landscape: every move is a side move, so the
        // descent must stop after exactly max_sides moves.
        fn ring(n: &u32) -> Vec<Edge<u32>> {
            vec![Edge::new(None, 1.0, (n + 1) % 4)]
        }
        let h = |_: &u32| 0.0;
        let engine = SteepestDescent::new(ring, h, None, 3).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let visited = std::cell::RefCell::new(Vec::new());
        let _ = engine.run(Some(0), &mut rng, |n| visited.borrow_mut().push(*n));
        // start + 3 side moves = 4 observed nodes
        assert_eq!(visited.borrow().len(), 4);
    }

    #[test]
    fn uses_the_supplier_when_no_start_is_given() {
        let engine = SteepestDescent::new(
            line,
            distance_to_nine,
            Some(Box::new(|_: &mut dyn RngCore| 0_u32)),
            0,
        )
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(4);
        let result = engine.run(None, &mut rng, |_| {});
        assert_eq!(result, 9);
    }

    #[test]
    fn negative_max_sides_is_rejected() {
        let err = SteepestDescent::new(line, distance_to_nine, None, -1).unwrap_err();
        assert_eq!(err, ConstructionError::MaxSidesNegative { supplied: -1 });
    }
}
