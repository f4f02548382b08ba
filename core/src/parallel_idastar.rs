//! Parallel IDA*: per-worker stacks, work stealing, and Dijkstra–Safra
//! token-ring termination detection.
//!
//! # Simplifications recorded against the design described in `DESIGN.md`
//!
//! - Each `run` call spawns exactly `worker_count` threads via
//!   [`std::thread::scope`] and joins them before the iteration boundary,
//!   rather than drawing from a persistent process-wide pool with
//!   idle-cooldown eviction. The pool lifecycle is a performance knob, not
//!   a correctness condition.
//! - A worker's stack, `head`, and `excDepth` are guarded by one shared
//!   `Mutex` instead of lock-free atomic reads with separately-locked
//!   writes. Concurrent steal-vs-pop races are serialized away by that
//!   single mutex; the one adjustment still needed is clamping `excDepth`
//!   after the owner's own pop shrinks the buffer below a previously
//!   published window.
//! - A stolen range is *copied*, not drained, from the victim's stack: the
//!   victim advances `head` past it and never revisits those slots, so the
//!   physically-retained copies are inert. Entries are [`LineageId`]
//!   (`usize`), so this costs nothing beyond a few stale slots per
//!   iteration and avoids the index-renumbering that an in-place drain
//!   would otherwise force on every concurrent reader of `excDepth`.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::ConstructionError;
use crate::lineage::{LineageArena, LineageId};
use crate::{is_target, Graph, Heuristic, NodeValue, SearchOutcome, TargetRule};

const WHITE: u8 = 0;
const BLACK: u8 = 1;

/// Largest `worker_count` the token-ring identities (stored as `u8`) can
/// address without wrapping.
const MAX_WORKERS: usize = 255;

/// An unrecoverable failure inside a worker thread, re-thrown from `run`.
/// The engine makes no attempt to retry.
#[derive(Debug)]
pub struct WorkerFault {
    pub message: String,
}

impl std::fmt::Display for WorkerFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parallel IDA* worker panicked: {}", self.message)
    }
}

impl std::error::Error for WorkerFault {}

struct WorkerShared {
    stack: Vec<LineageId>,
    head: usize,
    exc_depth: usize,
}

struct Worker {
    shared: Mutex<WorkerShared>,
    colour: AtomicU8,
    next_bound: Mutex<f64>,
}

impl Worker {
    fn idle() -> Self {
        Self {
            shared: Mutex::new(WorkerShared {
                stack: Vec::new(),
                head: 0,
                exc_depth: 0,
            }),
            colour: AtomicU8::new(WHITE),
            next_bound: Mutex::new(f64::INFINITY),
        }
    }

    fn has_own_work(&self) -> bool {
        let g = self.shared.lock().expect("worker mutex poisoned");
        g.stack.len() > g.head
    }
}

/// Shared state for one bound iteration.
struct IterationState<N> {
    arena: Mutex<LineageArena<N>>,
    workers: Vec<Worker>,
    quit: AtomicBool,
    solution: Mutex<Option<LineageId>>,
    token_holder: AtomicU8,
    token_colour: AtomicU8,
}

pub struct ParallelIdaStar<N, G, H> {
    graph: G,
    heuristic: H,
    target: TargetRule<N>,
    worker_count: usize,
}

impl<N, G, H> ParallelIdaStar<N, G, H>
where
    N: NodeValue + Send + Sync,
    G: Graph<N> + Sync,
    H: Heuristic<N> + Sync,
{
    pub fn new(
        graph: G,
        heuristic: H,
        target: Option<TargetRule<N>>,
        worker_count: usize,
    ) -> Result<Self, ConstructionError> {
        if worker_count == 0 {
            return Err(ConstructionError::WorkerCountNotPositive {
                supplied: worker_count as i64,
            });
        }
        if worker_count > MAX_WORKERS {
            return Err(ConstructionError::WorkerCountTooLarge {
                supplied: worker_count as i64,
            });
        }
        Ok(Self {
            graph,
            heuristic,
            target: target.unwrap_or(TargetRule::HeuristicZero),
            worker_count,
        })
    }

    /// Run the search from `start`. `on_visit` may be called concurrently
    /// from any worker thread and must not mutate graph topology.
    pub fn run(
        &self,
        start: N,
        on_visit: impl Fn(&N) + Sync,
    ) -> Result<SearchOutcome<N>, WorkerFault> {
        let mut bound = self.heuristic.h(&start);
        if !bound.is_finite() {
            return Ok(SearchOutcome::NoPath);
        }

        loop {
            let mut arena: LineageArena<N> = LineageArena::new();
            let root_id = arena.push_root(start.clone());

            let workers: Vec<Worker> = (0..self.worker_count).map(|_| Worker::idle()).collect();
            {
                let mut w0 = workers[0].shared.lock().expect("fresh mutex");
                w0.stack.push(root_id);
            }
            let state = IterationState {
                arena: Mutex::new(arena),
                workers,
                quit: AtomicBool::new(false),
                solution: Mutex::new(None),
                token_holder: AtomicU8::new(0),
                token_colour: AtomicU8::new(BLACK),
            };

            let join_results: Vec<std::thread::Result<()>> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..self.worker_count)
                    .map(|me| {
                        let state = &state;
                        let on_visit = &on_visit;
                        scope.spawn(move || self.worker_loop(state, me, bound, on_visit))
                    })
                    .collect();
                handles.into_iter().map(|h| h.join()).collect()
            });

            for result in join_results {
                if let Err(payload) = result {
                    let message = panic_message(&payload);
                    return Err(WorkerFault { message });
                }
            }

            let solution = state.solution.into_inner().expect("mutex not poisoned");
            if let Some(goal_id) = solution {
                let arena = state.arena.into_inner().expect("mutex not poisoned");
                return Ok(SearchOutcome::Found(arena.reconstruct(goal_id)));
            }

            let next_bound = state
                .workers
                .iter()
                .map(|w| *w.next_bound.lock().expect("worker mutex poisoned"))
                .fold(f64::INFINITY, f64::min);

            if !next_bound.is_finite() {
                return Ok(SearchOutcome::NoPath);
            }
            bound = next_bound;
            tracing::debug!(bound, "parallel idastar raising bound");
        }
    }

    fn worker_loop(
        &self,
        state: &IterationState<N>,
        me: usize,
        bound: f64,
        on_visit: &(impl Fn(&N) + Sync),
    ) {
        loop {
            if state.quit.load(Ordering::Acquire) {
                return;
            }
            if state
                .solution
                .lock()
                .expect("solution mutex poisoned")
                .is_some()
            {
                return;
            }

            if state.workers[me].has_own_work() {
                self.bounded_dfs_step(state, me, bound, on_visit);
            } else if !self.try_steal(state, me) {
                self.participate_in_termination(state, me);
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    }

    /// One bounded-DFS step on the worker's own stack.
    fn bounded_dfs_step(
        &self,
        state: &IterationState<N>,
        me: usize,
        bound: f64,
        on_visit: &(impl Fn(&N) + Sync),
    ) {
        let cur_id = {
            let mut g = state.workers[me].shared.lock().expect("worker mutex poisoned");
            let Some(id) = g.stack.pop() else { return };
            // Popping can shrink the stack below a previously published
            // excDepth (nothing about a steal is involved here); keep the
            // stealable window inside the physical buffer.
            let len = g.stack.len();
            if g.exc_depth > len {
                g.exc_depth = len;
            }
            id
        };

        let (value, g_cost) = {
            let arena = state.arena.lock().expect("arena mutex poisoned");
            let entry = arena.get(cur_id);
            (entry.value.clone(), entry.g)
        };
        let h = self.heuristic.h(&value);
        let f = g_cost + h;

        if f > bound {
            let mut nb = state.workers[me]
                .next_bound
                .lock()
                .expect("worker mutex poisoned");
            if f < *nb {
                *nb = f;
            }
            return;
        }

        on_visit(&value);
        tracing::trace!(worker = me, f, bound, "parallel idastar step");

        if is_target(&self.target, &value, h) {
            *state.solution.lock().expect("solution mutex poisoned") = Some(cur_id);
            return;
        }

        let mut new_ids = Vec::new();
        for edge in self.graph.outgoing_edges(&value) {
            let is_ancestor = {
                let arena = state.arena.lock().expect("arena mutex poisoned");
                arena.is_ancestor(cur_id, &edge.destination)
            };
            if is_ancestor {
                continue;
            }
            let dest_g = g_cost + edge.weight;
            let mut arena = state.arena.lock().expect("arena mutex poisoned");
            new_ids.push(arena.push(cur_id, edge, dest_g));
        }

        let mut g = state.workers[me].shared.lock().expect("worker mutex poisoned");
        g.stack.extend(new_ids);
        let depth = g.stack.len();
        g.exc_depth = g.exc_depth.max((depth + g.head) / 2);
    }

    /// Probe up to `min(3, W-1)` neighbours in a fixed rotation.
    fn try_steal(&self, state: &IterationState<N>, me: usize) -> bool {
        let w = state.workers.len();
        let attempts = 3.min(w.saturating_sub(1));
        for offset in 1..=attempts {
            let victim = (me + offset) % w;
            let stolen = {
                let mut v = state.workers[victim]
                    .shared
                    .lock()
                    .expect("worker mutex poisoned");
                if v.exc_depth <= v.head {
                    continue;
                }
                let stolen: Vec<LineageId> = v.stack[v.head..v.exc_depth].to_vec();
                v.head = v.exc_depth;
                stolen
            };

            if me > victim {
                state.workers[victim].colour.store(BLACK, Ordering::Release);
            }

            let mut mine = state.workers[me]
                .shared
                .lock()
                .expect("worker mutex poisoned");
            mine.stack.extend(stolen);
            let depth = mine.stack.len();
            mine.exc_depth = mine.exc_depth.max((depth + mine.head) / 2);
            tracing::trace!(thief = me, victim, "parallel idastar steal");
            return true;
        }
        false
    }

    /// Dijkstra–Safra token-ring termination detection.
    fn participate_in_termination(&self, state: &IterationState<N>, me: usize) {
        let w = state.workers.len();
        if state.token_holder.load(Ordering::Acquire) as usize != me {
            return;
        }

        if me == 0 {
            let token_white = state.token_colour.load(Ordering::Acquire) == WHITE;
            let own_white = state.workers[0].colour.load(Ordering::Acquire) == WHITE;
            if token_white && own_white {
                state.quit.store(true, Ordering::Release);
                tracing::debug!("parallel idastar termination detected");
            } else {
                state.token_colour.store(WHITE, Ordering::Release);
                state.workers[0].colour.store(WHITE, Ordering::Release);
                #[allow(clippy::cast_possible_truncation)]
                state
                    .token_holder
                    .store((w - 1) as u8, Ordering::Release);
            }
        } else {
            if state.workers[me].colour.load(Ordering::Acquire) == BLACK {
                state.token_colour.store(BLACK, Ordering::Release);
            }
            state.workers[me].colour.store(WHITE, Ordering::Release);
            #[allow(clippy::cast_possible_truncation)]
            state
                .token_holder
                .store((me - 1) as u8, Ordering::Release);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idastar::IdaStarSearch;
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
    fn matches_serial_idastar_cost_on_a_small_graph() {
        let h = |n: &u32| if *n == 3 { 0.0 } else { 1.0 };
        let serial = IdaStarSearch::new(diamond, h, None);
        let serial_cost = serial.run(0, |_| {}).path().unwrap().cost;

        let parallel = ParallelIdaStar::new(diamond, h, None, 4).unwrap();
        let outcome = parallel.run(0, |_| {}).unwrap();
        assert_eq!(outcome.path().unwrap().cost, serial_cost);
    }

    #[test]
    fn single_worker_matches_serial_idastar() {
        let h = |n: &u32| if *n == 3 { 0.0 } else { 1.0 };
        let parallel = ParallelIdaStar::new(diamond, h, None, 1).unwrap();
        let outcome = parallel.run(0, |_| {}).unwrap();
        assert_eq!(outcome.path().unwrap().cost, 2.0);
    }

    #[test]
    fn no_path_terminates_and_returns_sentinel() {
        fn empty(_: &u32) -> Vec<Edge<u32>> {
            vec![]
        }
        let h = |n: &u32| if *n == 99 { 0.0 } else { 1.0 };
        let engine = ParallelIdaStar::new(empty, h, None, 4).unwrap();
        assert_eq!(engine.run(0, |_| {}).unwrap(), SearchOutcome::NoPath);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let h = |_: &u32| 0.0;
        let err = ParallelIdaStar::new(diamond, h, None, 0).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::WorkerCountNotPositive { supplied: 0 }
        );
    }

    #[test]
    fn worker_count_above_255_is_rejected() {
        let h = |_: &u32| 0.0;
        let err = ParallelIdaStar::new(diamond, h, None, 300).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::WorkerCountTooLarge { supplied: 300 }
        );
    }

    #[test]
    fn larger_instance_terminates_with_correct_cost() {
        // A wider branching graph so stealing actually has something to
        // move around: a depth-4 binary tree converging on a single sink.
        fn wide(n: &u32) -> Vec<Edge<u32>> {
            if *n == 0 {
                return vec![];
            }
            if *n < 16 {
                vec![Edge::new(None, 1.0, n * 2), Edge::new(None, 1.0, n * 2 + 1)]
            } else {
                vec![Edge::new(None, 1.0, 0)]
            }
        }
        let h = |n: &u32| if *n == 0 { 0.0 } else { 1.0 };
        let serial = IdaStarSearch::new(wide, h, None);
        let serial_cost = serial.run(1, |_| {}).path().unwrap().cost;

        let parallel = ParallelIdaStar::new(wide, h, None, 4).unwrap();
        let outcome = parallel.run(1, |_| {}).unwrap();
        assert_eq!(outcome.path().unwrap().cost, serial_cost);
    }

    #[test]
    fn observer_sees_every_destination_on_the_returned_path() {
        use std::sync::Mutex as StdMutex;
        let h = |n: &u32| if *n == 3 { 0.0 } else { 1.0 };
        let visited: StdMutex<Vec<u32>> = StdMutex::new(Vec::new());
        let parallel = ParallelIdaStar::new(diamond, h, None, 4).unwrap();
        let outcome = parallel
            .run(0, |n| visited.lock().unwrap().push(*n))
            .unwrap();
        let path = outcome.path().unwrap();
        let seen = visited.lock().unwrap();
        for d in path.destinations() {
            assert!(seen.contains(d));
        }
    }

    #[test]
    fn running_the_same_search_twice_yields_equal_cost() {
        let h = |n: &u32| if *n == 3 { 0.0 } else { 1.0 };
        let parallel = ParallelIdaStar::new(diamond, h, None, 4).unwrap();
        let first = parallel.run(0, |_| {}).unwrap();
        let second = parallel.run(0, |_| {}).unwrap();
        assert_eq!(first.path().unwrap().cost, second.path().unwrap().cost);
    }
}
