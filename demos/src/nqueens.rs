//! N-Queens fixture for steepest descent. Domain sample code, kept out of
//! the library package since it's specific to this one puzzle rather than
//! a general graph-search concern.

use rand::seq::SliceRandom;
use rand::RngCore;

use wayfind_core::Edge;

/// `board[row]` is the column of the queen in that row; one queen per row
/// and per column by construction, so only diagonal attacks need counting.
pub type Board = Vec<u8>;

/// Number of attacking queen pairs (diagonal only; row/column conflicts
/// are impossible by construction).
#[must_use]
pub fn conflicts(board: &Board) -> f64 {
    let n = board.len();
    let mut count = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            let (ci, cj) = (i64::from(board[i]), i64::from(board[j]));
            if (ci - cj).abs() == (i as i64 - j as i64).abs() {
                count += 1;
            }
        }
    }
    count as f64
}

/// Every pairwise row-swap of the current arrangement.
#[must_use]
pub fn successors(board: &Board) -> Vec<Edge<Board>> {
    let n = board.len();
    let mut out = Vec::with_capacity(n * (n.saturating_sub(1)) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let mut next = board.clone();
            next.swap(i, j);
            out.push(Edge::new(Some(format!("swap({i},{j})")), 1.0, next));
        }
    }
    out
}

/// Random-restart supplier for `SteepestDescent`: a uniformly random
/// permutation of `0..n`.
#[must_use]
pub fn random_board(n: u8) -> impl Fn(&mut dyn RngCore) -> Board {
    move |rng: &mut dyn RngCore| {
        let mut board: Board = (0..n).collect();
        board.shuffle(rng);
        board
    }
}
