//! Sliding-tile puzzle fixture (8-puzzle, 15-puzzle, ...) over `wayfind-core`.
//!
//! Tiles are stored row-major with `0` standing in for the blank. The goal
//! configuration is `1, 2, .., side*side - 1, 0`.

use wayfind_core::Edge;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    tiles: Vec<u8>,
    side: usize,
}

impl Board {
    /// # Panics
    ///
    /// Panics if `tiles.len()` is not a perfect square.
    #[must_use]
    pub fn new(tiles: Vec<u8>) -> Self {
        let side = (tiles.len() as f64).sqrt().round() as usize;
        assert_eq!(side * side, tiles.len(), "board must be square");
        Self { tiles, side }
    }

    #[must_use]
    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    #[must_use]
    pub fn side(&self) -> usize {
        self.side
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        let last = self.tiles.len() - 1;
        self.tiles
            .iter()
            .enumerate()
            .all(|(i, &tile)| if i == last { tile == 0 } else { usize::from(tile) == i + 1 })
    }

    fn blank_index(&self) -> usize {
        self.tiles
            .iter()
            .position(|&t| t == 0)
            .expect("every board has exactly one blank")
    }

    fn swapped(&self, a: usize, b: usize) -> Self {
        let mut tiles = self.tiles.clone();
        tiles.swap(a, b);
        Self {
            tiles,
            side: self.side,
        }
    }
}

/// Blank-move successors: up/down/left/right, weight 1.
#[must_use]
pub fn successors(board: &Board) -> Vec<Edge<Board>> {
    let side = board.side;
    let blank = board.blank_index();
    let (row, col) = (blank / side, blank % side);
    let mut out = Vec::with_capacity(4);
    if row > 0 {
        out.push(Edge::new(Some("up".to_string()), 1.0, board.swapped(blank, blank - side)));
    }
    if row + 1 < side {
        out.push(Edge::new(
            Some("down".to_string()),
            1.0,
            board.swapped(blank, blank + side),
        ));
    }
    if col > 0 {
        out.push(Edge::new(Some("left".to_string()), 1.0, board.swapped(blank, blank - 1)));
    }
    if col + 1 < side {
        out.push(Edge::new(
            Some("right".to_string()),
            1.0,
            board.swapped(blank, blank + 1),
        ));
    }
    out
}

/// Sum of Manhattan distances of every non-blank tile from its goal cell.
/// Admissible and consistent: a single blank move changes at most one
/// tile's distance, by exactly one.
#[must_use]
pub fn manhattan_distance(board: &Board) -> f64 {
    let side = board.side;
    let mut total = 0usize;
    for (i, &tile) in board.tiles.iter().enumerate() {
        if tile == 0 {
            continue;
        }
        let target = usize::from(tile) - 1;
        let (row, col) = (i / side, i % side);
        let (target_row, target_col) = (target / side, target % side);
        total += row.abs_diff(target_row) + col.abs_diff(target_col);
    }
    total as f64
}

/// Count of tiles not in their goal cell (ignoring the blank). Admissible
/// and consistent, but a much weaker lower bound than Manhattan distance.
#[must_use]
pub fn out_of_place(board: &Board) -> f64 {
    let last = board.tiles.len() - 1;
    board
        .tiles
        .iter()
        .enumerate()
        .filter(|&(i, &tile)| if i == last { tile != 0 } else { usize::from(tile) != i + 1 })
        .count() as f64
}

#[must_use]
pub fn is_solved_target(board: &Board) -> bool {
    board.is_solved()
}
