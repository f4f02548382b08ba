//! A 10x10 grid maze fixture for breadth-first search.

use std::collections::HashSet;

use wayfind_adjacency::AdjacencyGraph;
use wayfind_core::Edge;

pub type Cell = (i32, i32);

/// A fixed-size 4-connected grid: every cell is walkable unless walled.
#[derive(Debug, Clone)]
pub struct Maze {
    walls: HashSet<Cell>,
    width: i32,
    height: i32,
}

impl Maze {
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            walls: HashSet::new(),
            width,
            height,
        }
    }

    pub fn add_wall(&mut self, cell: Cell) -> &mut Self {
        self.walls.insert(cell);
        self
    }

    #[must_use]
    pub fn is_open(&self, cell: Cell) -> bool {
        let (x, y) = cell;
        x >= 0 && x < self.width && y >= 0 && y < self.height && !self.walls.contains(&cell)
    }

    #[must_use]
    pub fn successors(&self, cell: &Cell) -> Vec<Edge<Cell>> {
        let (x, y) = *cell;
        [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)]
            .into_iter()
            .filter(|c| self.is_open(*c))
            .map(|c| Edge::new(None, 1.0, c))
            .collect()
    }

    /// Bake every open cell's successors into an explicit [`AdjacencyGraph`]
    /// instead of expanding them lazily. Useful once a maze is fixed and
    /// gets searched many times, since it amortises wall lookups at build
    /// time rather than repeating them on every `outgoing_edges` call.
    #[must_use]
    pub fn to_adjacency_graph(&self) -> AdjacencyGraph<Cell> {
        let mut graph = AdjacencyGraph::new();
        tracing::debug!(width = self.width, height = self.height, "baking maze into adjacency graph");
        for x in 0..self.width {
            for y in 0..self.height {
                let cell = (x, y);
                if !self.is_open(cell) {
                    continue;
                }
                for edge in self.successors(&cell) {
                    graph.add_edge(cell, edge.label, edge.weight, edge.destination);
                }
            }
        }
        graph
    }
}

/// The grid fixture referenced by the BFS scenario: a single corridor at
/// `x == 4` flanked by walls, so the only route from `start()` to
/// `target()` is the straight run of 8 steps the scenario expects.
#[must_use]
pub fn reference_fixture() -> Maze {
    let mut maze = Maze::new(10, 10);
    for y in 0..10 {
        if (1..9).contains(&y) {
            maze.add_wall((3, y));
            maze.add_wall((5, y));
        }
    }
    maze
}

#[must_use]
pub fn start() -> Cell {
    (4, 1)
}

#[must_use]
pub fn target() -> Cell {
    (4, 9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfind_core::bfs::BreadthFirstSearch;
    use wayfind_core::TargetRule;

    #[test]
    fn corridor_is_open_end_to_end() {
        let maze = reference_fixture();
        for y in 1..=9 {
            assert!(maze.is_open((4, y)), "corridor cell (4,{y}) must be walkable");
        }
    }

    #[test]
    fn bfs_finds_the_corridor() {
        let maze = reference_fixture();
        let engine =
            BreadthFirstSearch::new(|c: &Cell| maze.successors(c), TargetRule::predicate(|c: &Cell| *c == target()));
        let outcome = engine.run(start(), |_| {});
        let path = outcome.path().unwrap();
        assert_eq!(path.len(), 8);
        for cell in path.destinations() {
            assert!(maze.is_open(*cell));
        }
    }

    #[test]
    fn adjacency_graph_agrees_with_lazy_successors() {
        let maze = reference_fixture();
        let graph = maze.to_adjacency_graph();
        let engine = BreadthFirstSearch::new(graph, TargetRule::predicate(|c: &Cell| *c == target()));
        let outcome = engine.run(start(), |_| {});
        assert_eq!(outcome.path().unwrap().len(), 8);
    }
}
