//! Worked fixtures exercising `wayfind-core`'s engines: sliding-tile
//! puzzles, a maze, and N-Queens. None of this is part of the search
//! library itself — it exists so the engines have something concrete to
//! run against in `tests/`.

#![forbid(unsafe_code)]

pub mod maze;
pub mod npuzzle;
pub mod nqueens;
