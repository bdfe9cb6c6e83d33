//! Engine module: the tile grid, the move engine, the spawner and the
//! termination check.
//!
//! - `Board` is the grid plus its display sink, with checked cell access.
//! - `shift`, `try_spawn_tile`/`spawn_tile` and `is_game_over` live in `ops`
//!   as methods on `Board`, parameterised by the rule enums.
//! - The rule enums default to the reference behaviour; the alternative
//!   variants are the corrected engine.

mod ops;
mod state;

pub use ops::{AdjacencyScan, MergeScan, Spawn, SpawnRegion};
pub use state::{Board, BoardError, Direction};
