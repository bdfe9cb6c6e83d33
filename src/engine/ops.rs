use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Board, BoardError, Direction, Tile};
use crate::sink::CellSink;

/// How a move walks the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeScan {
    /// Row-major scan regardless of direction, tiles carried forward as they
    /// slide, at most one retry pass when the first changes nothing.
    #[default]
    Reference,
    /// Scan from the edge tiles move towards, lock merged tiles for the rest
    /// of the move, repeat passes until nothing changes.
    Fixpoint,
}

/// Where the spawner draws candidate cells from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnRegion {
    /// `[0, width-1) x [0, height-1)`: the last column and row are never drawn.
    #[default]
    Reference,
    FullBoard,
}

impl SpawnRegion {
    #[inline]
    fn extent(self, width: usize, height: usize) -> (usize, usize) {
        match self {
            SpawnRegion::Reference => (width - 1, height - 1),
            SpawnRegion::FullBoard => (width, height),
        }
    }
}

/// Which adjacent pairs the termination check looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyScan {
    /// Symmetric `i`/`j` scan over `[0, width-1) x [0, height-1)`. Misses
    /// vertical pairs in the last column and horizontal pairs in the last row.
    #[default]
    Reference,
    Full,
}

/// A tile placed by the spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub x: usize,
    pub y: usize,
    pub value: Tile,
}

impl<S: CellSink> Board<S> {
    /// Slide/merge tiles in `dir`. Returns whether any cell changed.
    ///
    /// ```
    /// use console_2048::engine::{Board, Direction, MergeScan};
    /// use console_2048::sink::NullSink;
    /// let mut b = Board::from_rows(&[[2, 2, 2, 2]], NullSink).unwrap();
    /// assert!(b.shift(Direction::Left, MergeScan::Reference).unwrap());
    /// assert_eq!(b.rows(), vec![vec![4, 4, 0, 0]]);
    /// ```
    pub fn shift(&mut self, dir: Direction, scan: MergeScan) -> Result<bool, BoardError> {
        let changed = match scan {
            MergeScan::Reference => {
                let mut changed = self.reference_pass(dir)?;
                if !changed {
                    changed = self.reference_pass(dir)?;
                }
                changed
            }
            MergeScan::Fixpoint => {
                let mut locked = vec![false; self.width() * self.height()];
                let mut changed = false;
                while self.ordered_pass(dir, &mut locked)? {
                    changed = true;
                }
                changed
            }
        };
        debug!("shift {dir}: changed={changed}");
        Ok(changed)
    }

    fn reference_pass(&mut self, dir: Direction) -> Result<bool, BoardError> {
        let (dx, dy) = dir.delta();
        let mut changed = false;
        for x in 0..self.width() {
            for y in 0..self.height() {
                let tile = self.get(x, y)?;
                if tile == 0 {
                    continue;
                }
                let (mut cx, mut cy) = (x, y);
                while let Some((nx, ny)) = self.neighbour(cx, cy, dx, dy) {
                    let dest = self.get(nx, ny)?;
                    if dest == 0 {
                        self.set(nx, ny, tile)?;
                        self.set(cx, cy, 0)?;
                        changed = true;
                        (cx, cy) = (nx, ny);
                    } else if dest == tile {
                        self.set(nx, ny, doubled(tile)?)?;
                        self.set(cx, cy, 0)?;
                        changed = true;
                        break;
                    } else {
                        break;
                    }
                }
            }
        }
        Ok(changed)
    }

    fn ordered_pass(&mut self, dir: Direction, locked: &mut [bool]) -> Result<bool, BoardError> {
        let (dx, dy) = dir.delta();
        let (width, height) = (self.width(), self.height());
        let xs: Vec<usize> = if dx > 0 { (0..width).rev().collect() } else { (0..width).collect() };
        let ys: Vec<usize> = if dy > 0 { (0..height).rev().collect() } else { (0..height).collect() };
        let mut changed = false;
        for &y in &ys {
            for &x in &xs {
                let tile = self.get(x, y)?;
                if tile == 0 {
                    continue;
                }
                let (mut cx, mut cy) = (x, y);
                while let Some((nx, ny)) = self.neighbour(cx, cy, dx, dy) {
                    let (cur, next) = (cy * width + cx, ny * width + nx);
                    let dest = self.get(nx, ny)?;
                    if dest == 0 {
                        self.set(nx, ny, tile)?;
                        self.set(cx, cy, 0)?;
                        locked[next] = locked[cur];
                        locked[cur] = false;
                        changed = true;
                        (cx, cy) = (nx, ny);
                    } else if dest == tile && !locked[next] && !locked[cur] {
                        self.set(nx, ny, doubled(tile)?)?;
                        self.set(cx, cy, 0)?;
                        locked[next] = true;
                        locked[cur] = false;
                        changed = true;
                        break;
                    } else {
                        break;
                    }
                }
            }
        }
        Ok(changed)
    }

    /// Place a 2 (90%) or 4 (10%) into a random empty cell.
    ///
    /// Draws up to `attempts` cells from `region`; if none of them is empty,
    /// falls back to a uniform choice over every empty cell on the board.
    /// Fails with [`BoardError::SpawnStarvation`] when the board is full.
    pub fn try_spawn_tile<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        region: SpawnRegion,
        attempts: u32,
    ) -> Result<Spawn, BoardError> {
        let (rw, rh) = region.extent(self.width(), self.height());
        if rw > 0 && rh > 0 {
            for _ in 0..attempts {
                let x = rng.gen_range(0..rw);
                let y = rng.gen_range(0..rh);
                if self.get(x, y)? == 0 {
                    return self.place(x, y, rng);
                }
            }
        }
        let empty = self.empty_cells();
        let &(x, y) = empty.choose(rng).ok_or(BoardError::SpawnStarvation)?;
        debug!("spawn region {region:?} exhausted after {attempts} draws; using full-board scan");
        self.place(x, y, rng)
    }

    /// Like [`Board::try_spawn_tile`], but a full board is a logged no-op.
    pub fn spawn_tile<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        region: SpawnRegion,
        attempts: u32,
    ) -> Result<Option<Spawn>, BoardError> {
        match self.try_spawn_tile(rng, region, attempts) {
            Ok(spawn) => Ok(Some(spawn)),
            Err(BoardError::SpawnStarvation) => {
                warn!("no empty cell to spawn into; skipping spawn");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn place<R: Rng + ?Sized>(&mut self, x: usize, y: usize, rng: &mut R) -> Result<Spawn, BoardError> {
        let value = generate_random_tile(rng);
        self.set(x, y, value)?;
        debug!("spawned {value} at ({x}, {y})");
        Ok(Spawn { x, y, value })
    }
}

impl<S> Board<S> {
    /// True when the board is full and no adjacent pair covered by `scan`
    /// holds equal values.
    ///
    /// ```
    /// use console_2048::engine::{AdjacencyScan, Board};
    /// use console_2048::sink::NullSink;
    /// let b = Board::from_rows(&[[2, 4], [4, 2]], NullSink).unwrap();
    /// assert!(b.is_game_over(AdjacencyScan::Full));
    /// ```
    pub fn is_game_over(&self, scan: AdjacencyScan) -> bool {
        if self.count_empty() > 0 {
            return false;
        }
        let (width, height) = (self.width(), self.height());
        match scan {
            AdjacencyScan::Reference => {
                for i in 0..width - 1 {
                    for j in 0..height - 1 {
                        if self.value_at(i, j) == self.value_at(i, j + 1) {
                            return false;
                        }
                        // Transposed pair; falls off non-square boards.
                        if let (Some(a), Some(b)) = (self.value_at(j, i), self.value_at(j + 1, i)) {
                            if a == b {
                                return false;
                            }
                        }
                    }
                }
                true
            }
            AdjacencyScan::Full => {
                for (x, y, v) in self.cells() {
                    if self.value_at(x + 1, y) == Some(v) || self.value_at(x, y + 1) == Some(v) {
                        return false;
                    }
                }
                true
            }
        }
    }
}

#[inline]
fn doubled(tile: Tile) -> Result<Tile, BoardError> {
    tile.checked_mul(2)
        .ok_or(BoardError::TileOverflow { value: tile })
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 { 2 } else { 4 }
}
