//! One game: a 4x4 board, the RNG that feeds the spawner, and the
//! `Playing` -> `GameOver` latch.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Rules;
use crate::engine::{Board, BoardError, Direction, Spawn};
use crate::sink::CellSink;

pub const BOARD_WIDTH: usize = 4;
pub const BOARD_HEIGHT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
}

/// Result of one accepted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub direction: Direction,
    pub changed: bool,
    pub spawned: Option<Spawn>,
    /// Phase after the termination check.
    pub phase: Phase,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The game is over; input is ignored.
    Frozen,
    /// No direction this tick.
    Idle,
    Turn(Turn),
}

pub struct Game<S: CellSink, R: Rng> {
    board: Board<S>,
    rng: R,
    rules: Rules,
    phase: Phase,
    turns: u64,
}

impl<S: CellSink> Game<S, StdRng> {
    /// New game whose tile stream is fully determined by `seed`.
    pub fn seeded(sink: S, seed: u64, rules: Rules) -> Result<Self, BoardError> {
        Self::new(sink, StdRng::seed_from_u64(seed), rules)
    }
}

impl<S: CellSink, R: Rng> Game<S, R> {
    /// Fresh 4x4 board with `rules.start_tiles` spawned tiles.
    pub fn new(sink: S, rng: R, rules: Rules) -> Result<Self, BoardError> {
        let board = Board::new(BOARD_WIDTH, BOARD_HEIGHT, sink)?;
        let mut game = Self::with_board(board, rng, rules);
        for _ in 0..game.rules.start_tiles {
            game.board
                .spawn_tile(&mut game.rng, game.rules.spawn_region, game.rules.spawn_attempts)?;
        }
        Ok(game)
    }

    /// Wrap an existing board. The game starts `Playing` whatever the board
    /// holds; the latch only trips after a turn.
    pub fn with_board(board: Board<S>, rng: R, rules: Rules) -> Self {
        Self {
            board,
            rng,
            rules,
            phase: Phase::Playing,
            turns: 0,
        }
    }

    /// Run one tick: shift, spawn if anything moved, then check for the end.
    pub fn step(&mut self, input: Option<Direction>) -> Result<Step, BoardError> {
        if self.phase == Phase::GameOver {
            return Ok(Step::Frozen);
        }
        let Some(direction) = input else {
            return Ok(Step::Idle);
        };

        let changed = self.board.shift(direction, self.rules.merge_scan)?;
        let spawned = if changed {
            self.board
                .spawn_tile(&mut self.rng, self.rules.spawn_region, self.rules.spawn_attempts)?
        } else {
            None
        };
        self.turns += 1;

        if self.board.is_game_over(self.rules.adjacency_scan) {
            self.phase = Phase::GameOver;
            info!(
                "game over after {} turns, highest tile {}",
                self.turns,
                self.board.highest_tile()
            );
        }

        Ok(Step::Turn(Turn {
            direction,
            changed,
            spawned,
            phase: self.phase,
        }))
    }

    pub fn board(&self) -> &Board<S> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<S> {
        &mut self.board
    }

    pub fn into_board(self) -> Board<S> {
        self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Accepted inputs so far, including ones that changed nothing.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }
}
