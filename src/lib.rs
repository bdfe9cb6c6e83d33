//! console-2048: a minimal 4x4 2048 game.
//!
//! This crate provides:
//! - A `Board` grid with checked cell access that mirrors every write into a
//!   display sink (`engine`, `sink`)
//! - The move engine, tile spawner and termination check as `Board` methods,
//!   with switchable reference/corrected behaviour (`engine`, `config`)
//! - A `Game` session running the move -> spawn -> check cycle per input
//!   (`session`, `input`)
//! - A crossterm front end (`tui`)
//!
//! Quick start:
//! ```
//! use console_2048::config::Rules;
//! use console_2048::engine::Direction;
//! use console_2048::session::{Game, Step};
//! use console_2048::sink::NullSink;
//!
//! // Deterministic game with the reference rules
//! let mut game = Game::seeded(NullSink, 42, Rules::default()).unwrap();
//! assert_eq!(game.board().count_empty(), 14);
//!
//! // One tick per input; `None` means no key this tick
//! assert_eq!(game.step(None).unwrap(), Step::Idle);
//! let step = game.step(Some(Direction::Left)).unwrap();
//! assert!(matches!(step, Step::Turn(_)));
//! ```
//!
//! Driving the board directly:
//! ```
//! use console_2048::engine::{AdjacencyScan, Board, Direction, MergeScan};
//! use console_2048::sink::Recorder;
//!
//! let mut board = Board::new(4, 4, Recorder::default()).unwrap();
//! board.set(0, 0, 2).unwrap();
//! board.set(1, 0, 2).unwrap();
//! assert!(board.shift(Direction::Left, MergeScan::Reference).unwrap());
//! assert_eq!(board.get(0, 0).unwrap(), 4);
//! assert!(!board.is_game_over(AdjacencyScan::Reference));
//! ```
pub mod config;
pub mod engine;
pub mod input;
pub mod session;
pub mod sink;
pub mod tui;
