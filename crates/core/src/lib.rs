//! Core board module - the world model behind a match
//!
//! This crate contains everything the match engine needs to know about the
//! world and nothing about players, observers or networking.
//!
//! - **Deterministic**: Same layout and seed produce identical matches
//! - **Snapshot based**: Callers outside the engine only ever see
//!   [`BoardSnapshot`]s, which are immutable and cheap to clone
//!
//! # Module Structure
//!
//! - [`board`]: the [`Board`] trait, bots, teams, snapshots, legal moves
//! - [`layout`]: text maze parsing
//! - [`grid`]: [`GridBoard`], the reference board used by the binaries and tests
//! - [`rng`]: deterministic LCG used for fallback moves
//!
//! # Example
//!
//! ```
//! use gridmatch_core::{Board, GridBoard, DEFAULT_LAYOUT};
//! use gridmatch_types::Move;
//!
//! let mut board = GridBoard::from_layout_str(DEFAULT_LAYOUT, 2).unwrap();
//! let start = board.bots()[0].current_pos;
//!
//! let events = board.move_bot(0, Move::East).unwrap();
//! assert_eq!(events.len(), 1);
//! assert_ne!(board.bots()[0].current_pos, start);
//! ```

pub mod board;
pub mod grid;
pub mod layout;
pub mod rng;

pub use gridmatch_types as types;

// Re-export commonly used types for convenience
pub use board::{maze_legal_moves, Board, BoardSnapshot, Bot, IllegalMove, LegalMoves, Team};
pub use grid::GridBoard;
pub use layout::{Layout, LayoutError, DEFAULT_LAYOUT, MAX_DIMENSION};
pub use rng::SimpleRng;
