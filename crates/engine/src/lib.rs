//! Match engine - round orchestration over a [`Board`](core::Board)
//!
//! The engine is single-threaded. Exactly one bot's move is being resolved at
//! any time, and players and observers only ever see immutable snapshots.
//!
//! # Module Structure
//!
//! - [`player`]: the [`Player`] trait, [`MoveReply`], [`RandomPlayer`]
//! - [`observer`]: the [`Observer`] trait plus tracing and recording observers
//! - [`resolver`]: [`MoveResolver`], the per-bot fault policy
//! - [`game_master`]: [`GameMaster`], the round scheduler
//! - [`config`]: [`MatchConfig`] from the environment
//!
//! # Example
//!
//! ```
//! use gridmatch_core::{GridBoard, DEFAULT_LAYOUT};
//! use gridmatch_engine::{FinishReason, GameMaster, RandomPlayer};
//!
//! let board = GridBoard::from_layout_str(DEFAULT_LAYOUT, 2).unwrap();
//! let mut gm = GameMaster::new(board, 10, 1);
//! gm.register_player(Box::new(RandomPlayer::new(1))).unwrap();
//! gm.register_player(Box::new(RandomPlayer::new(2))).unwrap();
//!
//! assert_eq!(gm.play().unwrap(), FinishReason::RoundsExhausted);
//! ```

pub mod config;
pub mod error;
pub mod game_master;
pub mod observer;
pub mod player;
pub mod resolver;

pub use gridmatch_core as core;
pub use gridmatch_types as types;

pub use config::MatchConfig;
pub use error::MatchError;
pub use game_master::{FinishReason, GameMaster, MatchState};
pub use observer::{Broadcast, Observer, RecordingObserver, TracingObserver};
pub use player::{MoveReply, Player, RandomPlayer};
pub use resolver::{other_team, MoveResolver, Resolution};
