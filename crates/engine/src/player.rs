//! Player module - the per-team agent channel
//!
//! A [`Player`] controls every bot of one team. The engine asks it for one
//! move at a time and never waits on more than one request at once.
//!
//! Faults are reported as data: [`MoveReply::Timeout`],
//! [`MoveReply::Disconnected`] and [`MoveReply::IllegalMove`] are ordinary
//! values the resolver matches on.

use crate::core::{BoardSnapshot, SimpleRng};
use crate::types::{BotIndex, Move};

/// Outcome of one move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveReply {
    /// The player proposed a move. It may still be rejected by the board.
    Move(Move),
    /// The player did not answer within its budget.
    Timeout,
    /// The player is gone for good.
    Disconnected,
    /// The player answered with something that is not a usable move.
    IllegalMove,
}

/// The engine-facing side of a player.
///
/// Remote implementations block inside [`Player::get_move`] until a reply
/// arrives or their own timeout expires.
pub trait Player {
    /// Bot indices this player controls. Called once at registration.
    fn set_bot_ids(&mut self, ids: &[BotIndex]);

    /// Starting state. Called once at registration, after `set_bot_ids`.
    fn set_initial(&mut self, board: &BoardSnapshot);

    fn get_move(&mut self, bot: BotIndex, board: &BoardSnapshot) -> MoveReply;

    /// Called once when the match is over.
    fn finish(&mut self) {}
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn set_bot_ids(&mut self, ids: &[BotIndex]) {
        (**self).set_bot_ids(ids)
    }

    fn set_initial(&mut self, board: &BoardSnapshot) {
        (**self).set_initial(board)
    }

    fn get_move(&mut self, bot: BotIndex, board: &BoardSnapshot) -> MoveReply {
        (**self).get_move(bot, board)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}

/// Picks uniformly among legal moves, preferring to keep moving.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    rng: SimpleRng,
}

impl RandomPlayer {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn set_bot_ids(&mut self, _ids: &[BotIndex]) {}

    fn set_initial(&mut self, _board: &BoardSnapshot) {}

    fn get_move(&mut self, bot: BotIndex, board: &BoardSnapshot) -> MoveReply {
        let Some(me) = board.bot(bot) else {
            return MoveReply::Move(Move::Stay);
        };
        let moving: Vec<Move> = board
            .legal_moves(me.current_pos)
            .moves()
            .filter(|m| *m != Move::Stay)
            .collect();
        MoveReply::Move(self.rng.choose(&moving).copied().unwrap_or(Move::Stay))
    }
}
