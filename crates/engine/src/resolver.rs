//! Move resolution - one bot, one authoritative move
//!
//! The resolver asks a [`Player`] for a bot's move and decides what actually
//! happens on the board:
//!
//! | Reply | Board | Events |
//! |---|---|---|
//! | legal `Move(m)` | `m` applied | board events |
//! | `Timeout`, `IllegalMove`, rejected `Move(m)` | fallback applied | board events + `Timeout(team)` |
//! | `Disconnected` | untouched | `TeamWins(other team)` only |
//!
//! The fallback is drawn uniformly from the legal moves, and `Stay` is only
//! chosen when nothing else is legal.

use tracing::{debug, warn};

use crate::core::{Board, Bot, LegalMoves, SimpleRng};
use crate::error::MatchError;
use crate::player::{MoveReply, Player};
use crate::types::{BotIndex, Events, GameEvent, Move, TeamIndex};

/// What happened to one bot during its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Move applied to the board, or `None` if the board was left untouched.
    pub applied: Option<Move>,
    pub events: Events,
}

#[derive(Debug, Clone)]
pub struct MoveResolver {
    rng: SimpleRng,
}

impl MoveResolver {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Resolve the turn of `bot`, which belongs to the team `player` controls.
    pub fn resolve<B: Board + ?Sized>(
        &mut self,
        board: &mut B,
        player: &mut dyn Player,
        bot: BotIndex,
    ) -> Result<Resolution, MatchError> {
        let Some(me) = board.bots().get(bot).copied() else {
            return Err(MatchError::Board(format!("unknown bot {bot}")));
        };
        let team = me.team_index;

        let snapshot = board.snapshot();
        let reply = player.get_move(bot, &snapshot);

        match reply {
            MoveReply::Move(mv) => match board.move_bot(bot, mv) {
                Ok(events) => {
                    debug!(bot, team, mv = mv.as_str(), "move applied");
                    Ok(Resolution {
                        applied: Some(mv),
                        events,
                    })
                }
                Err(err) => {
                    warn!(bot, team, %err, "player proposed an illegal move");
                    self.apply_fallback(board, bot, me)
                }
            },
            MoveReply::Timeout | MoveReply::IllegalMove => {
                warn!(bot, team, reply = ?reply, "player fault, applying fallback");
                self.apply_fallback(board, bot, me)
            }
            MoveReply::Disconnected => {
                let winner = other_team(team, board.teams().len());
                warn!(bot, team, winner, "player disconnected");
                let mut events = Events::new();
                events.push(GameEvent::TeamWins { team: winner });
                Ok(Resolution {
                    applied: None,
                    events,
                })
            }
        }
    }

    fn apply_fallback<B: Board + ?Sized>(
        &mut self,
        board: &mut B,
        bot: BotIndex,
        me: Bot,
    ) -> Result<Resolution, MatchError> {
        let legal = board.legal_moves(me.current_pos);
        let Some(mv) = self.fallback_move(&legal) else {
            return Err(MatchError::Board(format!("bot {bot} has no legal moves")));
        };

        let mut events = board
            .move_bot(bot, mv)
            .map_err(|err| MatchError::Board(format!("fallback rejected: {err}")))?;
        events.push(GameEvent::Timeout {
            team: me.team_index,
        });

        Ok(Resolution {
            applied: Some(mv),
            events,
        })
    }

    /// Pick a fallback from `legal`, excluding `Stay` unless it is the only move.
    pub fn fallback_move(&mut self, legal: &LegalMoves) -> Option<Move> {
        let moving: Vec<Move> = legal.moves().filter(|m| *m != Move::Stay).collect();
        if moving.is_empty() {
            return legal.moves().next();
        }
        self.rng.choose(&moving).copied()
    }
}

/// The team awarded the match when `team` drops out.
pub fn other_team(team: TeamIndex, team_count: usize) -> TeamIndex {
    if team_count == 0 {
        return team;
    }
    (team + 1) % team_count
}
