//! Round scheduler
//!
//! [`GameMaster`] owns the live board and drives the match:
//!
//! ```text
//! NotStarted ──play / play_round──▶ Running ──▶ Finished(reason)
//! ```
//!
//! Each round visits every bot once in ascending index order. After a bot's
//! move is resolved, every observer receives `(round, bot, snapshot, events)`.
//! A `TeamWins` event ends the match right after that broadcast.

use tracing::{debug, info};

use crate::config::MatchConfig;
use crate::core::{Board, BoardSnapshot};
use crate::error::MatchError;
use crate::observer::Observer;
use crate::player::Player;
use crate::resolver::MoveResolver;
use crate::types::{BotIndex, TeamIndex};

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// All `game_time` rounds were played.
    RoundsExhausted,
    TeamWon(TeamIndex),
    /// The board failed mid-match.
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    NotStarted,
    Running,
    Finished(FinishReason),
}

impl MatchState {
    pub fn is_finished(&self) -> bool {
        matches!(self, MatchState::Finished(_))
    }
}

pub struct GameMaster<B: Board> {
    board: B,
    game_time: u32,
    resolver: MoveResolver,
    players: Vec<Box<dyn Player>>,
    observers: Vec<Box<dyn Observer>>,
    state: MatchState,
    next_round: u32,
}

impl<B: Board> GameMaster<B> {
    pub fn new(board: B, game_time: u32, seed: u32) -> Self {
        Self {
            board,
            game_time,
            resolver: MoveResolver::new(seed),
            players: Vec::new(),
            observers: Vec::new(),
            state: MatchState::NotStarted,
            next_round: 0,
        }
    }

    pub fn from_config(board: B, config: &MatchConfig) -> Self {
        Self::new(board, config.game_time, config.seed)
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn game_time(&self) -> u32 {
        self.game_time
    }

    /// Index of the next round `play` would run.
    pub fn next_round(&self) -> u32 {
        self.next_round
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Register the player for the next unclaimed team.
    ///
    /// The player is told its bot ids and the starting board before this
    /// returns.
    pub fn register_player(&mut self, mut player: Box<dyn Player>) -> Result<TeamIndex, MatchError> {
        let team_index = self.players.len();
        let Some(team) = self.board.teams().get(team_index) else {
            return Err(MatchError::TeamMismatch {
                teams: self.board.teams().len(),
                players: team_index + 1,
            });
        };

        player.set_bot_ids(&team.bots);
        player.set_initial(&self.board.snapshot());
        debug!(team = team_index, bots = ?team.bots, "player registered");

        self.players.push(player);
        Ok(team_index)
    }

    pub fn register_observer(&mut self, mut observer: Box<dyn Observer>) -> Result<(), MatchError> {
        if self.state != MatchState::NotStarted {
            return Err(MatchError::InvalidObserver);
        }
        observer.set_initial(&self.board.snapshot());
        self.observers.push(observer);
        Ok(())
    }

    /// Run rounds until the match finishes.
    pub fn play(&mut self) -> Result<FinishReason, MatchError> {
        self.ensure_started()?;
        loop {
            if let MatchState::Finished(reason) = self.state {
                return Ok(reason);
            }
            self.play_round(self.next_round)?;
        }
    }

    /// Play one round. Returns `false` if a team won during it.
    ///
    /// The first call starts the match, so it can fail with
    /// [`MatchError::TeamMismatch`].
    pub fn play_round(&mut self, round: u32) -> Result<bool, MatchError> {
        self.ensure_started()?;
        if self.state.is_finished() {
            return Err(MatchError::AlreadyFinished);
        }

        debug!(round, "round started");
        let mut order: Vec<(BotIndex, TeamIndex)> = self
            .board
            .bots()
            .iter()
            .map(|b| (b.index, b.team_index))
            .collect();
        order.sort_unstable();

        for (bot, team) in order {
            let Some(player) = self.players.get_mut(team) else {
                self.finish(FinishReason::Aborted);
                return Err(MatchError::Board(format!(
                    "bot {bot} belongs to team {team}, which has no player"
                )));
            };

            let resolution = match self.resolver.resolve(&mut self.board, player.as_mut(), bot) {
                Ok(resolution) => resolution,
                Err(err) => {
                    self.finish(FinishReason::Aborted);
                    return Err(err);
                }
            };

            let snapshot = self.board.snapshot();
            for observer in &mut self.observers {
                observer.observe(round, bot, &snapshot, &resolution.events);
            }

            if let Some(winner) = resolution.events.winner() {
                self.finish(FinishReason::TeamWon(winner));
                return Ok(false);
            }
        }

        self.next_round = round.saturating_add(1);
        if self.next_round >= self.game_time {
            self.finish(FinishReason::RoundsExhausted);
        }
        Ok(true)
    }

    fn ensure_started(&mut self) -> Result<(), MatchError> {
        match self.state {
            MatchState::Running => Ok(()),
            MatchState::Finished(_) => Err(MatchError::AlreadyFinished),
            MatchState::NotStarted => {
                let teams = self.board.teams().len();
                if teams != self.players.len() {
                    return Err(MatchError::TeamMismatch {
                        teams,
                        players: self.players.len(),
                    });
                }
                self.state = MatchState::Running;
                info!(
                    teams,
                    bots = self.board.bots().len(),
                    game_time = self.game_time,
                    "match started"
                );
                if self.game_time == 0 {
                    self.finish(FinishReason::RoundsExhausted);
                }
                Ok(())
            }
        }
    }

    fn finish(&mut self, reason: FinishReason) {
        self.state = MatchState::Finished(reason);
        info!(reason = ?reason, rounds = self.next_round, "match finished");
        for player in &mut self.players {
            player.finish();
        }
    }
}
