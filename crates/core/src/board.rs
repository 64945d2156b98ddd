//! Board module - the world model seen by the match engine
//!
//! The engine never owns game rules. It talks to the world through the
//! [`Board`] trait and hands [`BoardSnapshot`]s to players and observers.
//!
//! A snapshot is immutable and `Arc`-shared. Cloning one is a refcount bump,
//! and nothing holding a snapshot can reach the live board.

use std::sync::Arc;

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::layout::Layout;
use crate::types::{BotIndex, Events, Move, Position, TeamIndex, ALL_MOVES};

/// One controllable agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bot {
    pub index: BotIndex,
    pub team_index: TeamIndex,
    pub current_pos: Position,
}

/// Ordered set of bots controlled by a single player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Team {
    pub index: TeamIndex,
    pub bots: Vec<BotIndex>,
}

/// Returned by [`Board::move_bot`] when a move is not currently legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal move {mv:?} for bot {bot}")]
pub struct IllegalMove {
    pub bot: BotIndex,
    pub mv: Move,
}

/// Legal moves from a position, each with the position it leads to.
///
/// At most five entries, kept on the stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegalMoves(ArrayVec<(Move, Position), 5>);

impl LegalMoves {
    pub fn new() -> Self {
        Self(ArrayVec::new())
    }

    /// Record a legal move. Extra entries beyond five are ignored.
    pub fn insert(&mut self, mv: Move, to: Position) {
        if self.get(mv).is_none() {
            let _ = self.0.try_push((mv, to));
        }
    }

    /// Resulting position of `mv`, if legal.
    pub fn get(&self, mv: Move) -> Option<Position> {
        self.0.iter().find(|(m, _)| *m == mv).map(|(_, p)| *p)
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.get(mv).is_some()
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.0.iter().map(|(m, _)| *m)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Legal moves on a static maze: every move whose target is not a wall.
pub fn maze_legal_moves(layout: &Layout, from: Position) -> LegalMoves {
    let mut out = LegalMoves::new();
    for mv in ALL_MOVES {
        let to = from.step(mv);
        if !layout.is_wall(to) {
            out.insert(mv, to);
        }
    }
    out
}

/// Immutable view of the board at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    layout: Arc<Layout>,
    bots: Arc<[Bot]>,
    teams: Arc<[Team]>,
}

impl BoardSnapshot {
    pub fn new(layout: Arc<Layout>, bots: Arc<[Bot]>, teams: Arc<[Team]>) -> Self {
        Self {
            layout,
            bots,
            teams,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn bots(&self) -> &[Bot] {
        &self.bots
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn bot(&self, index: BotIndex) -> Option<&Bot> {
        self.bots.get(index)
    }

    /// Legal moves from `pos` according to the maze geometry.
    pub fn legal_moves(&self, pos: Position) -> LegalMoves {
        maze_legal_moves(&self.layout, pos)
    }
}

/// The world model consumed by the match engine.
///
/// Implementations own move legality and all game rules. The engine only
/// mutates a board through [`Board::move_bot`], and only with moves it has
/// checked against [`Board::legal_moves`] or received from a player.
pub trait Board {
    /// Cheap immutable hand-off of the current state.
    fn snapshot(&self) -> BoardSnapshot;

    fn bots(&self) -> &[Bot];

    fn teams(&self) -> &[Team];

    /// Legal moves from `pos`, each mapped to its resulting position.
    fn legal_moves(&self, pos: Position) -> LegalMoves;

    /// Apply `mv` to `bot`, returning the events it produced.
    fn move_bot(&mut self, bot: BotIndex, mv: Move) -> Result<Events, IllegalMove>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_moves_insert_dedupes() {
        let mut moves = LegalMoves::new();
        moves.insert(Move::East, Position::new(2, 1));
        moves.insert(Move::East, Position::new(9, 9));
        assert_eq!(moves.len(), 1);
        assert_eq!(moves.get(Move::East), Some(Position::new(2, 1)));
        assert!(!moves.contains(Move::West));
    }

    #[test]
    fn test_maze_legal_moves_respects_walls() {
        let layout = Layout::parse("#####\n#0..#\n#####").unwrap();
        let moves = maze_legal_moves(&layout, Position::new(1, 1));
        let names: Vec<_> = moves.moves().collect();
        assert_eq!(names, vec![Move::East, Move::Stay]);
    }

    #[test]
    fn test_snapshot_clone_shares_storage() {
        let layout = Arc::new(Layout::parse("####\n#0.#\n####").unwrap());
        let bots: Arc<[Bot]> = vec![Bot {
            index: 0,
            team_index: 0,
            current_pos: Position::new(1, 1),
        }]
        .into();
        let teams: Arc<[Team]> = vec![Team {
            index: 0,
            bots: vec![0],
        }]
        .into();
        let snap = BoardSnapshot::new(layout, bots, teams);
        let copy = snap.clone();
        assert!(Arc::ptr_eq(&snap.bots, &copy.bots));
        assert_eq!(copy.bot(0).map(|b| b.current_pos), Some(Position::new(1, 1)));
    }
}
