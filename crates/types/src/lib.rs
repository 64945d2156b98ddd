//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, so they can be used
//! by the board model, the match engine and the wire protocol alike.
//!
//! # Coordinates
//!
//! Positions are `(x, y)` with `x` growing to the east and `y` growing to the
//! south. `(0, 0)` is the north-west corner of a layout.
//!
//! # Moves
//!
//! | Move | Delta | Wire name |
//! |------|-------|-----------|
//! | `North` | (0, -1) | `north` |
//! | `South` | (0, 1) | `south` |
//! | `East` | (1, 0) | `east` |
//! | `West` | (-1, 0) | `west` |
//! | `Stay` | (0, 0) | `stay` |
//!
//! # Events
//!
//! Every bot-move produces an ordered [`Events`] sequence. Three kinds exist:
//! a movement ([`GameEvent::BotMoved`]), a fault signal
//! ([`GameEvent::Timeout`]) and the terminal [`GameEvent::TeamWins`].
//!
//! # Examples
//!
//! ```
//! use gridmatch_types::{EventKind, Events, GameEvent, Move, Position};
//!
//! let pos = Position::new(3, 4);
//! assert_eq!(pos.step(Move::East), Position::new(4, 4));
//!
//! assert_eq!(Move::from_str("north"), Some(Move::North));
//! assert_eq!(Move::Stay.as_str(), "stay");
//!
//! let mut events = Events::new();
//! events.push(GameEvent::Timeout { team: 1 });
//! assert!(events.contains(EventKind::Timeout));
//! assert!(!events.contains(EventKind::TeamWins));
//! ```

/// Index of a bot on the board.
pub type BotIndex = usize;

/// Index of a team on the board (and of the player registered for it).
pub type TeamIndex = usize;

/// Default number of rounds in a match.
pub const DEFAULT_GAME_TIME: u32 = 100;

/// Default seed for fallback move selection.
pub const DEFAULT_SEED: u32 = 1;

/// Default per-move budget for remote players in milliseconds.
pub const DEFAULT_MOVE_TIMEOUT_MS: u64 = 1000;

/// All moves, in the order used when enumerating legal moves.
pub const ALL_MOVES: [Move; 5] = [Move::North, Move::South, Move::East, Move::West, Move::Stay];

/// A cell coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// The position reached by applying `mv` (ignoring walls).
    /// Coordinates saturate at the `i16` range.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridmatch_types::{Move, Position};
    ///
    /// let p = Position::new(1, 1);
    /// assert_eq!(p.step(Move::North), Position::new(1, 0));
    /// assert_eq!(p.step(Move::Stay), p);
    /// ```
    pub fn step(self, mv: Move) -> Self {
        let (dx, dy) = mv.delta();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// A move a bot may take in one turn.
///
/// `Stay` is the "stay in place" move. It is always legal on the reference
/// board but is avoided by the fallback policy whenever anything else is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    North,
    South,
    East,
    West,
    Stay,
}

impl Move {
    /// Parse a move from its wire name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use gridmatch_types::Move;
    ///
    /// assert_eq!(Move::from_str("West"), Some(Move::West));
    /// assert_eq!(Move::from_str("STAY"), Some(Move::Stay));
    /// assert_eq!(Move::from_str("jump"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" => Some(Move::North),
            "south" => Some(Move::South),
            "east" => Some(Move::East),
            "west" => Some(Move::West),
            "stay" => Some(Move::Stay),
            _ => None,
        }
    }

    /// Convert to the lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Move::North => "north",
            Move::South => "south",
            Move::East => "east",
            Move::West => "west",
            Move::Stay => "stay",
        }
    }

    /// `(dx, dy)` of this move.
    pub fn delta(&self) -> (i16, i16) {
        match self {
            Move::North => (0, -1),
            Move::South => (0, 1),
            Move::East => (1, 0),
            Move::West => (-1, 0),
            Move::Stay => (0, 0),
        }
    }
}

/// Something that happened while a single bot moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEvent {
    /// The bot went from `from` to `to` (equal for `Stay`).
    BotMoved {
        bot: BotIndex,
        from: Position,
        to: Position,
    },
    /// The team's player timed out or proposed an illegal move.
    Timeout { team: TeamIndex },
    /// The match is decided in favour of `team`.
    TeamWins { team: TeamIndex },
}

/// Tag of a [`GameEvent`], used to filter event sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BotMoved,
    Timeout,
    TeamWins,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::BotMoved => "bot_moved",
            EventKind::Timeout => "timeout",
            EventKind::TeamWins => "team_wins",
        }
    }
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::BotMoved { .. } => EventKind::BotMoved,
            GameEvent::Timeout { .. } => EventKind::Timeout,
            GameEvent::TeamWins { .. } => EventKind::TeamWins,
        }
    }
}

/// Ordered, append-only sequence of events produced by one bot-move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Events(Vec<GameEvent>);

impl Events {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, event: GameEvent) {
        self.0.push(event);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GameEvent> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[GameEvent] {
        &self.0
    }

    /// Events of the given kind, in production order.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridmatch_types::{EventKind, Events, GameEvent};
    ///
    /// let events: Events = [
    ///     GameEvent::Timeout { team: 0 },
    ///     GameEvent::TeamWins { team: 1 },
    ///     GameEvent::Timeout { team: 1 },
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let timeouts: Vec<_> = events.filter(EventKind::Timeout).collect();
    /// assert_eq!(timeouts.len(), 2);
    /// ```
    pub fn filter(&self, kind: EventKind) -> impl Iterator<Item = &GameEvent> + '_ {
        self.0.iter().filter(move |e| e.kind() == kind)
    }

    pub fn contains(&self, kind: EventKind) -> bool {
        self.0.iter().any(|e| e.kind() == kind)
    }

    /// Team named by the first `TeamWins` event, if any.
    pub fn winner(&self) -> Option<TeamIndex> {
        self.0.iter().find_map(|e| match e {
            GameEvent::TeamWins { team } => Some(*team),
            _ => None,
        })
    }
}

impl FromIterator<GameEvent> for Events {
    fn from_iter<I: IntoIterator<Item = GameEvent>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Events {
    type Item = GameEvent;
    type IntoIter = std::vec::IntoIter<GameEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Events {
    type Item = &'a GameEvent;
    type IntoIter = std::slice::Iter<'a, GameEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_names_round_trip() {
        for mv in ALL_MOVES {
            assert_eq!(Move::from_str(mv.as_str()), Some(mv));
        }
    }

    #[test]
    fn step_saturates_at_coordinate_limits() {
        let corner = Position::new(i16::MAX, i16::MIN);
        assert_eq!(corner.step(Move::East), corner);
        assert_eq!(corner.step(Move::North), corner);
        assert_eq!(corner.step(Move::West), Position::new(i16::MAX - 1, i16::MIN));
    }

    #[test]
    fn winner_is_first_team_wins_event() {
        let mut events = Events::new();
        events.push(GameEvent::BotMoved {
            bot: 0,
            from: Position::new(1, 1),
            to: Position::new(2, 1),
        });
        assert_eq!(events.winner(), None);

        events.push(GameEvent::TeamWins { team: 1 });
        events.push(GameEvent::TeamWins { team: 0 });
        assert_eq!(events.winner(), Some(1));
    }

    #[test]
    fn filter_preserves_order() {
        let events: Events = [
            GameEvent::Timeout { team: 1 },
            GameEvent::TeamWins { team: 0 },
            GameEvent::Timeout { team: 0 },
        ]
        .into_iter()
        .collect();

        let teams: Vec<_> = events
            .filter(EventKind::Timeout)
            .map(|e| match e {
                GameEvent::Timeout { team } => *team,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(teams, vec![1, 0]);
    }
}
