//! Observers receive one broadcast per bot-move, in order.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::core::BoardSnapshot;
use crate::types::{BotIndex, Events, GameEvent};

pub trait Observer {
    /// Starting state. Called once at registration.
    fn set_initial(&mut self, _board: &BoardSnapshot) {}

    /// Called after every resolved bot-move with the post-move snapshot.
    fn observe(&mut self, round: u32, bot: BotIndex, board: &BoardSnapshot, events: &Events);
}

impl<O: Observer + ?Sized> Observer for Box<O> {
    fn set_initial(&mut self, board: &BoardSnapshot) {
        (**self).set_initial(board)
    }

    fn observe(&mut self, round: u32, bot: BotIndex, board: &BoardSnapshot, events: &Events) {
        (**self).observe(round, bot, board, events)
    }
}

/// Writes every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn set_initial(&mut self, board: &BoardSnapshot) {
        info!(
            bots = board.bots().len(),
            teams = board.teams().len(),
            "match initialised"
        );
    }

    fn observe(&mut self, round: u32, bot: BotIndex, _board: &BoardSnapshot, events: &Events) {
        for event in events {
            match *event {
                GameEvent::BotMoved { from, to, .. } => {
                    debug!(round, bot, from = ?from, to = ?to, "bot moved");
                }
                GameEvent::Timeout { team } => {
                    warn!(round, bot, team, "fallback move applied");
                }
                GameEvent::TeamWins { team } => {
                    info!(round, bot, team, "team wins");
                }
            }
        }
    }
}

/// One broadcast as seen by a [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub round: u32,
    pub bot: BotIndex,
    pub board: BoardSnapshot,
    pub events: Events,
}

/// Keeps every broadcast in memory.
///
/// Clones share the same log, so a test can keep one handle and register the
/// other with the engine.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    initial: Rc<RefCell<Option<BoardSnapshot>>>,
    log: Rc<RefCell<Vec<Broadcast>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial(&self) -> Option<BoardSnapshot> {
        self.initial.borrow().clone()
    }

    pub fn broadcasts(&self) -> Vec<Broadcast> {
        self.log.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// All recorded events, flattened in broadcast order.
    pub fn events(&self) -> Events {
        self.log
            .borrow()
            .iter()
            .flat_map(|b| b.events.iter().copied())
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn set_initial(&mut self, board: &BoardSnapshot) {
        *self.initial.borrow_mut() = Some(board.clone());
    }

    fn observe(&mut self, round: u32, bot: BotIndex, board: &BoardSnapshot, events: &Events) {
        self.log.borrow_mut().push(Broadcast {
            round,
            bot,
            board: board.clone(),
            events: events.clone(),
        });
    }
}
