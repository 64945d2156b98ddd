//! Reference board: bots walking a static maze
//!
//! `GridBoard` implements [`Board`] with the smallest useful rule set:
//! walls block movement, `Stay` is always legal, bots may share a cell, and
//! every applied move produces exactly one [`GameEvent::BotMoved`]. Scoring,
//! capture and win conditions are left to richer boards.

use std::sync::Arc;

use crate::board::{maze_legal_moves, Board, BoardSnapshot, Bot, IllegalMove, LegalMoves, Team};
use crate::layout::{Layout, LayoutError};
use crate::types::{BotIndex, Events, GameEvent, Move, Position};

#[derive(Debug, Clone)]
pub struct GridBoard {
    layout: Arc<Layout>,
    bots: Vec<Bot>,
    teams: Arc<[Team]>,
}

impl GridBoard {
    /// Build a board with `team_count` teams.
    ///
    /// Bot `i` joins team `i % team_count`, so with two teams even bots play
    /// for team 0 and odd bots for team 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridmatch_core::{Board, GridBoard, Layout};
    ///
    /// let layout = Layout::parse("######\n#0123#\n######").unwrap();
    /// let board = GridBoard::new(layout, 2).unwrap();
    /// assert_eq!(board.teams()[0].bots, vec![0, 2]);
    /// assert_eq!(board.teams()[1].bots, vec![1, 3]);
    /// ```
    pub fn new(layout: Layout, team_count: usize) -> Result<Self, LayoutError> {
        if team_count == 0 {
            return Err(LayoutError::NoTeams);
        }

        let bots: Vec<Bot> = layout
            .starts()
            .iter()
            .enumerate()
            .map(|(index, pos)| Bot {
                index,
                team_index: index % team_count,
                current_pos: *pos,
            })
            .collect();

        let teams: Vec<Team> = (0..team_count)
            .map(|index| Team {
                index,
                bots: bots
                    .iter()
                    .filter(|b| b.team_index == index)
                    .map(|b| b.index)
                    .collect(),
            })
            .collect();

        Ok(Self {
            layout: Arc::new(layout),
            bots,
            teams: teams.into(),
        })
    }

    /// Parse `text` and build a board from it.
    pub fn from_layout_str(text: &str, team_count: usize) -> Result<Self, LayoutError> {
        Self::new(Layout::parse(text)?, team_count)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn position_of(&self, bot: BotIndex) -> Option<Position> {
        self.bots.get(bot).map(|b| b.current_pos)
    }
}

impl Board for GridBoard {
    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::new(
            Arc::clone(&self.layout),
            self.bots.as_slice().into(),
            Arc::clone(&self.teams),
        )
    }

    fn bots(&self) -> &[Bot] {
        &self.bots
    }

    fn teams(&self) -> &[Team] {
        &self.teams
    }

    fn legal_moves(&self, pos: Position) -> LegalMoves {
        maze_legal_moves(&self.layout, pos)
    }

    fn move_bot(&mut self, bot: BotIndex, mv: Move) -> Result<Events, IllegalMove> {
        let Some(from) = self.position_of(bot) else {
            return Err(IllegalMove { bot, mv });
        };
        let Some(to) = self.legal_moves(from).get(mv) else {
            return Err(IllegalMove { bot, mv });
        };

        self.bots[bot].current_pos = to;

        let mut events = Events::new();
        events.push(GameEvent::BotMoved { bot, from, to });
        Ok(events)
    }
}
