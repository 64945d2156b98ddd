//! JSON forms of boards and events
//!
//! Boards travel as
//!
//! ```json
//! {"width": 5, "height": 3, "walls": ["#####", "#...#", "#####"],
//!  "bots": [{"index": 0, "team": 0, "x": 1, "y": 1}], "teams": [[0]]}
//! ```
//!
//! and events as objects tagged with `kind`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use gridmatch_core::{BoardSnapshot, Bot, Layout, LayoutError, Team};
use gridmatch_types::{BotIndex, GameEvent, Position, TeamIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotView {
    pub index: BotIndex,
    pub team: TeamIndex,
    pub x: i16,
    pub y: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub width: u16,
    pub height: u16,
    pub walls: Vec<String>,
    pub bots: Vec<BotView>,
    pub teams: Vec<Vec<BotIndex>>,
}

impl From<&BoardSnapshot> for BoardView {
    fn from(board: &BoardSnapshot) -> Self {
        Self {
            width: board.layout().width(),
            height: board.layout().height(),
            walls: board.layout().wall_rows(),
            bots: board
                .bots()
                .iter()
                .map(|b| BotView {
                    index: b.index,
                    team: b.team_index,
                    x: b.current_pos.x,
                    y: b.current_pos.y,
                })
                .collect(),
            teams: board.teams().iter().map(|t| t.bots.clone()).collect(),
        }
    }
}

impl BoardView {
    /// Rebuild a snapshot on the player side. Current bot positions double as
    /// the layout's start positions, so a bot off the grid or inside a wall
    /// is rejected with [`LayoutError::BadStart`].
    pub fn to_snapshot(&self) -> Result<BoardSnapshot, LayoutError> {
        let starts: Vec<Position> = self.bots.iter().map(|b| Position::new(b.x, b.y)).collect();
        let layout = Layout::from_wall_rows(self.walls.as_slice(), starts)?;

        let bots: Vec<Bot> = self
            .bots
            .iter()
            .map(|b| Bot {
                index: b.index,
                team_index: b.team,
                current_pos: Position::new(b.x, b.y),
            })
            .collect();
        let teams: Vec<Team> = self
            .teams
            .iter()
            .enumerate()
            .map(|(index, bots)| Team {
                index,
                bots: bots.clone(),
            })
            .collect();

        Ok(BoardSnapshot::new(
            Arc::new(layout),
            bots.into(),
            teams.into(),
        ))
    }
}

/// Parameters of a `get_move` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub bot: BotIndex,
    pub board: BoardView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventView {
    BotMoved {
        bot: BotIndex,
        from: [i16; 2],
        to: [i16; 2],
    },
    Timeout {
        team: TeamIndex,
    },
    TeamWins {
        team: TeamIndex,
    },
}

impl From<GameEvent> for EventView {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::BotMoved { bot, from, to } => EventView::BotMoved {
                bot,
                from: [from.x, from.y],
                to: [to.x, to.y],
            },
            GameEvent::Timeout { team } => EventView::Timeout { team },
            GameEvent::TeamWins { team } => EventView::TeamWins { team },
        }
    }
}

impl From<EventView> for GameEvent {
    fn from(view: EventView) -> Self {
        match view {
            EventView::BotMoved { bot, from, to } => GameEvent::BotMoved {
                bot,
                from: Position::new(from[0], from[1]),
                to: Position::new(to[0], to[1]),
            },
            EventView::Timeout { team } => GameEvent::Timeout { team },
            EventView::TeamWins { team } => GameEvent::TeamWins { team },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmatch_core::{Board, GridBoard};
    use gridmatch_types::EventKind;
    use serde_json::json;

    #[test]
    fn test_board_view_shape() {
        let board = GridBoard::from_layout_str("#####\n#0.1#\n#####", 2).unwrap();
        let view = BoardView::from(&board.snapshot());
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "width": 5,
                "height": 3,
                "walls": ["#####", "#...#", "#####"],
                "bots": [
                    {"index": 0, "team": 0, "x": 1, "y": 1},
                    {"index": 1, "team": 1, "x": 3, "y": 1}
                ],
                "teams": [[0], [1]]
            })
        );
    }

    #[test]
    fn test_board_view_rebuilds_equivalent_snapshot() {
        let mut board = GridBoard::from_layout_str("######\n#0..1#\n######", 2).unwrap();
        board.move_bot(0, gridmatch_types::Move::East).unwrap();
        let snap = board.snapshot();

        let rebuilt = BoardView::from(&snap).to_snapshot().unwrap();
        assert_eq!(rebuilt.bots(), snap.bots());
        assert_eq!(rebuilt.teams(), snap.teams());
        assert_eq!(
            rebuilt.legal_moves(Position::new(2, 1)),
            snap.legal_moves(Position::new(2, 1))
        );
    }

    #[test]
    fn test_board_view_rejects_bots_off_free_cells() {
        let board = GridBoard::from_layout_str("#####\n#0.1#\n#####", 2).unwrap();
        let mut view = BoardView::from(&board.snapshot());
        view.bots[0].x = i16::MAX;
        assert_eq!(
            view.to_snapshot().unwrap_err(),
            LayoutError::BadStart {
                bot: 0,
                x: i16::MAX,
                y: 1
            }
        );

        view.bots[0].x = 0;
        assert!(matches!(view.to_snapshot(), Err(LayoutError::BadStart { bot: 0, .. })));
    }

    #[test]
    fn test_event_view_is_tagged_by_kind() {
        let event = GameEvent::BotMoved {
            bot: 2,
            from: Position::new(1, 1),
            to: Position::new(1, 2),
        };
        let value = serde_json::to_value(EventView::from(event)).unwrap();
        assert_eq!(
            value,
            json!({"kind": "bot_moved", "bot": 2, "from": [1, 1], "to": [1, 2]})
        );
        assert_eq!(value["kind"], EventKind::BotMoved.as_str());

        let back: EventView = serde_json::from_value(json!({"kind": "team_wins", "team": 1})).unwrap();
        assert_eq!(GameEvent::from(back), GameEvent::TeamWins { team: 1 });
    }
}
