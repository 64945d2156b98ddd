//! Match recording as JSON lines, one line per bot-move.

use std::io::Write;

use serde::Serialize;
use tracing::warn;

use gridmatch_core::BoardSnapshot;
use gridmatch_engine::Observer;
use gridmatch_types::{BotIndex, Events};

use crate::wire::{BoardView, EventView};

#[derive(Debug, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum Record<'a> {
    Initial { board: BoardView },
    Move {
        round: u32,
        bot: BotIndex,
        events: &'a [EventView],
    },
}

/// Writes the initial board and every broadcast to `W`.
pub struct JsonLinesObserver<W: Write> {
    out: W,
    failed: bool,
}

impl<W: Write> JsonLinesObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out, failed: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, record: &Record<'_>) {
        if self.failed {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, record)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(err) = result {
            warn!(%err, "recording failed, no further records will be written");
            self.failed = true;
        }
    }
}

impl<W: Write> Observer for JsonLinesObserver<W> {
    fn set_initial(&mut self, board: &BoardSnapshot) {
        self.write(&Record::Initial {
            board: BoardView::from(board),
        });
    }

    fn observe(&mut self, round: u32, bot: BotIndex, _board: &BoardSnapshot, events: &Events) {
        let views: Vec<EventView> = events.iter().copied().map(EventView::from).collect();
        self.write(&Record::Move {
            round,
            bot,
            events: &views,
        });
    }
}
