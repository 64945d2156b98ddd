//! Player-side connection loop
//!
//! [`serve`] connects a local [`Player`] to a match over an established
//! stream: notifications become trait calls, and each `get_move` query is
//! answered with the move name or an error.
//!
//! A local player that reports [`MoveReply::Disconnected`] makes the loop hang
//! up, which the match sees as the team dropping out.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use gridmatch_engine::{MoveReply, Player};
use gridmatch_types::BotIndex;

use crate::protocol::{Message, Notification, ReceivedQuery, ReplySender};
use crate::transport::{read_messages, write_message, INBOX_CAPACITY, MAX_LINE_BYTES};
use crate::wire::{BoardView, MoveRequest};

/// How a [`serve`] loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// The match sent `exit`.
    Exited,
    /// The local player gave up and the connection was dropped.
    HungUp,
    /// The match closed the connection without saying goodbye.
    ConnectionClosed,
}

/// Blocking entry point: connect to `addr` and serve until the match ends.
pub fn serve_player<P: Player>(addr: SocketAddr, player: P) -> Result<ServeOutcome> {
    let rt = Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("connect to {addr}"))?;
        stream.set_nodelay(true)?;
        info!(%addr, "connected to match");
        serve(stream, player).await
    })
}

pub async fn serve<P: Player>(stream: TcpStream, mut player: P) -> Result<ServeOutcome> {
    let (reader, mut writer) = stream.into_split();
    let (tx, mut inbox) = mpsc::channel(INBOX_CAPACITY);
    tokio::spawn(read_messages(reader, tx, MAX_LINE_BYTES));

    let (reply_tx, mut replies) = mpsc::unbounded_channel();
    let reply_sender = ReplySender::new(reply_tx);

    while let Some(message) = inbox.recv().await {
        match message {
            Message::Notification(notification) => {
                if handle_notification(&mut player, notification) {
                    player.finish();
                    return Ok(ServeOutcome::Exited);
                }
            }
            Message::Query(query) => {
                let received = ReceivedQuery::new(query, reply_sender.clone());
                if !answer_query(&mut player, received)? {
                    info!("player gave up, hanging up");
                    player.finish();
                    return Ok(ServeOutcome::HungUp);
                }
                while let Ok(reply) = replies.try_recv() {
                    write_message(&mut writer, &reply)
                        .await
                        .context("send reply")?;
                }
            }
            other => debug!(id = ?other.id(), "ignoring unexpected message"),
        }
    }

    player.finish();
    Ok(ServeOutcome::ConnectionClosed)
}

/// Returns true on `exit`.
fn handle_notification<P: Player>(player: &mut P, notification: Notification) -> bool {
    match notification.method.as_str() {
        "set_bot_ids" => match serde_json::from_value::<Vec<BotIndex>>(notification.params) {
            Ok(ids) => player.set_bot_ids(&ids),
            Err(err) => warn!(%err, "bad set_bot_ids params"),
        },
        "set_initial" => {
            let board = serde_json::from_value::<BoardView>(notification.params)
                .map_err(|err| err.to_string())
                .and_then(|view| view.to_snapshot().map_err(|err| err.to_string()));
            match board {
                Ok(board) => player.set_initial(&board),
                Err(err) => warn!(%err, "bad set_initial params"),
            }
        }
        "exit" => return true,
        method => warn!(method, "unknown notification"),
    }
    false
}

/// Returns false if the player reported itself disconnected.
fn answer_query<P: Player>(player: &mut P, query: ReceivedQuery) -> Result<bool> {
    if query.method() != "get_move" {
        let error = Value::from(format!("unknown method {}", query.method()));
        query.reply_error(error)?;
        return Ok(true);
    }

    let request = serde_json::from_value::<MoveRequest>(query.params().clone())
        .map_err(|err| err.to_string())
        .and_then(|req| {
            req.board
                .to_snapshot()
                .map(|board| (req.bot, board))
                .map_err(|err| err.to_string())
        });
    let (bot, board) = match request {
        Ok(parsed) => parsed,
        Err(err) => {
            query.reply_error(Value::from(err))?;
            return Ok(true);
        }
    };

    match player.get_move(bot, &board) {
        MoveReply::Move(mv) => query.reply(Value::from(mv.as_str()))?,
        MoveReply::Disconnected => return Ok(false),
        MoveReply::Timeout | MoveReply::IllegalMove => {
            query.reply_error(Value::from("no move"))?;
        }
    }
    Ok(true)
}
