//! Engine-side player proxy over TCP
//!
//! [`RemotePlayer`] implements the blocking [`Player`] trait on top of the
//! message protocol. It owns a private tokio runtime. A background task
//! decodes incoming lines, and `get_move` blocks on them under a timeout.
//!
//! | Situation | Reply |
//! |---|---|
//! | response with the query's id and a move name | `Move(m)` |
//! | response with anything else, or error with the query's id | `IllegalMove` |
//! | nothing within `move_timeout`, or the query could not be queued in time | `Timeout` |
//! | connection closed (now or earlier) | `Disconnected` |
//!
//! Replies to earlier queries that already timed out are discarded, and
//! errors without an id are logged and ignored.
//!
//! Outgoing lines go through a small bounded queue drained by a writer task,
//! so a player that stops reading costs at most `move_timeout` per call.

use std::env;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use gridmatch_core::BoardSnapshot;
use gridmatch_engine::{MoveReply, Player};
use gridmatch_types::{BotIndex, Move, DEFAULT_MOVE_TIMEOUT_MS};

use crate::protocol::{Message, MessageId};
use crate::transport::{read_messages, write_messages, INBOX_CAPACITY, MAX_LINE_BYTES};
use crate::wire::{BoardView, MoveRequest};

/// Outgoing messages queued ahead of the writer task.
const OUTBOX_CAPACITY: usize = 4;

/// Connection settings shared by the match binary and the player binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub move_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7788,
            move_timeout: Duration::from_millis(DEFAULT_MOVE_TIMEOUT_MS),
        }
    }
}

impl RemoteConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = env::var("GRIDMATCH_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("GRIDMATCH_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let move_timeout = env::var("GRIDMATCH_MOVE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.move_timeout);

        Self {
            host,
            port,
            move_timeout,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .to_socket_addrs()
            .with_context(|| format!("resolve {}:{}", self.host, self.port))?
            .next()
            .with_context(|| format!("no address for {}:{}", self.host, self.port))
    }

    pub fn bind(&self) -> Result<TcpListener> {
        let addr = self.socket_addr()?;
        TcpListener::bind(addr).with_context(|| format!("bind {addr}"))
    }
}

pub struct RemotePlayer {
    rt: Runtime,
    inbox: mpsc::Receiver<Message>,
    /// `None` once the match said goodbye.
    outbox: Option<mpsc::Sender<Message>>,
    writer: Option<JoinHandle<()>>,
    peer: SocketAddr,
    move_timeout: Duration,
    next_id: u64,
    disconnected: bool,
}

/// Why a message could not be queued for the writer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendFailure {
    /// The player is not reading and the outbox stayed full until the deadline.
    TimedOut,
    Closed,
}

impl RemotePlayer {
    /// Wait for the next player to connect to `listener`.
    pub fn accept(listener: &TcpListener, move_timeout: Duration) -> Result<Self> {
        let (stream, peer) = listener.accept().context("accept player connection")?;
        info!(%peer, "player connected");
        Self::from_stream(stream, move_timeout)
    }

    /// Connect to a player that is listening at `addr`.
    pub fn connect(addr: SocketAddr, move_timeout: Duration) -> Result<Self> {
        let stream =
            std::net::TcpStream::connect(addr).with_context(|| format!("connect to {addr}"))?;
        Self::from_stream(stream, move_timeout)
    }

    pub fn from_stream(stream: std::net::TcpStream, move_timeout: Duration) -> Result<Self> {
        let rt = Runtime::new().context("create tokio runtime")?;
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        let stream = {
            let _guard = rt.enter();
            TcpStream::from_std(stream)?
        };
        let peer = stream.peer_addr()?;
        let (reader, writer) = stream.into_split();

        let (tx, inbox) = mpsc::channel(INBOX_CAPACITY);
        rt.spawn(read_messages(reader, tx, MAX_LINE_BYTES));
        let (outbox, queued) = mpsc::channel(OUTBOX_CAPACITY);
        let writer = rt.spawn(write_messages(writer, queued));

        Ok(Self {
            rt,
            inbox,
            outbox: Some(outbox),
            writer: Some(writer),
            peer,
            move_timeout,
            next_id: 0,
            disconnected: false,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    /// Queue `message` for the writer task, waiting for room until `deadline`.
    fn send_by(&mut self, message: Message, deadline: Instant) -> Result<(), SendFailure> {
        if self.disconnected {
            return Err(SendFailure::Closed);
        }
        let Some(outbox) = &self.outbox else {
            return Err(SendFailure::Closed);
        };

        let queued = self
            .rt
            .block_on(async { tokio::time::timeout_at(deadline, outbox.send(message)).await });
        match queued {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => {
                warn!(peer = %self.peer, "writer stopped, treating player as disconnected");
                self.disconnected = true;
                Err(SendFailure::Closed)
            }
            Err(_) => Err(SendFailure::TimedOut),
        }
    }

    fn notify(&mut self, method: &str, params: Value) {
        let deadline = Instant::now() + self.move_timeout;
        if self.send_by(Message::notification(method, params), deadline) == Err(SendFailure::TimedOut) {
            warn!(peer = %self.peer, method, "player is not reading, notification dropped");
        }
    }

    fn next_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId::new(format!("q-{}", self.next_id))
    }

    /// Block until the reply to `id` arrives or `deadline` passes.
    fn await_reply(&mut self, id: &MessageId, deadline: Instant) -> MoveReply {
        let inbox = &mut self.inbox;
        let peer = self.peer;

        self.rt.block_on(async move {
            loop {
                let message = match tokio::time::timeout_at(deadline, inbox.recv()).await {
                    Err(_) => return MoveReply::Timeout,
                    Ok(None) => return MoveReply::Disconnected,
                    Ok(Some(message)) => message,
                };

                match message {
                    Message::Response(response) if &response.id == id => {
                        return match response.result.as_str().and_then(Move::from_str) {
                            Some(mv) => MoveReply::Move(mv),
                            None => {
                                warn!(%peer, %id, result = %response.result, "reply is not a move");
                                MoveReply::IllegalMove
                            }
                        };
                    }
                    Message::Error(error) if error.id.as_ref() == Some(id) => {
                        warn!(%peer, %id, error = %error.error, "player answered with an error");
                        return MoveReply::IllegalMove;
                    }
                    Message::Error(error) if error.id.is_none() => {
                        warn!(%peer, error = %error.error, "unsolicited error from player");
                    }
                    other => {
                        debug!(%peer, id = ?other.id(), "discarding stale or unexpected message");
                    }
                }
            }
        })
    }
}

impl Player for RemotePlayer {
    fn set_bot_ids(&mut self, ids: &[BotIndex]) {
        self.notify("set_bot_ids", Value::from(ids.to_vec()));
    }

    fn set_initial(&mut self, board: &BoardSnapshot) {
        match serde_json::to_value(BoardView::from(board)) {
            Ok(params) => self.notify("set_initial", params),
            Err(err) => warn!(%err, "cannot encode board"),
        }
    }

    fn get_move(&mut self, bot: BotIndex, board: &BoardSnapshot) -> MoveReply {
        if self.disconnected {
            return MoveReply::Disconnected;
        }
        let deadline = Instant::now() + self.move_timeout;

        let request = MoveRequest {
            bot,
            board: BoardView::from(board),
        };
        let params = match serde_json::to_value(&request) {
            Ok(params) => params,
            Err(err) => {
                warn!(%err, "cannot encode move request");
                return MoveReply::IllegalMove;
            }
        };

        let id = self.next_id();
        let reply = match self.send_by(Message::query("get_move", params, id.clone()), deadline) {
            Ok(()) => self.await_reply(&id, deadline),
            Err(SendFailure::TimedOut) => MoveReply::Timeout,
            Err(SendFailure::Closed) => MoveReply::Disconnected,
        };
        match reply {
            MoveReply::Disconnected => {
                info!(peer = %self.peer, bot, "player went away");
                self.disconnected = true;
            }
            MoveReply::Timeout => {
                warn!(
                    peer = %self.peer,
                    bot,
                    %id,
                    timeout_ms = self.move_timeout.as_millis() as u64,
                    "move timed out"
                );
            }
            _ => {}
        }
        reply
    }

    /// Send `exit` and let the writer drain, both bounded by the move timeout.
    fn finish(&mut self) {
        self.notify("exit", Value::Null);
        self.outbox = None;
        if let Some(writer) = self.writer.take() {
            let budget = self.move_timeout;
            let drained = self
                .rt
                .block_on(async move { tokio::time::timeout(budget, writer).await });
            if drained.is_err() {
                warn!(peer = %self.peer, "player is not reading, abandoning queued messages");
            }
        }
        self.disconnected = true;
    }
}
