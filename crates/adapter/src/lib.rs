//! Adapter module - players in other processes, over TCP
//!
//! The match and its players talk a **line-delimited JSON protocol**. Each
//! line is one [`Message`](protocol::Message):
//!
//! ```text
//! match  -> player: {"type":"notification","method":"set_bot_ids","params":[0,2]}
//! match  -> player: {"type":"notification","method":"set_initial","params":{"width":18,...}}
//! match  -> player: {"type":"query","method":"get_move","params":{"bot":0,"board":{...}},"id":"q-1"}
//! player -> match:  {"type":"response","result":"east","id":"q-1"}
//! match  -> player: {"type":"notification","method":"exit","params":null}
//! ```
//!
//! # Modules
//!
//! - [`protocol`]: message variants, codec, reply channels
//! - [`wire`]: JSON forms of boards and events
//! - [`transport`]: framing over async streams
//! - [`remote`]: [`RemotePlayer`], the engine-side proxy, and [`RemoteConfig`]
//! - [`client`]: [`serve_player`], the player-side loop
//! - [`record`]: [`JsonLinesObserver`] for match logs
//!
//! # Environment Variables
//!
//! - `GRIDMATCH_HOST`: address to bind or connect to (default: "127.0.0.1")
//! - `GRIDMATCH_PORT`: port (default: 7788)
//! - `GRIDMATCH_MOVE_TIMEOUT_MS`: per-move budget (default: 1000)
//!
//! # Testing
//!
//! A player can be played by hand with netcat:
//!
//! ```bash
//! nc 127.0.0.1 7788
//! {"type":"response","result":"north","id":"q-1"}
//! ```

pub mod client;
pub mod protocol;
pub mod record;
pub mod remote;
pub mod transport;
pub mod wire;

pub use gridmatch_core as core;
pub use gridmatch_engine as engine;
pub use gridmatch_types as types;

pub use client::{serve, serve_player, ServeOutcome};
pub use protocol::{
    ErrorMessage, Message, MessageId, MessageKind, Notification, ProtocolError, Query,
    ReceivedQuery, ReplySender, Response,
};
pub use record::JsonLinesObserver;
pub use remote::{RemoteConfig, RemotePlayer};
pub use wire::{BoardView, BotView, EventView, MoveRequest};
