//! Protocol module - the four message shapes exchanged with players
//!
//! Every message is a JSON object with an explicit `type` discriminant:
//!
//! | type | fields |
//! |---|---|
//! | `query` | `method`, `params`, `id` |
//! | `notification` | `method`, `params` |
//! | `response` | `result`, `id` |
//! | `error` | `error`, `id` (may be `null`) |
//!
//! A query expects exactly one response or error carrying its id. An error
//! with a `null` id answers nothing in particular.
//!
//! Ids may be strings or numbers.
//!
//! Objects without a `type` key are still accepted: the variants are tried in
//! the order query, notification, response, error, and the first whose field
//! set matches the object's keys exactly wins.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;

/// Correlates a response or error with its query.
///
/// Ids are strings or numbers and are echoed back in the form they arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Text(String),
    Number(serde_json::Number),
}

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        MessageId::Text(id.into())
    }

    pub fn to_value(&self) -> Value {
        match self {
            MessageId::Text(id) => Value::from(id.as_str()),
            MessageId::Number(id) => Value::Number(id.clone()),
        }
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        MessageId::Number(id.into())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageId::Text(id) => f.write_str(id),
            MessageId::Number(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Query {
    pub method: String,
    pub params: Value,
    pub id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Notification {
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Response {
    pub result: Value,
    pub id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorMessage {
    pub error: Value,
    pub id: Option<MessageId>,
}

impl Query {
    pub fn new(method: impl Into<String>, params: Value, id: MessageId) -> Self {
        Self {
            method: method.into(),
            params,
            id,
        }
    }

    /// The response to this query, without sending it.
    pub fn response(&self, result: Value) -> Message {
        Message::Response(Response {
            result,
            id: self.id.clone(),
        })
    }

    /// The error reply to this query, without sending it.
    pub fn error_reply(&self, error: Value) -> Message {
        Message::Error(ErrorMessage {
            error,
            id: Some(self.id.clone()),
        })
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("cannot convert {0} to a message")]
    UnrecognizedMessage(Value),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reply channel is closed")]
    ReplyChannelClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Query,
    Notification,
    Response,
    Error,
}

impl MessageKind {
    /// Fallback order for untagged input.
    pub const ALL: [MessageKind; 4] = [
        MessageKind::Query,
        MessageKind::Notification,
        MessageKind::Response,
        MessageKind::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Query => "query",
            MessageKind::Notification => "notification",
            MessageKind::Response => "response",
            MessageKind::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Exact field set of this variant, without the discriminant.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            MessageKind::Query => &["method", "params", "id"],
            MessageKind::Notification => &["method", "params"],
            MessageKind::Response => &["result", "id"],
            MessageKind::Error => &["error", "id"],
        }
    }

    fn build(&self, map: &Map<String, Value>) -> Option<Message> {
        let has_exact_fields =
            map.len() == self.fields().len() && self.fields().iter().all(|f| map.contains_key(*f));
        if !has_exact_fields {
            return None;
        }
        let value = Value::Object(map.clone());
        match self {
            MessageKind::Query => serde_json::from_value(value).ok().map(Message::Query),
            MessageKind::Notification => serde_json::from_value(value).ok().map(Message::Notification),
            MessageKind::Response => serde_json::from_value(value).ok().map(Message::Response),
            MessageKind::Error => serde_json::from_value(value).ok().map(Message::Error),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Query(Query),
    Notification(Notification),
    Response(Response),
    Error(ErrorMessage),
}

impl Message {
    pub fn query(method: impl Into<String>, params: Value, id: MessageId) -> Self {
        Message::Query(Query::new(method, params, id))
    }

    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Message::Notification(Notification {
            method: method.into(),
            params,
        })
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Query(_) => MessageKind::Query,
            Message::Notification(_) => MessageKind::Notification,
            Message::Response(_) => MessageKind::Response,
            Message::Error(_) => MessageKind::Error,
        }
    }

    /// True if this message answers a specific query.
    pub fn is_response(&self) -> bool {
        match self {
            Message::Response(_) => true,
            Message::Error(e) => e.id.is_some(),
            Message::Query(_) | Message::Notification(_) => false,
        }
    }

    pub fn wants_response(&self) -> bool {
        matches!(self, Message::Query(_))
    }

    /// Id this message carries, if any.
    pub fn id(&self) -> Option<&MessageId> {
        match self {
            Message::Query(q) => Some(&q.id),
            Message::Response(r) => Some(&r.id),
            Message::Error(e) => e.id.as_ref(),
            Message::Notification(_) => None,
        }
    }

    pub fn encode(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::from(self.kind().as_str()));
        match self {
            Message::Query(q) => {
                map.insert("method".to_string(), Value::from(q.method.as_str()));
                map.insert("params".to_string(), q.params.clone());
                map.insert("id".to_string(), q.id.to_value());
            }
            Message::Notification(n) => {
                map.insert("method".to_string(), Value::from(n.method.as_str()));
                map.insert("params".to_string(), n.params.clone());
            }
            Message::Response(r) => {
                map.insert("result".to_string(), r.result.clone());
                map.insert("id".to_string(), r.id.to_value());
            }
            Message::Error(e) => {
                map.insert("error".to_string(), e.error.clone());
                let id = e.id.as_ref().map_or(Value::Null, MessageId::to_value);
                map.insert("id".to_string(), id);
            }
        }
        Value::Object(map)
    }

    pub fn decode(value: Value) -> Result<Self, ProtocolError> {
        let Value::Object(mut map) = value else {
            return Err(ProtocolError::UnrecognizedMessage(value));
        };

        let tag = map.remove("type");
        let candidates: Vec<MessageKind> = match &tag {
            None => MessageKind::ALL.to_vec(),
            Some(Value::String(s)) => MessageKind::from_str(s).into_iter().collect(),
            Some(_) => Vec::new(),
        };

        if let Some(message) = candidates.iter().find_map(|kind| kind.build(&map)) {
            return Ok(message);
        }

        if let Some(tag) = tag {
            map.insert("type".to_string(), tag);
        }
        Err(ProtocolError::UnrecognizedMessage(Value::Object(map)))
    }

    /// One line of the line-delimited transport, without the newline.
    pub fn to_line(&self) -> String {
        self.encode().to_string()
    }

    pub fn from_line(line: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(line.trim())?;
        Self::decode(value)
    }
}

/// The channel a query's reply goes back on.
#[derive(Debug, Clone)]
pub struct ReplySender(mpsc::UnboundedSender<Message>);

impl ReplySender {
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self(tx)
    }

    pub fn send(&self, message: Message) -> Result<(), ProtocolError> {
        self.0
            .send(message)
            .map_err(|_| ProtocolError::ReplyChannelClosed)
    }
}

/// A query together with the channel it arrived on.
///
/// Replying consumes the value, so a query is answered at most once.
#[derive(Debug)]
pub struct ReceivedQuery {
    query: Query,
    channel: ReplySender,
}

impl ReceivedQuery {
    pub fn new(query: Query, channel: ReplySender) -> Self {
        Self { query, channel }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn method(&self) -> &str {
        &self.query.method
    }

    pub fn params(&self) -> &Value {
        &self.query.params
    }

    pub fn reply(self, result: Value) -> Result<(), ProtocolError> {
        self.channel.send(self.query.response(result))
    }

    pub fn reply_error(self, error: Value) -> Result<(), ProtocolError> {
        self.channel.send(self.query.error_reply(error))
    }
}
