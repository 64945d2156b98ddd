//! Line-delimited JSON over any async byte stream.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::protocol::Message;

/// Longest accepted line, newline excluded.
pub const MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

/// Decoded messages buffered between the reader task and its consumer.
pub const INBOX_CAPACITY: usize = 64;

/// Forward decoded messages from `reader` until EOF, a read error, or a line
/// longer than `max_line` bytes.
///
/// Unreadable lines are logged and skipped. A full `tx` pauses reading.
/// Dropping the sender on exit is how the other side learns the peer is gone.
pub async fn read_messages<R>(reader: R, tx: mpsc::Sender<Message>, max_line: usize)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let limit = u64::try_from(max_line).unwrap_or(u64::MAX).saturating_add(1);
        match (&mut reader).take(limit).read_until(b'\n', &mut buf).await {
            Ok(0) => {
                debug!("peer closed the connection");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%err, "read failed");
                break;
            }
        }

        if buf.last() != Some(&b'\n') && buf.len() > max_line {
            warn!(limit = max_line, "line too long, closing the connection");
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(err) => {
                warn!(%err, "dropping line that is not utf-8");
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match Message::from_line(line) {
            Ok(message) => {
                if tx.send(message).await.is_err() {
                    break;
                }
            }
            Err(err) => warn!(%err, "dropping unreadable line"),
        }
    }
}

pub async fn write_message<W>(writer: &mut W, message: &Message) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = message.to_line();
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

/// Write every message from `outbox` as one whole line, then shut the stream
/// down once the outbox is closed.
///
/// A write error ends the task without draining. The closed receiver is how
/// senders learn the peer is gone.
pub async fn write_messages<W>(mut writer: W, mut outbox: mpsc::Receiver<Message>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outbox.recv().await {
        if let Err(err) = write_message(&mut writer, &message).await {
            warn!(%err, "write failed");
            return;
        }
    }
    if let Err(err) = writer.shutdown().await {
        debug!(%err, "shutdown failed");
    }
}
