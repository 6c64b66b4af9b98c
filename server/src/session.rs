//! Per-connection chat session
//!
//! A session alternates between two phases until the client leaves:
//!
//! 1. **Drain** - everything in the broadcast buffer newer than the session's
//!    cursor is sent to the client, then the cursor moves to the newest entry.
//! 2. **Receive** - wait up to the idle timeout for one line of input. A line
//!    is dispatched as a command or chat message; a timeout just loops back to
//!    the drain phase so idle clients still get new messages.
//!
//! Sessions only share the broadcast buffer. A failing session announces its
//! exit and stops; it never affects other sessions.

use crate::buffer::BroadcastBuffer;
use crate::config::ServerConfig;
use crate::indexer::Seq;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use shared::{ChatError, Command};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client sent `/quit`
    Quit,
    /// The connection closed or failed
    Disconnected,
}

/// Result of one receive attempt
#[derive(Debug)]
enum Inbound {
    Line(String),
    Idle,
    Closed(ChatError),
}

/// State for one connected client
pub struct ClientSession<R, W> {
    reader: FramedRead<R, LinesCodec>,
    writer: FramedWrite<W, LinesCodec>,
    buffer: Arc<BroadcastBuffer>,
    peer: SocketAddr,
    display_name: String,
    last_read: Option<Seq>,
    idle_timeout: Duration,
}

impl ClientSession<OwnedReadHalf, OwnedWriteHalf> {
    /// Builds a session over an accepted TCP connection
    pub fn from_tcp(
        stream: TcpStream,
        peer: SocketAddr,
        buffer: Arc<BroadcastBuffer>,
        config: &ServerConfig,
    ) -> Self {
        let (reader, writer) = stream.into_split();
        Self::new(reader, writer, peer, buffer, config)
    }
}

impl<R, W> ClientSession<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a session for `peer`. The display name starts out as the
    /// peer's address and the cursor as "nothing read yet".
    pub fn new(
        reader: R,
        writer: W,
        peer: SocketAddr,
        buffer: Arc<BroadcastBuffer>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            reader: FramedRead::new(reader, LinesCodec::new_with_max_length(config.max_line_length)),
            writer: FramedWrite::new(writer, LinesCodec::new()),
            buffer,
            peer,
            display_name: peer.to_string(),
            last_read: None,
            idle_timeout: config.idle_timeout,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn last_read(&self) -> Option<Seq> {
        self.last_read
    }

    /// Runs the session until the client quits or the connection goes away
    pub async fn run(mut self) -> SessionEnd {
        info!("Session started for {}", self.peer);
        self.buffer
            .write(format!("{} has joined", self.display_name))
            .await;

        let end = loop {
            if let Err(e) = self.drain().await {
                warn!("Failed to send to {}: {}", self.peer, e);
                self.announce_exit(&e).await;
                break SessionEnd::Disconnected;
            }

            match self.receive().await {
                Inbound::Idle => continue,
                Inbound::Closed(reason) => {
                    info!("Connection from {} closed: {}", self.peer, reason);
                    self.announce_exit(&reason).await;
                    break SessionEnd::Disconnected;
                }
                Inbound::Line(line) => {
                    if let Some(end) = self.dispatch(&line).await {
                        break end;
                    }
                }
            }
        };

        match timeout(self.idle_timeout, SinkExt::<String>::close(&mut self.writer)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Error closing connection to {}: {}", self.peer, e),
            Err(_) => debug!("Gave up flushing to {} on close", self.peer),
        }
        info!("Session for {} ({}) ended: {:?}", self.peer, self.display_name, end);
        end
    }

    /// Sends every unread buffered message and advances the cursor
    ///
    /// Sending is bounded by the idle timeout. A client that stops reading
    /// gets a `SendTimeout` instead of stalling the session.
    async fn drain(&mut self) -> Result<(), ChatError> {
        let Some(batch) = self.buffer.read(self.last_read).await else {
            return Ok(());
        };

        let writer = &mut self.writer;
        let send = async {
            for message in &batch.messages {
                writer.feed(message.to_string()).await?;
            }
            SinkExt::<String>::flush(writer).await
        };
        timeout(self.idle_timeout, send)
            .await
            .map_err(|_| ChatError::SendTimeout(self.idle_timeout))??;

        debug!(
            "Sent {} message(s) to {}, cursor now {}",
            batch.messages.len(),
            self.peer,
            batch.newest
        );
        self.last_read = Some(batch.newest);
        Ok(())
    }

    /// Waits up to the idle timeout for one line from the client
    async fn receive(&mut self) -> Inbound {
        match timeout(self.idle_timeout, self.reader.next()).await {
            Err(_) => Inbound::Idle,
            Ok(None) => Inbound::Closed(ChatError::PeerDisconnected(self.peer)),
            Ok(Some(Ok(line))) => Inbound::Line(line),
            Ok(Some(Err(e))) => Inbound::Closed(e.into()),
        }
    }

    /// Acts on one line of input. Returns `Some` when the session should end.
    async fn dispatch(&mut self, line: &str) -> Option<SessionEnd> {
        match Command::parse(line) {
            Command::Nick(name) if name.is_empty() => {
                debug!("Ignoring empty rename from {}", self.peer);
                None
            }
            Command::Nick(name) => {
                let old = std::mem::replace(&mut self.display_name, name);
                debug!("{} renamed {} -> {}", self.peer, old, self.display_name);
                self.buffer
                    .write(format!("{} now goes by {}", old, self.display_name))
                    .await;
                None
            }
            Command::Quit(reason) => {
                let text = match reason {
                    Some(reason) => format!("{} is leaving now -- {}", self.display_name, reason),
                    None => format!("{} is leaving now", self.display_name),
                };
                self.buffer.write(text).await;
                Some(SessionEnd::Quit)
            }
            Command::Empty => None,
            Command::Say(text) => {
                self.buffer
                    .write(format!("Message from {}:\n\t{}", self.display_name, text))
                    .await;
                None
            }
        }
    }

    async fn announce_exit(&self, reason: &ChatError) {
        let text = match reason {
            ChatError::PeerDisconnected(_) => format!("{} has exited", self.display_name),
            other => format!("{} has exited -- {}", self.display_name, other),
        };
        self.buffer.write(text).await;
    }
}
