//! Shared broadcast log read by every session
//!
//! The buffer keeps the last `capacity` messages, each stamped with a cyclic
//! sequence number. Sessions poll it with their own cursor and receive only
//! what they have not delivered yet.
//!
//! All access goes through a `tokio::sync::RwLock`. Readers share the lock,
//! a writer holds it alone, and waiters are admitted in arrival order, so a
//! queued writer gets in before any reader that shows up after it. Readers
//! that already hold the lock finish first.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};
use log::debug;
use tokio::sync::RwLock;

use crate::indexer::{positions_already_seen, Seq};

/// `asctime`-style layout, e.g. `Mon Oct 19 14:03:05 2026`
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// A single broadcast entry, displayed the way it is sent to clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sequence: Seq,
    pub timestamp: DateTime<Local>,
    pub text: String,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "At {} -- {}",
            self.timestamp.format(ASCTIME_FORMAT),
            self.text
        )
    }
}

/// Unread messages returned by [`BroadcastBuffer::read`]
#[derive(Debug, Clone)]
pub struct Batch {
    /// Unread messages, oldest first
    pub messages: Vec<Message>,
    /// Sequence number the reader should store as its new cursor
    pub newest: Seq,
}

#[derive(Debug)]
struct Log {
    messages: VecDeque<Message>,
    next_sequence: Seq,
}

impl Log {
    fn newest(&self) -> Option<Seq> {
        self.messages.back().map(|m| m.sequence)
    }
}

/// Bounded message log with cyclic sequence numbers
#[derive(Debug)]
pub struct BroadcastBuffer {
    log: RwLock<Log>,
    capacity: usize,
    period: Seq,
}

impl BroadcastBuffer {
    /// Creates an empty buffer retaining at most `capacity` messages, with
    /// sequence numbers taken modulo `period`.
    ///
    /// `period` has to be comfortably larger than `capacity` for cursors to
    /// stay unambiguous; `ServerConfig::validate` enforces that for the server.
    pub fn new(capacity: usize, period: Seq) -> Self {
        Self {
            log: RwLock::new(Log {
                messages: VecDeque::with_capacity(capacity + 1),
                next_sequence: 0,
            }),
            capacity,
            period,
        }
    }

    /// Appends `text` under the next sequence number, evicting the oldest
    /// entries beyond capacity. Returns a copy of the stored message.
    pub async fn write(&self, text: impl Into<String>) -> Message {
        let mut log = self.log.write().await;

        let message = Message {
            sequence: log.next_sequence,
            timestamp: Local::now(),
            text: text.into(),
        };
        log.next_sequence = (log.next_sequence + 1) % self.period;
        log.messages.push_back(message.clone());

        while log.messages.len() > self.capacity {
            if let Some(evicted) = log.messages.pop_front() {
                debug!("Evicted message {}", evicted.sequence);
            }
        }

        message
    }

    /// Returns the messages newer than `last_read`, or `None` when there is
    /// nothing new.
    ///
    /// A `None` cursor means nothing has been read yet and always yields the
    /// whole buffer.
    pub async fn read(&self, last_read: Option<Seq>) -> Option<Batch> {
        let log = self.log.read().await;

        let newest = log.newest()?;
        if last_read == Some(newest) {
            return None;
        }

        let offset = match (last_read, log.messages.front()) {
            (Some(last_read), Some(oldest)) => {
                positions_already_seen(oldest.sequence, last_read, newest, self.period)
            }
            _ => 0,
        };

        Some(Batch {
            messages: log.messages.iter().skip(offset).cloned().collect(),
            newest,
        })
    }

    /// Sequence number of the most recent message, if any
    pub async fn newest(&self) -> Option<Seq> {
        self.log.read().await.newest()
    }

    pub async fn len(&self) -> usize {
        self.log.read().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.log.read().await.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn period(&self) -> Seq {
        self.period
    }
}
