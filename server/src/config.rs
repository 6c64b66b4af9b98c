//! Server settings

use shared::{
    ChatError, DEFAULT_BACKLOG, DEFAULT_BUFFER_CAPACITY, DEFAULT_IDLE_TIMEOUT, DEFAULT_PORT,
    DEFAULT_SEQUENCE_PERIOD, MAX_LINE_LENGTH,
};
use std::time::Duration;

/// Everything the server needs to bind, accept and run sessions
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind to
    pub host: String,
    /// Port to listen on, `0` picks a free one
    pub port: u16,
    /// How long a session waits for input before draining the buffer again
    pub idle_timeout: Duration,
    /// Number of messages kept in the broadcast buffer
    pub capacity: usize,
    /// Period of the cyclic sequence counter
    pub period: u32,
    /// Listen backlog
    pub backlog: u32,
    /// Simultaneous connection limit, unbounded when `None`
    pub max_clients: Option<usize>,
    /// Longest inbound line accepted from a client
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            capacity: DEFAULT_BUFFER_CAPACITY,
            period: DEFAULT_SEQUENCE_PERIOD,
            backlog: DEFAULT_BACKLOG,
            max_clients: None,
            max_line_length: MAX_LINE_LENGTH,
        }
    }
}

impl ServerConfig {
    /// Listen address as `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Rejects settings the buffer and sessions cannot work with
    pub fn validate(&self) -> Result<(), ChatError> {
        check_window(self.capacity, self.period)?;

        if self.idle_timeout.is_zero() {
            return Err(ChatError::Config(
                "idle timeout must be greater than zero".to_string(),
            ));
        }

        if self.backlog == 0 {
            return Err(ChatError::Config("backlog must be at least 1".to_string()));
        }

        if self.max_line_length == 0 {
            return Err(ChatError::Config(
                "maximum line length must be at least 1".to_string(),
            ));
        }

        if self.max_clients == Some(0) {
            return Err(ChatError::Config(
                "max clients must be at least 1 when set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Checks that a buffer of `capacity` messages can use a counter of `period`
///
/// The period must be at least twice the capacity, otherwise a cursor can no
/// longer be placed unambiguously once the counter wraps.
pub fn check_window(capacity: usize, period: u32) -> Result<(), ChatError> {
    if capacity == 0 {
        return Err(ChatError::Config(
            "buffer capacity must be at least 1".to_string(),
        ));
    }

    if (period as usize) < capacity.saturating_mul(2) {
        return Err(ChatError::Config(format!(
            "sequence period {} must be at least twice the buffer capacity {}",
            period, capacity
        )));
    }

    Ok(())
}
