use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("unable to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("peer {0} disconnected")]
    PeerDisconnected(SocketAddr),

    #[error("send timed out after {0:?}")]
    SendTimeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("framing error: {0}")]
    Codec(LinesCodecError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<LinesCodecError> for ChatError {
    fn from(err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::Io(e) => ChatError::Io(e),
            other => ChatError::Codec(other),
        }
    }
}
