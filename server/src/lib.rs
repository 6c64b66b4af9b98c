//! # Chat Relay Server Library
//!
//! This library provides the server side of a multi-client chat relay. Clients
//! connect over TCP, send text lines and a couple of session commands, and
//! receive one shared, ordered stream of everybody's activity.
//!
//! ## Core Responsibilities
//!
//! ### Message Distribution
//! Every chat message, rename and join/leave announcement is written to a
//! single bounded broadcast buffer. Each message gets a sequence number from a
//! cyclic counter, and sessions remember the last sequence number they have
//! delivered so they only send what their client has not seen yet.
//!
//! ### Session Handling
//! Every accepted connection gets its own task running a
//! [`session::ClientSession`]. The session alternates between draining unread
//! messages to its client and waiting, with a short timeout, for the next line
//! of input. The timeout is what keeps idle clients up to date.
//!
//! ### Connection Management
//! The accept loop registers connections, optionally caps how many may be
//! open at once, and closes every connection on shutdown.
//!
//! ## Architecture Design
//!
//! ### Shared Buffer, Private Sessions
//! The broadcast buffer is the only state sessions share. It sits behind a
//! readers/writers lock that lets any number of sessions read at once while
//! writes are exclusive. Waiters are queued in arrival order, so a pending
//! write is never starved by a steady stream of readers.
//!
//! ### Wraparound-Safe Cursors
//! Sequence numbers wrap at a configurable period that is much larger than the
//! buffer capacity. The [`indexer`] module places a session's cursor inside
//! the buffered window even when that window straddles the wrap point.
//!
//! ## Module Organization
//!
//! ### Indexer Module (`indexer`)
//! Pure cursor arithmetic over the cyclic sequence counter.
//!
//! ### Buffer Module (`buffer`)
//! The bounded broadcast log and its message type.
//!
//! ### Session Module (`session`)
//! The per-connection drain/receive loop and command dispatch.
//!
//! ### Client Manager Module (`client_manager`)
//! Registry of open connections and the optional connection limit.
//!
//! ### Config Module (`config`)
//! Server settings and their validation.
//!
//! ### Network Module (`network`)
//! Listen socket setup, the accept loop and shutdown.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_string(),
//!         port: 50000,
//!         ..ServerConfig::default()
//!     };
//!
//!     // Binds the listener and creates the shared broadcast buffer
//!     let server = Server::bind(config).await?;
//!
//!     // Accept clients until Ctrl+C, then close every connection
//!     server
//!         .run(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod client_manager;
pub mod config;
pub mod indexer;
pub mod network;
pub mod session;
