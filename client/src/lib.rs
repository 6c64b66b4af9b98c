//! # Chat Relay Client Library
//!
//! This library provides a terminal client for the chat relay server. It
//! connects over TCP, forwards whatever the user types, and prints the shared
//! broadcast stream as the server sends it.
//!
//! ## Architecture Overview
//!
//! ### Line Protocol
//! Both directions carry newline-terminated text. Outbound lines are either
//! chat messages or one of the session commands (`/nick <name>`,
//! `/quit [reason]`). Inbound lines are already formatted by the server as
//! `At <time> -- <text>` and are printed without any interpretation.
//!
//! ### Single Task Multiplexing
//! The client runs one loop that waits on both the input stream and the
//! server connection, so typing never blocks the display of new messages.
//!
//! ### Leaving
//! Sending `/quit` (or closing the input stream, which sends one) stops
//! reading input. The client keeps printing until the server hangs up, with
//! a short grace period in case it does not.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! Connection setup with a timeout and the send/receive loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//! use std::time::Duration;
//! use tokio_util::codec::{FramedRead, LinesCodec};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::connect("127.0.0.1:50000", Duration::from_secs(5)).await?;
//!
//!     let input = FramedRead::new(tokio::io::stdin(), LinesCodec::new());
//!     client.run(input, tokio::io::stdout()).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod network;
