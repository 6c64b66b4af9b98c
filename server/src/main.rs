use clap::Parser;
use log::{error, info};
use server::config::ServerConfig;
use server::network::Server;
use shared::{
    DEFAULT_BACKLOG, DEFAULT_BUFFER_CAPACITY, DEFAULT_PORT, DEFAULT_SEQUENCE_PERIOD,
    MAX_LINE_LENGTH,
};
use std::time::Duration;

/// Main-method of the application.
/// Parses command-line arguments, binds the listener and serves clients until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Interface to bind to
        #[clap(short = 'H', long, env = "CHAT_HOST", default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[clap(short, long, env = "CHAT_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Milliseconds a session waits for input before checking for new messages
        #[clap(long, env = "CHAT_IDLE_TIMEOUT_MS", default_value = "1000")]
        idle_timeout_ms: u64,
        /// Number of messages kept in the broadcast buffer
        #[clap(long, env = "CHAT_CAPACITY", default_value_t = DEFAULT_BUFFER_CAPACITY)]
        capacity: usize,
        /// Period of the message sequence counter
        #[clap(long, env = "CHAT_PERIOD", default_value_t = DEFAULT_SEQUENCE_PERIOD)]
        period: u32,
        /// Listen backlog
        #[clap(long, env = "CHAT_BACKLOG", default_value_t = DEFAULT_BACKLOG)]
        backlog: u32,
        /// Maximum number of simultaneous clients (unbounded if omitted)
        #[clap(long, env = "CHAT_MAX_CLIENTS")]
        max_clients: Option<usize>,
        /// Longest line accepted from a client, in bytes
        #[clap(long, env = "CHAT_MAX_LINE", default_value_t = MAX_LINE_LENGTH)]
        max_line_length: usize,
    }

    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    // Parse command line arguments
    let args = Args::parse();

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        idle_timeout: Duration::from_millis(args.idle_timeout_ms),
        capacity: args.capacity,
        period: args.period,
        backlog: args.backlog,
        max_clients: args.max_clients,
        max_line_length: args.max_line_length,
    };

    info!(
        "Buffer keeps {} messages, sequence period {}",
        config.capacity, config.period
    );

    let server = Server::bind(config).await?;

    // Handle shutdown gracefully
    server
        .run(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C, shutting down gracefully..."),
                Err(e) => {
                    error!("Unable to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    Ok(())
}
