mod network;

use clap::Parser;
use log::info;
use shared::DEFAULT_PORT;
use std::time::Duration;
use tokio_util::codec::{FramedRead, LinesCodec};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to (defaults to 127.0.0.1 on the standard chat port)
    #[arg(short = 's', long)]
    server: Option<String>,

    /// Give up connecting after this many milliseconds
    #[arg(long, default_value = "5000")]
    connect_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let server = args
        .server
        .unwrap_or_else(|| format!("127.0.0.1:{}", DEFAULT_PORT));

    info!("Connecting to: {}", server);

    let client =
        network::Client::connect(&server, Duration::from_millis(args.connect_timeout_ms)).await?;

    println!("Connected to {}. You can start sending messages", client.server_addr());
    println!("Commands: /nick <name> to rename, /quit [reason] to leave");

    let input = FramedRead::new(tokio::io::stdin(), LinesCodec::new());
    client.run(input, tokio::io::stdout()).await?;

    println!("Disconnected from chat server");
    Ok(())
}
