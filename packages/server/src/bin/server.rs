//! Brickrally room server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin brickrally-server
//! cargo run --bin brickrally-server -- --host 0.0.0.0 --port 3000
//! ```

use std::path::PathBuf;

use brickrally_server::{config::ServerConfig, ui::Server};
use brickrally_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "brickrally-server")]
#[command(about = "Authoritative room server for Brickrally", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "3000")]
    port: u16,

    /// JSON file holding the global scoreboard
    #[arg(long, default_value = "globalScoreboard.json")]
    scoreboard_file: PathBuf,

    /// Simulation tick period in milliseconds
    #[arg(long, default_value = "30")]
    tick_ms: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            scoreboard_file: args.scoreboard_file,
            tick_ms: args.tick_ms,
        }
    }
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ServerConfig::from(Args::parse());
    tracing::info!("Starting with {:?}", config);

    if let Err(e) = Server::new(config).run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
