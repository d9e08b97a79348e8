//! Tandem server binary.
//!
//! # Usage
//!
//! ```bash
//! # Serve a fresh document
//! tandem-server --bind 0.0.0.0:8022
//!
//! # Serve a file's contents (read once at start, never written back)
//! tandem-server --document notes.txt --max-sessions 8
//!
//! # Connect from a terminal
//! socat -,raw,echo=0 tcp:localhost:8022
//! ```

use std::path::PathBuf;

use clap::Parser;
use tandem_core::Viewport;
use tandem_server::{DriverConfig, Server, ServerError, ServerRuntimeConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Tandem collaborative editing server
#[derive(Parser, Debug)]
#[command(name = "tandem-server")]
#[command(about = "Shared modal text editor over raw terminal connections")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:8022")]
    bind: String,

    /// Terminal width assumed until a client reports its size
    #[arg(long, default_value = "80")]
    width: usize,

    /// Terminal height assumed until a client reports its size
    #[arg(long, default_value = "24")]
    height: usize,

    /// Maximum concurrent sessions
    #[arg(long, default_value = "64")]
    max_sessions: usize,

    /// File whose contents seed the shared document
    #[arg(short, long)]
    document: Option<PathBuf>,

    /// Seed for marker colours (random if omitted)
    #[arg(long)]
    color_seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Tandem server starting");
    tracing::info!("Binding to {}", args.bind);

    let initial_text = match &args.document {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read document {}: {e}", path.display())))?,
        None => String::new(),
    };

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        driver: DriverConfig {
            default_viewport: Viewport::new(args.width, args.height),
            max_sessions: args.max_sessions,
            initial_text,
            color_seed: args.color_seed,
        },
    };

    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
