//! Novelly SPA Host
//!
//! Serves the built browser UI and forwards `/api` to the backend.
//!
//! Run with: cargo run --bin novelly -- --config ./config.toml

use clap::Parser;
use novelly::config::Config;
use novelly::logging::init_tracing;
use novelly::server::{serve, ServerState};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "novelly")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve the Novelly web client and proxy its API calls")]
struct Args {
    /// Config file (default: standard locations, then environment)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the UI build directory
    #[arg(long)]
    static_dir: Option<String>,

    /// Override the backend origin
    #[arg(long)]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::resolve(args.config.as_deref())?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.static_dir {
        config.server.static_dir = dir;
    }
    if let Some(url) = args.backend_url {
        config.server.backend_url = url;
    }

    init_tracing(&config.logging)?;
    tracing::info!("Starting Novelly v{}", env!("CARGO_PKG_VERSION"));

    let state = ServerState::new(config.server)?;
    serve(state).await?;

    tracing::info!("Novelly stopped");
    Ok(())
}
