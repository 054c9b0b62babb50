use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use api_server::{AppState, router};
use clap::Parser;
use client::config::load_config;
use client::gateway::Gateway;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "asset-api")]
#[command(about = "Serves the asset chaincode over HTTP")]
struct Args {
    /// Path to config.toml
    #[arg(long)]
    config_file: Option<PathBuf>,
    /// Ledger snapshot to use instead of the configured one
    #[arg(long)]
    state_file: Option<PathBuf>,
    /// Port to listen on instead of the configured one
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config_file.as_deref())?;
    client::init_tracing(&config.logging.level);
    if let Some(state_file) = args.state_file {
        config.ledger.state_file = state_file;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    info!("Configuration loaded");

    let gateway = Gateway::open(&config.ledger)?;
    let app = router(AppState::new(gateway));

    let addr: SocketAddr = config
        .server
        .addr()
        .parse()
        .with_context(|| format!("invalid server address '{}'", config.server.addr()))?;
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!("Server is running on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
