use clap::Parser;
use eyre::{Context, Result};
use std::io::BufReader;
use tokio::net::TcpListener;
use todostore::config::{Cli, ServerConfig};
use todostore::server;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_cli(Cli::parse())?;
    info!(?config, "Starting todo server");

    let store = server::open_store(&config.backend)?;
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    println!("Todo server running on {}\n!Q to close the server", config.bind);
    let quit = server::quit_command(BufReader::new(std::io::stdin()));
    server::serve(listener, store, server::shutdown_signal(ctrl_c(), quit)).await
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = ?e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
