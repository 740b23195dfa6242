use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use ymux::config::load_config;
use ymux::lifecycle::{signals, Shutdown};
use ymux::observability::{logging, metrics};
use ymux::{HttpServer, IdentityProvider, MuxServer};

#[derive(Parser)]
#[command(name = "ymux")]
#[command(about = "Minecraft Yggdrasil server mux", long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .map_err(|e| format!("error reading config file {}: {e}", cli.config.display()))?;

    logging::init(config.debug);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.listen,
        upstreams = config.servers.len(),
        metrics_enabled = config.metrics.enabled,
        "Starting ymux"
    );

    let mux = MuxServer::from_config(&config)?;
    tracing::info!(name = %mux.name(), "Multiplexer ready");

    let metrics_handle = if config.metrics.enabled {
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listen).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    HttpServer::new(Arc::new(mux), metrics_handle)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
