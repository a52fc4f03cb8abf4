//! rawroute server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ net::listener ──▶ http::framer ──▶ routing ──▶ http::dispatcher
//!                                                                        │
//!     Client Response                                                    ▼
//!     ◀───────────── http::response ◀──────────────────────────────── handler
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use rawroute::config::{self, ServerConfig};
use rawroute::lifecycle::{self, Shutdown};
use rawroute::observability::{logging, metrics};
use rawroute::{api, HttpServer};

#[derive(Debug, Parser)]
#[command(name = "rawroute", version, about = "Minimal HTTP/1.1 JSON server on raw sockets")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
    }

    logging::init(&config.observability);

    tracing::info!("rawroute v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        max_body_size = config.framing.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let routes = api::build_routes()?;
    for (key, template) in routes.routes() {
        tracing::info!(route = %key, template, "Route registered");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        match lifecycle::wait_for_signal().await {
            Ok(signal) => tracing::info!(signal, "Shutdown signal received"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for signals, shutting down"),
        }
        shutdown.trigger();
    });

    let server = HttpServer::new(config, routes);
    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
