//! Request Baskets service.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 REQUEST BASKETS               │
//!   Third-party       │  ┌─────────┐    ┌──────────┐    ┌──────────┐  │
//!   system ───────────┼─▶│  http   │───▶│ registry │───▶│  basket  │  │
//!   (ANY /{name}/..)  │  │ server  │    │ (DashMap)│    │   log    │  │
//!                     │  └────┬────┘    └──────────┘    └────┬─────┘  │
//!                     │       │                              │        │
//!   Basket owner      │       │ /baskets/..                  ▼        │
//!   ◀─────────────────┼───────┘ (token)              ┌────────────┐   │     Forward
//!                     │                              │ forwarder  │───┼───▶ target
//!                     │                              │ (detached) │   │
//!                     │                              └────────────┘   │
//!                     │  config · observability · lifecycle           │
//!                     └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use request_baskets::config::{load_config, ConfigWatcher, ServiceConfig};
use request_baskets::http::HttpServer;
use request_baskets::lifecycle::Shutdown;
use request_baskets::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "request-baskets")]
#[command(
    about = "Collect and inspect HTTP requests in token-protected baskets",
    long_about = None
)]
struct Args {
    /// Path to a TOML config file; defaults are used when omitted.
    #[arg(short, long, env = "BASKETS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_tracing(&config.observability);
    tracing::info!("request-baskets v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        default_capacity = config.baskets.default_capacity,
        max_capacity = config.baskets.max_capacity,
        forwarding = config.forwarding.enabled,
        "Configuration loaded"
    );

    // Hot reload: keep the watcher alive for the lifetime of the server.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.settings());
            match watcher.run() {
                Ok(w) => (updates, Some(w)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (updates, None)
                }
            }
        }
        None => (mpsc::unbounded_channel().1, None),
    };

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config);

    shutdown.trigger_on_signal();

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
