//! Edge failover router.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                EDGE FAILOVER                 │
//!     Client Request   │  ┌────────┐    ┌────────────┐                │
//!     ─────────────────┼─▶│  http  │───▶│  routing   │                │
//!                      │  │ server │    │ dispatcher │                │
//!                      │  └───┬────┘    └─────┬──────┘                │
//!                      │      │               │ check primary,        │
//!                      │      │               │ then secondary        │
//!                      │      │               ▼                       │
//!                      │      │         ┌────────────┐   status query │
//!                      │      │         │   health   │────────────────┼──▶ Status service
//!                      │      │         │ evaluator  │                │
//!                      │      │         └────────────┘                │
//!                      │      │ Forward(host rewritten)               │
//!                      │      └───────────────────────────────────────┼──▶ Primary / Secondary
//!                      │        Respond(404) when both fail           │
//!                      └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use edge_failover::config::{load_config, FailoverConfig};
use edge_failover::lifecycle::{build_server, signals, Shutdown};
use edge_failover::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "edge-failover")]
#[command(about = "Routes each request to the primary backend, or the secondary when the primary is unhealthy", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => FailoverConfig::default(),
    };

    logging::init_logging(&config.observability)?;

    tracing::info!("edge-failover v{} starting", edge_failover::VERSION);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        primary = %config.primary.host,
        secondary = %config.secondary.host,
        health_source = %config.health_source.base_url,
        "Configuration loaded"
    );

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
    let server = build_server(config)?;
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => result??,
        _ = signals::shutdown_on_signal(&shutdown) => server_task.await??,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
