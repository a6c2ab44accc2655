//! Reverse-dispatching HTTP gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                     GATEWAY                      │
//!   Client GET         │  ┌──────────┐    ┌──────────────┐                │
//!   ───────────────────┼─▶│  http    │───▶│load_balancer │                │
//!                      │  │  server  │    │  (Balancer)  │◀──┐            │
//!                      │  └──────────┘    └──────┬───────┘   │            │
//!                      │                         │      ┌────┴─────┐      │
//!                      │                         │      │  health  │◀─────┼── GET /load
//!                      │                         ▼      │  (load)  │      │
//!   Client response    │  ┌──────────┐    ┌──────────┐  └──────────┘      │
//!   ◀──────────────────┼──│  relay   │◀───│ forward  │◀───────────────────┼── Backend
//!                      │  └──────────┘    └──────────┘                    │
//!                      └──────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//! - `BACKEND_SERVERS`: `host[:port]` or `host[:port]|weight`, comma separated
//!   (required; startup waits until it is set)
//! - `LOAD_BALANCER_PORT`: listening port, default 80
//! - `LOAD_SENSITIVE`: `true` polls backend load before every draw
//! - `--config <file>`: optional TOML file, overridden by the environment

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use lb_gateway::config::load_config;
use lb_gateway::lifecycle::startup::{build_registry, gate_policy, EnvSource};
use lb_gateway::lifecycle::Shutdown;
use lb_gateway::observability::{logging, metrics};
use lb_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "lb-gateway")]
#[command(about = "HTTP load balancer with static and load-adjusted weights", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init(&config.observability.log_level);

    tracing::info!(
        port = config.listener.port,
        strategy = %config.balancing.strategy,
        "Configuration loaded"
    );

    if let Some(address) = &config.observability.metrics_address {
        match address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(metrics_address = %address, error = %e, "Failed to parse metrics address"),
        }
    }

    let policy = gate_policy(Duration::from_secs(config.startup.retry_interval_secs));
    let registry = build_registry(&EnvSource, &policy).await?;

    let server = HttpServer::new(&config, registry)?;
    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], config.listener.port))).await?;

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, stop).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
