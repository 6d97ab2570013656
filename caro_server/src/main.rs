//! Real-time Caro server.
//!
//! Serves the game event channel over WebSocket and a health endpoint, with
//! optional Prometheus metrics.

use std::net::SocketAddr;

use anyhow::Error;
use caro_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a real-time Caro (Gomoku) server

USAGE:
  caro_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address   [default: env SERVER_BIND or 127.0.0.1:5000]
  --metrics-bind  IP:PORT  Prometheus exporter address  [default: env METRICS_BIND, disabled if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:5000)
  METRICS_BIND             Prometheus exporter address (e.g., 0.0.0.0:9090)
  WS_EVENT_BUFFER          Outbound events queued per connection  [default: 64]
  WS_BURST_LIMIT           Client messages allowed per second     [default: 10]
  WS_SUSTAINED_LIMIT       Client messages allowed per minute     [default: 100]
  RUST_LOG                 Log filter                             [default: info]
";

struct Args {
    bind: Option<SocketAddr>,
    metrics_bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        metrics_bind: pargs.opt_value_from_str("--metrics-bind")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.metrics_bind)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exported at http://{}/metrics", addr);
    }

    let bind = config.bind;
    let app = api::create_router(AppState::new(config));

    info!("Starting HTTP/WebSocket server on {}", bind);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind, e))?;

    info!("Server is running at http://{}. Press Ctrl+C to stop.", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
