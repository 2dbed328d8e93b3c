//! Same-Origin Session Proxy
//!
//! Browsers that block third-party cookies (Safari, iOS) never store the
//! backend's session cookie when the dashboard calls the backend directly.
//! This proxy serves the backend under the dashboard's own origin.
//!
//! ```text
//!                        ┌──────────────────────────────────────────┐
//!                        │              SESSION PROXY               │
//!   Browser              │                                          │
//!   ───────────────────▶ │  /api/backend/*      ─▶ generic proxy ─┐ │
//!                        │  /api/session/check  ─▶ check passthru ─┼─┼──▶ Backend
//!                        │  /api/session/logout ─▶ logout ────────┘ │
//!   ◀─────────────────── │  Set-Cookie rewritten to this origin     │
//!                        └──────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use session_proxy::config::load_config;
use session_proxy::lifecycle::{wait_for_signal, Shutdown};
use session_proxy::observability::{logging, metrics};
use session_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "session-proxy")]
#[command(about = "Same-origin session proxy for the admin dashboard", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!("session-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = ?config.deployment.environment,
        backend_timeout_secs = ?config.timeouts.backend_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    let signals = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signals.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
