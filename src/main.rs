//! DKIM signing relay.
//!
//! ```text
//!   caller ── POST + Bearer ──▶ ┌──────────────────────────────┐
//!                               │ handler: auth, DKIM merge    │
//!                               │ forwarder: up to N attempts, │ ──▶ upstream send API
//!   caller ◀── verbatim reply ─ │ fixed delay between them     │ ◀──
//!                               └──────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use dkim_relay::config::load_config;
use dkim_relay::lifecycle::{signals, Shutdown};
use dkim_relay::observability::{logging, metrics};
use dkim_relay::RelayServer;

#[derive(Parser)]
#[command(name = "dkim-relay")]
#[command(about = "Authenticated DKIM signing relay for the MailChannels send API", long_about = None)]
struct Cli {
    /// Optional TOML config file. API_KEY, DOMAIN and DKIM_PRIVATE_KEY override it.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    if cli.check {
        println!("configuration OK");
        return Ok(());
    }

    logging::init_logging(&config.observability);
    tracing::info!("dkim-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        max_attempts = config.upstream.max_attempts,
        retry_delay_ms = config.upstream.retry_delay_ms,
        credentials = ?config.credentials,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, metrics_address = %addr, "Failed to start metrics endpoint");
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = RelayServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
