//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the send handler on every path
//! - Wire up middleware (request ID, tracing, whole-request timeout)
//! - Build the production Forwarder from configuration
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RelayConfig;
use crate::http::handler::{send_handler, AppState};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::resilience::{Forwarder, TokioSleeper};
use crate::upstream::ReqwestTransport;

/// HTTP server for the relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    /// Create a server that talks to the configured upstream over the network.
    pub fn new(config: RelayConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::new(config.upstream.attempt_timeout()));
        let forwarder = Forwarder::new(
            transport,
            Arc::new(TokioSleeper),
            config.upstream.retry_delay(),
        );
        Self::with_forwarder(config, forwarder)
    }

    /// Create a server around an existing forwarder.
    pub fn with_forwarder(config: RelayConfig, forwarder: Forwarder) -> Self {
        let state = AppState {
            forwarder,
            credentials: Arc::new(config.credentials.clone()),
            upstream_url: Arc::from(config.upstream.url.as_str()),
            retry_budget: config.upstream.retry_budget(),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(send_handler))
            .route("/{*path}", any(send_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            max_attempts = self.config.upstream.max_attempts,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}
