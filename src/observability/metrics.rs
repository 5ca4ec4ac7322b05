//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): inbound requests by method, status
//! - `relay_request_duration_seconds` (histogram): inbound latency, retries included
//! - `relay_upstream_attempts_total` (counter): upstream attempts by outcome
//!   (`success`, `failure`, `error`)
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    let method = method.to_string();
    counter!(
        "relay_requests_total",
        "method" => method.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("relay_request_duration_seconds", "method" => method)
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_attempt(outcome: &'static str) {
    counter!("relay_upstream_attempts_total", "outcome" => outcome).increment(1);
}
