//! The send handler.
//!
//! # Flow
//! ```text
//! inbound request
//!     → method check (POST only)         else 405
//!     → bearer token check               else 401
//!     → bounded body read                else 413
//!     → JSON parse + DKIM merge          else 400
//!     → Forwarder::send_with_retry       transport failure → 502
//!     → upstream response, verbatim
//! ```
//! Method and auth checks run before any network activity.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    response::{IntoResponse, Response},
};

use crate::config::Credentials;
use crate::email::{apply_dkim, parse_payload, PayloadError};
use crate::error::RelayError;
use crate::http::request::request_id;
use crate::observability::metrics;
use crate::resilience::Forwarder;
use crate::security::is_authorized;
use crate::upstream::{OutboundRequest, UpstreamResponse};

/// Application state injected into the handler. Read-only after startup.
#[derive(Clone, Debug)]
pub struct AppState {
    pub forwarder: Forwarder,
    pub credentials: Arc<Credentials>,
    pub upstream_url: Arc<str>,
    /// Retries allowed after the first attempt.
    pub retry_budget: u32,
    pub max_body_size: usize,
}

pub async fn send_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request_id(request.headers()).to_string();

    tracing::debug!(request_id = %request_id, method = %method, path = %request.uri().path(), "Send request received");

    let response = match relay(&state, request).await {
        Ok(upstream) => {
            if upstream.ok() {
                tracing::info!(request_id = %request_id, status = upstream.status, "Email accepted upstream");
            } else {
                tracing::warn!(request_id = %request_id, status = upstream.status, "Upstream rejected email");
            }
            upstream.into_response()
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Send request failed");
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn relay(state: &AppState, request: Request<Body>) -> Result<UpstreamResponse, RelayError> {
    if request.method() != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }
    if !is_authorized(request.headers(), &state.credentials.api_key) {
        return Err(RelayError::Unauthorized);
    }

    // Any read failure, the size limit included, is reported as 413.
    let body = axum::body::to_bytes(request.into_body(), state.max_body_size)
        .await
        .map_err(|_| RelayError::PayloadTooLarge)?;

    let mut payload = parse_payload(&body)?;
    apply_dkim(&mut payload, &state.credentials)?;
    let body =
        serde_json::to_string(&payload).map_err(|e| PayloadError::Json(e.to_string()))?;

    let outbound = OutboundRequest::post_json(&*state.upstream_url, body);
    Ok(state
        .forwarder
        .send_with_retry(&outbound, state.retry_budget)
        .await?)
}
