//! Configuration validation.
//!
//! Serde handles the syntactic checks; this module checks value ranges,
//! URLs and addresses. Every problem is reported, not just the first one.

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `upstream.url`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let credentials = &config.credentials;
    for (field, value) in [
        ("credentials.api_key", &credentials.api_key),
        ("credentials.dkim_domain", &credentials.dkim_domain),
        ("credentials.dkim_private_key", &credentials.dkim_private_key),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    match Url::parse(&config.upstream.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.url", e.to_string())),
    }

    if config.upstream.max_attempts == 0 {
        errors.push(ValidationError::new(
            "upstream.max_attempts",
            "must be at least 1",
        ));
    }
    if config.upstream.attempt_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "upstream.attempt_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than 0",
        ));
    }
    if let Some(needed_ms) = retry_sequence_ms(config) {
        if config.timeouts.request_secs.saturating_mul(1000) < needed_ms {
            errors.push(ValidationError::new(
                "timeouts.request_secs",
                format!(
                    "must cover the full retry sequence ({needed_ms} ms); the caller would get 408 before the last attempt"
                ),
            ));
        }
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new(
            "security.max_body_size",
            "must be greater than 0",
        ));
    }

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            e.to_string(),
        ));
    }
    if config.observability.metrics_enabled {
        if let Err(e) = config.observability.metrics_address.parse::<SocketAddr>() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                e.to_string(),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Worst case for one inbound request: every attempt hits its deadline and
/// every gap waits the full delay. `None` when the inputs are already invalid.
fn retry_sequence_ms(config: &RelayConfig) -> Option<u64> {
    let upstream = &config.upstream;
    if config.timeouts.request_secs == 0
        || upstream.max_attempts == 0
        || upstream.attempt_timeout_secs == 0
    {
        return None;
    }
    let attempts = u64::from(upstream.max_attempts);
    let per_attempt = upstream.attempt_timeout_secs.saturating_mul(1000);
    Some(
        attempts
            .saturating_mul(per_attempt)
            .saturating_add((attempts - 1).saturating_mul(upstream.retry_delay_ms)),
    )
}
