//! Errors surfaced to inbound callers.

use crate::email::PayloadError;
use crate::upstream::TransportError;

/// Reasons a send request ends without an upstream response.
///
/// Each variant maps to a fixed HTTP status in `http::response`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Payload Too Large")]
    PayloadTooLarge,
    #[error("Bad Request: {0}")]
    InvalidPayload(#[from] PayloadError),
    #[error("Bad Gateway: {0}")]
    Upstream(#[from] TransportError),
}
