//! Upstream send API subsystem.
//!
//! # Data Flow
//! ```text
//! handler builds OutboundRequest
//!     → resilience::retries (Forwarder loop)
//!     → client.rs (Transport: one attempt per call)
//!     → UpstreamResponse passed back verbatim
//! ```

pub mod client;

pub use client::{OutboundRequest, ReqwestTransport, Transport, TransportError, UpstreamResponse};
