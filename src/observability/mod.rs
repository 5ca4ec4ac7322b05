//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handler / forwarder produce:
//!     → logging.rs (structured log events with request IDs)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
