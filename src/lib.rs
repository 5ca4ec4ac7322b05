//! DKIM signing relay for the MailChannels send API.
//!
//! Accepts authenticated `POST` send requests, injects DKIM credentials into
//! every personalization, and forwards the payload upstream with a fixed-delay
//! retry loop.

pub mod config;
pub mod email;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod upstream;

pub use config::RelayConfig;
pub use error::RelayError;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
pub use resilience::Forwarder;
