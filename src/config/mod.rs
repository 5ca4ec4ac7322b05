//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overlay (API_KEY, DOMAIN, DKIM_PRIVATE_KEY)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → handed to the server at startup
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    Credentials, ListenerConfig, LogFormat, ObservabilityConfig, RelayConfig, SecurityConfig,
    TimeoutConfig, UpstreamConfig,
};
