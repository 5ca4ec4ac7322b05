//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handler.rs (validate, sign, forward)
//!     → response.rs (status mapping, upstream pass-through)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::AppState;
pub use request::X_REQUEST_ID;
pub use server::RelayServer;
