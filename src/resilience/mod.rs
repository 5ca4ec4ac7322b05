//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request:
//!     → retries.rs (Forwarder: attempt, classify, decide)
//!     → On failure with budget left: delay.rs (fixed pause), then resend
//! ```

pub mod delay;
pub mod retries;

pub use delay::{InstantSleeper, RecordingSleeper, Sleeper, TokioSleeper};
pub use retries::Forwarder;
