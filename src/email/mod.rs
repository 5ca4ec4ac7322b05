//! Email send payload handling.

pub mod personalization;

pub use personalization::{apply_dkim, parse_payload, PayloadError};
