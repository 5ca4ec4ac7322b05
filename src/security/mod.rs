//! Security subsystem.
//!
//! # Components
//! - **auth**: bearer token extraction and comparison against the configured key

pub mod auth;

pub use auth::{bearer_token, is_authorized};
