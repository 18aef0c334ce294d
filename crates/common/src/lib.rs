//! Playtrace Common Utilities
//!
//! Shared infrastructure for all Playtrace crates:
//! - Error types and result aliases
//! - Session clock for stream timestamping
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
