//! Clipweave Common Utilities
//!
//! Shared infrastructure for all Clipweave crates:
//! - Error types and result aliases
//! - Wall clocks and frame/time conversions for the playback loop
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
