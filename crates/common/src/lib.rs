//! Applicator Common Utilities
//!
//! Shared infrastructure for all Applicator crates:
//! - Error types and result aliases
//! - Supported scene frame rates and frame-to-time conversion
//! - Tracing/logging initialization
//! - Application and per-run configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
