//! GestureMouse Common Utilities
//!
//! Shared infrastructure for all GestureMouse crates:
//! - Error types and result aliases
//! - Frame clock and FPS measurement
//! - Tracing/logging initialization
//! - Gesture configuration contract and config file loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
