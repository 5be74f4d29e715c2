//! Engine configuration and constants.
//!
//! This module provides:
//! - Configuration constants (default ports, buffer sizes, limits, etc.)
//! - Engine-wide settings shared by the library and the CLI

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
