//! Utility functions.
//!
//! This module provides:
//! - Diagnostic text sanitization
//! - Duration formatting for log output

pub mod sanitize;
mod timing;

pub use sanitize::diagnostic_text;
pub use timing::{duration_to_ms, format_duration};
