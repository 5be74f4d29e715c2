//! Pipeline execution.
//!
//! This module provides:
//! - `PipelineSpec`, the rendered command string, environment overlay and deadline
//! - `PipelineExecutor`, which runs a spec under `sh -c` in its own process group
//! - `terminate`, the process-group kill used on timeout and cancellation

mod executor;
mod reaper;
mod running;
mod spec;
mod stderr;

// Re-export public API
pub use executor::{PipelineExecutor, PipelineOutput};
pub use reaper::terminate;
pub use spec::PipelineSpec;
