//! Error handling.
//!
//! This module provides the error taxonomy of the engine:
//! - **BuildError**: malformed configuration, detected before spawning
//! - **PipelineError**: launch, timeout, tool, sink and empty-output failures
//! - **DumpError**: either of the above, as seen by the orchestrator
//! - **UploadError**: failures of the blob-upload collaborator

mod types;

// Re-export public API
pub use types::{
    BuildError, DumpError, FailureKind, InitializationError, PipelineError, UploadError,
};
