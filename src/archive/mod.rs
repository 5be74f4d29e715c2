//! Archive files.
//!
//! This module provides:
//! - `ScratchDir`, which allocates collision-free archive paths
//! - `ArchiveWriter`, the scoped file sink a pipeline streams into

mod scratch;
mod writer;

pub use scratch::ScratchDir;
pub use writer::{ArchiveWriter, FinishedArchive};
