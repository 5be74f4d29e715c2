//! Archive upload to blob storage.
//!
//! This module provides:
//! - `BlobDestination`, the three supported ways to name a container
//! - `BlobUploader`, which streams a finished archive as a block blob
//! - `BlobReference`, the uploaded blob's URL, name and size

mod auth;
mod client;
mod destination;

// Re-export public API
pub use client::{BlobReference, BlobUploader};
pub use destination::{strip_query, BlobDestination};
