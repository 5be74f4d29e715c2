//! dbdump_pipeline library: database dumps through a compressor into archives
//!
//! This library turns a typed dump request (MySQL, PostgreSQL or MongoDB) into a
//! `<dump tool> | <compressor>` pipeline, runs it in its own process group with
//! a hard deadline, streams the result into a private scratch file and returns
//! the finished archive. On any failure the process group is terminated and no
//! partial archive is left behind.
//!
//! # Example
//!
//! ```no_run
//! use dbdump_pipeline::builder::{Connection, PostgresDump};
//! use dbdump_pipeline::{Config, DumpRunner};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = DumpRunner::from_config(&Config::default());
//! let request = PostgresDump {
//!     connection: Connection {
//!         host: "db.internal".into(),
//!         database: "app".into(),
//!         user: "backup".into(),
//!         password: std::env::var("PGPASSWORD").ok(),
//!         ..Default::default()
//!     },
//!     timeout: Some(Duration::from_secs(3600)),
//!     ..Default::default()
//! };
//!
//! let archive = runner.dump(&request.into()).await?;
//! println!("{} bytes at {}", archive.bytes, archive.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime, a POSIX `sh`, and the dump tools and
//! compressors on `PATH`.

#![warn(missing_docs)]

pub mod archive;
pub mod builder;
pub mod cli;
pub mod config;
mod dump;
mod error_handling;
pub mod initialization;
pub mod pipeline;
pub mod shell;
pub mod upload;
mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use dump::{Archive, DumpReport, DumpRunner};
pub use error_handling::{
    BuildError, DumpError, FailureKind, InitializationError, PipelineError, UploadError,
};
