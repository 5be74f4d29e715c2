//! Dump orchestration.
//!
//! Ties the pieces together for one request: build the pipeline, allocate a
//! scratch path, run it, and hand back the finished archive.

use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};
use serde::Serialize;

use crate::archive::ScratchDir;
use crate::builder::{self, DumpRequest, Engine};
use crate::config::Config;
use crate::error_handling::DumpError;
use crate::pipeline::PipelineExecutor;
use crate::utils::{duration_to_ms, format_duration};

/// A finished, non-empty archive on local disk.
///
/// The caller owns the file from here on (upload it, move it, delete it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// Archive location inside the scratch directory
    pub path: PathBuf,
    /// Size in bytes
    pub bytes: u64,
    /// Engine that produced it
    pub engine: Engine,
    /// Wall time of the pipeline
    pub elapsed: Duration,
}

impl Archive {
    /// Serializable summary of this archive.
    pub fn report(&self) -> DumpReport {
        DumpReport {
            engine: self.engine,
            path: self.path.display().to_string(),
            bytes: self.bytes,
            elapsed_ms: duration_to_ms(self.elapsed),
            blob_url: None,
        }
    }
}

/// Outcome of one dump, as printed by the CLI in JSON mode.
#[derive(Debug, Clone, Serialize)]
pub struct DumpReport {
    /// Engine name (`mysql`, `postgres`, `mongo`)
    pub engine: Engine,
    /// Local archive path
    pub path: String,
    /// Archive size in bytes
    pub bytes: u64,
    /// Pipeline wall time in milliseconds
    pub elapsed_ms: u64,
    /// Blob URL when the archive was uploaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_url: Option<String>,
}

/// Runs dump requests into a scratch directory.
///
/// Cheap to clone and safe to share: concurrent `dump` calls only share the
/// scratch root, and every call gets its own collision-free file name.
#[derive(Debug, Clone, Default)]
pub struct DumpRunner {
    executor: PipelineExecutor,
    scratch: ScratchDir,
    default_timeout: Option<Duration>,
}

impl DumpRunner {
    /// Creates a runner from its parts. Requests without a timeout run unbounded.
    pub fn new(executor: PipelineExecutor, scratch: ScratchDir) -> Self {
        Self {
            executor,
            scratch,
            default_timeout: None,
        }
    }

    /// Creates a runner from engine configuration.
    pub fn from_config(config: &Config) -> Self {
        let scratch = match &config.scratch_dir {
            Some(dir) => ScratchDir::new(dir),
            None => ScratchDir::system(),
        };
        Self {
            executor: PipelineExecutor::from_config(config),
            scratch,
            default_timeout: config.default_timeout,
        }
    }

    /// Sets the deadline applied to requests that do not carry one.
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Scratch directory archives are written to.
    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Dumps one database into a new compressed archive.
    ///
    /// # Errors
    ///
    /// - [`DumpError::Build`] if the request is malformed; nothing is spawned
    /// - [`DumpError::Pipeline`] if the pipeline fails; no archive is left behind
    pub async fn dump(&self, request: &DumpRequest) -> Result<Archive, DumpError> {
        let engine = request.engine();
        let timeout = request.timeout().or(self.default_timeout);
        let spec = builder::build(request)?.with_timeout(timeout);

        let path = self
            .scratch
            .new_path(engine.scratch_prefix(), &request.archive_extension());

        match self.executor.run(&spec, &path).await {
            Ok(output) => {
                info!(
                    "{} dump of '{}' finished: {} bytes in {}",
                    engine,
                    request.connection().database,
                    output.bytes,
                    format_duration(output.elapsed)
                );
                Ok(Archive {
                    path: output.path,
                    bytes: output.bytes,
                    engine,
                    elapsed: output.elapsed,
                })
            }
            Err(e) => {
                warn!(
                    "{} dump of '{}' failed ({}): {}",
                    engine,
                    request.connection().database,
                    e.kind(),
                    e
                );
                Err(e.into())
            }
        }
    }
}
