//! Pipeline execution.
//!
//! Runs a [`PipelineSpec`] under the configured shell, streams its stdout into
//! an [`ArchiveWriter`] and classifies the outcome. Every failure path removes
//! the partial archive before returning; cancellation (dropping the future)
//! does the same through the writer's and the running pipeline's drop guards.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::archive::ArchiveWriter;
use crate::config::{
    Config, DEFAULT_SHELL, MAX_STDERR_CAPTURE_BYTES, STDERR_DRAIN_GRACE, TERMINATION_GRACE,
};
use crate::error_handling::PipelineError;
use crate::utils::{diagnostic_text, format_duration};

use super::running::RunningPipeline;
use super::spec::PipelineSpec;
use super::stderr;

/// A successfully produced archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Archive location
    pub path: PathBuf,
    /// Archive size in bytes (never zero)
    pub bytes: u64,
    /// Wall time from launch to the archive being synced
    pub elapsed: Duration,
}

/// Runs pipeline strings through a shell.
///
/// Holds no per-run state, so one executor can drive any number of concurrent
/// runs as long as each writes to its own destination.
#[derive(Debug, Clone)]
pub struct PipelineExecutor {
    shell: PathBuf,
    stderr_limit: usize,
    kill_grace: Duration,
}

impl Default for PipelineExecutor {
    fn default() -> Self {
        Self {
            shell: PathBuf::from(DEFAULT_SHELL),
            stderr_limit: MAX_STDERR_CAPTURE_BYTES,
            kill_grace: TERMINATION_GRACE,
        }
    }
}

impl PipelineExecutor {
    /// Creates an executor using `shell` as the interpreter.
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
            ..Default::default()
        }
    }

    /// Creates an executor from engine configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            shell: config.shell.clone(),
            stderr_limit: config.stderr_limit,
            kill_grace: TERMINATION_GRACE,
        }
    }

    /// Sets the maximum number of stderr bytes kept for diagnostics.
    pub fn with_stderr_limit(mut self, limit: usize) -> Self {
        self.stderr_limit = limit;
        self
    }

    /// Sets how long a terminated group may linger before it is sent SIGKILL.
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    /// Interpreter used to run pipelines.
    pub fn shell(&self) -> &Path {
        &self.shell
    }

    /// Runs `spec` and streams its stdout into a new file at `destination`.
    ///
    /// The destination must not exist; it is created only after the shell has
    /// been launched. Outcomes:
    ///
    /// - the shell cannot be started: [`PipelineError::Launch`], nothing written
    /// - the deadline fires: the process group is sent SIGTERM (then SIGKILL
    ///   once the kill grace runs out) and [`PipelineError::Timeout`] is
    ///   returned whatever the exit code
    /// - the file cannot be created or written: the group is terminated and
    ///   [`PipelineError::Sink`] is returned
    /// - non-zero exit: [`PipelineError::ToolFailure`] with captured stderr
    /// - zero exit with no bytes: [`PipelineError::EmptyOutput`]
    ///
    /// In every error case the destination does not exist afterwards.
    pub async fn run(
        &self,
        spec: &PipelineSpec,
        destination: &Path,
    ) -> Result<PipelineOutput, PipelineError> {
        let started = Instant::now();
        let expires_at = spec
            .timeout()
            .map(|timeout| tokio::time::Instant::now() + timeout);
        let (mut running, mut stdout, stderr_pipe) = RunningPipeline::launch(&self.shell, spec)
            .map_err(|source| PipelineError::Launch {
                shell: self.shell.clone(),
                source,
            })?;
        debug!(
            "Launched pipeline (pgid {:?}, timeout {:?}): {}",
            running.pgid(),
            spec.timeout(),
            spec.command()
        );

        let stderr_task = tokio::spawn(stderr::capture(stderr_pipe, self.stderr_limit));

        let mut sink = match ArchiveWriter::create(destination).await {
            Ok(sink) => sink,
            Err(source) => {
                running.kill();
                let _ = running.reap(self.kill_grace).await;
                stderr_task.abort();
                return Err(PipelineError::Sink {
                    path: destination.to_path_buf(),
                    source,
                });
            }
        };

        let expiry = deadline(expires_at);
        tokio::pin!(expiry);

        // Stream until EOF, a copy error, or the deadline
        let streamed = tokio::select! {
            result = tokio::io::copy(&mut stdout, &mut sink) => Some(result),
            () = &mut expiry => None,
        };
        let mut sink_error = None;
        match streamed {
            None => running.expire(),
            Some(Err(e)) => {
                running.kill();
                sink_error = Some(e);
            }
            Some(Ok(_)) => {}
        }
        drop(stdout);

        let status = if running.timed_out() || sink_error.is_some() {
            running.reap(self.kill_grace).await
        } else {
            tokio::select! {
                status = running.wait() => status,
                () = &mut expiry => {
                    running.expire();
                    running.reap(self.kill_grace).await
                }
            }
        };

        let diagnostics = collect_stderr(stderr_task).await;

        if running.timed_out() {
            sink.discard().await;
            let timeout = spec.timeout().unwrap_or_default();
            warn!(
                "Pipeline timed out after {}; process group terminated",
                format_duration(timeout)
            );
            return Err(PipelineError::Timeout {
                timeout,
                stderr: diagnostics,
            });
        }

        if let Some(source) = sink_error {
            sink.discard().await;
            return Err(PipelineError::Sink {
                path: destination.to_path_buf(),
                source,
            });
        }

        match status {
            Ok(status) if status.success() => {}
            Ok(status) => {
                sink.discard().await;
                debug!("Pipeline exited with {}", status);
                return Err(PipelineError::ToolFailure {
                    code: status.code(),
                    stderr: diagnostics,
                });
            }
            Err(e) => {
                sink.discard().await;
                return Err(PipelineError::ToolFailure {
                    code: None,
                    stderr: format!("failed to wait for pipeline: {e}"),
                });
            }
        }

        if sink.bytes_written() == 0 {
            sink.discard().await;
            return Err(PipelineError::EmptyOutput);
        }

        let finished = sink.finish().await.map_err(|source| PipelineError::Sink {
            path: destination.to_path_buf(),
            source,
        })?;
        let elapsed = started.elapsed();
        debug!(
            "Pipeline wrote {} bytes to {} in {}",
            finished.bytes,
            finished.path.display(),
            format_duration(elapsed)
        );
        Ok(PipelineOutput {
            path: finished.path,
            bytes: finished.bytes,
            elapsed,
        })
    }
}

/// Resolves at `at`, or never when no deadline is armed.
async fn deadline(at: Option<tokio::time::Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Waits briefly for the stderr reader to hit EOF and decodes what it kept.
async fn collect_stderr(mut task: JoinHandle<Vec<u8>>) -> String {
    match tokio::time::timeout(STDERR_DRAIN_GRACE, &mut task).await {
        Ok(Ok(raw)) => diagnostic_text(&raw),
        Ok(Err(e)) => {
            debug!("stderr reader failed: {}", e);
            String::new()
        }
        Err(_) => {
            debug!("stderr still open after the shell exited; giving up on it");
            task.abort();
            String::new()
        }
    }
}
