//! Live pipeline handle.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use log::warn;

use tokio::process::{Child, ChildStderr, ChildStdout, Command};

use crate::config::PIPEFAIL_PREAMBLE;

use super::reaper;
use super::spec::PipelineSpec;

/// A launched pipeline shell.
///
/// Owns the child for its whole life; nothing else may signal it. The
/// `timed_out` flag is set only by [`expire`](RunningPipeline::expire) and read
/// by the exit classification. Dropping the handle before the child has been
/// waited on sends SIGTERM to the process group; there is no escalation from
/// `Drop`, since it cannot wait out a grace period.
#[derive(Debug)]
pub(crate) struct RunningPipeline {
    child: Child,
    pgid: Option<u32>,
    timed_out: bool,
    exited: bool,
}

impl RunningPipeline {
    /// Spawns `<shell> -c <command>` as a new process group.
    ///
    /// stdin is discarded; stdout and stderr are returned as pipes. The command
    /// runs with `pipefail` where the shell supports it.
    pub(crate) fn launch(
        shell: &Path,
        spec: &PipelineSpec,
    ) -> io::Result<(Self, ChildStdout, ChildStderr)> {
        let mut command = Command::new(shell);
        command
            .arg("-c")
            .arg(format!("{}{}", PIPEFAIL_PREAMBLE, spec.command()))
            .envs(spec.env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn()?;
        let pgid = child.id();
        let mut running = Self {
            child,
            pgid,
            timed_out: false,
            exited: false,
        };
        let stdout = running
            .child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("pipeline stdout was not captured"))?;
        let stderr = running
            .child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("pipeline stderr was not captured"))?;
        Ok((running, stdout, stderr))
    }

    /// Process group id (the leader's pid).
    pub(crate) fn pgid(&self) -> Option<u32> {
        self.pgid
    }

    /// Whether the deadline fired.
    pub(crate) fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Marks the pipeline as timed out and terminates the group.
    pub(crate) fn expire(&mut self) {
        self.timed_out = true;
        reaper::terminate(&mut self.child);
    }

    /// Terminates the group without marking a timeout.
    pub(crate) fn kill(&mut self) {
        reaper::terminate(&mut self.child);
    }

    /// Waits for the shell to exit.
    pub(crate) async fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait().await;
        self.exited = true;
        status
    }

    /// Waits for a group that has been sent SIGTERM, escalating to SIGKILL
    /// when it is still alive after `grace`.
    pub(crate) async fn reap(&mut self, grace: Duration) -> io::Result<ExitStatus> {
        match tokio::time::timeout(grace, self.wait()).await {
            Ok(status) => status,
            Err(_) => {
                warn!(
                    "Process group {:?} still running {:?} after SIGTERM; sending SIGKILL",
                    self.pgid, grace
                );
                reaper::kill(&mut self.child);
                self.wait().await
            }
        }
    }
}

impl Drop for RunningPipeline {
    fn drop(&mut self) {
        if !self.exited {
            reaper::terminate(&mut self.child);
        }
    }
}
