//! Error type definitions.
//!
//! This module defines every error the engine returns. Each stage of a dump has
//! its own enum so the orchestrator can tell a bad configuration apart from a
//! tool that crashed or a deadline that fired.

use std::path::PathBuf;
use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client used for uploads.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

/// Malformed dump configuration, detected before any process is spawned.
///
/// Never retried: the same request will always fail the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A required connection field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The port is outside 1..=65535.
    #[error("invalid port {0}: must be between 1 and 65535")]
    InvalidPort(i32),

    /// A table or collection filter entry is empty.
    #[error("empty {0} filter entry")]
    EmptyFilterEntry(&'static str),

    /// The same name is both included and excluded.
    #[error("'{0}' is listed in both include and exclude filters")]
    ConflictingFilter(String),

    /// The dump tool does not support the requested filter combination.
    #[error("unsupported filter: {0}")]
    UnsupportedFilter(&'static str),
}

/// Failure of a launched (or attempted) pipeline.
///
/// Every variant except `Launch` is returned only after the partial archive
/// file has been removed.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The shell could not be started (binary missing, permission denied).
    #[error("failed to launch {}: {source}", .shell.display())]
    Launch {
        /// Interpreter that was attempted
        shell: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The deadline elapsed and the process group was killed.
    #[error("command timed out after {}ms", .timeout.as_millis())]
    Timeout {
        /// Configured deadline
        timeout: Duration,
        /// Diagnostic text captured before the kill
        stderr: String,
    },

    /// The pipeline exited non-zero without timing out.
    #[error("command failed (exit {}): {stderr}", exit_label(.code))]
    ToolFailure {
        /// Exit code, `None` when the shell was killed by a signal
        code: Option<i32>,
        /// Captured stderr, trimmed and sanitized
        stderr: String,
    },

    /// The archive file could not be opened or written.
    #[error("failed to write archive {}: {source}", .path.display())]
    Sink {
        /// Archive path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The pipeline exited successfully but produced no bytes.
    #[error("command produced no output")]
    EmptyOutput,
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

/// Any failure of a full dump (build, then run).
#[derive(Error, Debug)]
pub enum DumpError {
    /// The request could not be turned into a command.
    #[error("invalid dump request: {0}")]
    Build(#[from] BuildError),

    /// The pipeline failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl DumpError {
    /// Returns the failure classification of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            DumpError::Build(_) => FailureKind::Build,
            DumpError::Pipeline(e) => e.kind(),
        }
    }
}

impl PipelineError {
    /// Returns the failure classification of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Launch { .. } => FailureKind::Launch,
            PipelineError::Timeout { .. } => FailureKind::Timeout,
            PipelineError::ToolFailure { .. } => FailureKind::ToolFailure,
            PipelineError::Sink { .. } => FailureKind::Sink,
            PipelineError::EmptyOutput => FailureKind::EmptyOutput,
        }
    }

    /// Captured diagnostic text, if the failure carries any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            PipelineError::Timeout { stderr, .. } | PipelineError::ToolFailure { stderr, .. }
                if !stderr.is_empty() =>
            {
                Some(stderr)
            }
            _ => None,
        }
    }
}

/// Coarse classification of a dump failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    /// Malformed configuration
    Build,
    /// Shell could not be started
    Launch,
    /// Deadline elapsed
    Timeout,
    /// Non-zero exit
    ToolFailure,
    /// Archive file could not be written
    Sink,
    /// Successful exit without output
    EmptyOutput,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailureKind {
    /// Returns a human-readable label for the failure kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Build => "Invalid configuration",
            FailureKind::Launch => "Launch failure",
            FailureKind::Timeout => "Timed out",
            FailureKind::ToolFailure => "Dump tool failure",
            FailureKind::Sink => "Archive write failure",
            FailureKind::EmptyOutput => "Empty output",
        }
    }
}

/// Failures of the blob-upload collaborator.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The destination configuration cannot be used.
    #[error("invalid blob destination: {0}")]
    InvalidDestination(String),

    /// The archive has no content.
    #[error("archive {} is empty", .0.display())]
    EmptyArchive(PathBuf),

    /// Reading the archive failed.
    #[error("failed to read archive: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP request could not be sent.
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The storage service rejected a request.
    #[error("storage service returned {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body (sanitized, truncated)
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_failure_kind_as_str() {
        assert_eq!(FailureKind::Timeout.as_str(), "Timed out");
        assert_eq!(FailureKind::ToolFailure.as_str(), "Dump tool failure");
        assert_eq!(FailureKind::Build.as_str(), "Invalid configuration");
    }

    #[test]
    fn test_all_failure_kinds_have_string_representation() {
        for kind in FailureKind::iter() {
            assert!(!kind.as_str().is_empty(), "{:?} should have a label", kind);
        }
    }

    #[test]
    fn test_timeout_message_reports_milliseconds() {
        let err = PipelineError::Timeout {
            timeout: Duration::from_millis(1500),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "command timed out after 1500ms");
        assert_eq!(err.kind(), FailureKind::Timeout);
        assert!(err.diagnostics().is_none());
    }

    #[test]
    fn test_tool_failure_message() {
        let err = PipelineError::ToolFailure {
            code: Some(2),
            stderr: "Access denied".to_string(),
        };
        assert_eq!(err.to_string(), "command failed (exit 2): Access denied");
        assert_eq!(err.diagnostics(), Some("Access denied"));

        let killed = PipelineError::ToolFailure {
            code: None,
            stderr: String::new(),
        };
        assert_eq!(killed.to_string(), "command failed (exit signal): ");
    }

    #[test]
    fn test_dump_error_kind_passes_through() {
        let err = DumpError::from(BuildError::MissingField("database"));
        assert_eq!(err.kind(), FailureKind::Build);

        let err = DumpError::from(PipelineError::EmptyOutput);
        assert_eq!(err.kind(), FailureKind::EmptyOutput);
    }
}
