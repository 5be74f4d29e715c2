//! Configuration types.
//!
//! This module defines the enums and structs shared by the library and the
//! command-line front end.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_SHELL, MAX_STDERR_CAPTURE_BYTES};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Engine-wide settings that are not part of an individual dump request.
///
/// # Examples
///
/// ```no_run
/// use dbdump_pipeline::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     scratch_dir: Some(PathBuf::from("/var/tmp/dumps")),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Directory for intermediate archives (platform temp dir when `None`)
    pub scratch_dir: Option<PathBuf>,

    /// Shell interpreter that runs the pipeline string
    pub shell: PathBuf,

    /// Maximum number of stderr bytes kept for error messages
    pub stderr_limit: usize,

    /// Compressor level selected on the command line (requests carry their own)
    pub compression_level: u8,

    /// Deadline applied when a request does not set one (`None` = no deadline)
    pub default_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            scratch_dir: None,
            shell: PathBuf::from(DEFAULT_SHELL),
            stderr_limit: MAX_STDERR_CAPTURE_BYTES,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            default_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_log_format_debug() {
        assert_eq!(format!("{:?}", LogFormat::Plain), "Plain");
        assert_eq!(format!("{:?}", LogFormat::Json), "Json");
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.shell, PathBuf::from("sh"));
        assert_eq!(config.stderr_limit, 64 * 1024);
        assert_eq!(config.compression_level, 6);
        assert!(config.scratch_dir.is_none());
        assert!(config.default_timeout.is_none());
    }
}
