//! Configuration constants.
//!
//! This module defines the constants used throughout the engine, including
//! default ports, compression bounds, buffer sizes and upload parameters.

use std::time::Duration;

// Dump tool defaults
/// Default MySQL server port
pub const MYSQL_DEFAULT_PORT: u16 = 3306;
/// Default PostgreSQL server port
pub const POSTGRES_DEFAULT_PORT: u16 = 5432;
/// Default MongoDB server port
pub const MONGO_DEFAULT_PORT: u16 = 27017;

// Credential environment variables
/// Variable `mysqldump` reads the password from
pub const MYSQL_PASSWORD_ENV: &str = "MYSQL_PWD";
/// Variable `pg_dump` reads the password from
pub const POSTGRES_PASSWORD_ENV: &str = "PGPASSWORD";
/// Variable `pg_dump` reads the SSL mode from
pub const POSTGRES_SSLMODE_ENV: &str = "PGSSLMODE";
/// Overlay variable holding the YAML config document fed to mongodump.
///
/// mongodump has no password variable of its own and an expanded
/// `--password=` would show up in its argv, so the shell's `printf` builtin
/// writes this document to mongodump's stdin, read with `--config`.
pub const MONGO_CONFIG_ENV: &str = "DBDUMP_MONGO_CONFIG";
/// Where mongodump reads the config document from
pub const MONGO_CONFIG_SOURCE: &str = "/dev/stdin";

// Compression
/// Lowest compressor level accepted
pub const MIN_COMPRESSION_LEVEL: u8 = 1;
/// Highest compressor level accepted
pub const MAX_COMPRESSION_LEVEL: u8 = 9;
/// Level used when none is configured
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

// Pipeline execution
/// Shell interpreter used to run the pipeline string
pub const DEFAULT_SHELL: &str = "sh";
/// Prepended to every pipeline so a failing dump tool fails the pipeline
/// even when the compressor exits 0. Shells without `pipefail` skip it.
pub const PIPEFAIL_PREAMBLE: &str = "(set -o pipefail) 2>/dev/null && set -o pipefail; ";
/// Maximum number of stderr bytes kept for diagnostics (64KB)
/// The remainder is still drained so the child never blocks on a full pipe
pub const MAX_STDERR_CAPTURE_BYTES: usize = 64 * 1024;
/// Buffer between the stdout pipe and the archive file (1MB)
pub const ARCHIVE_WRITE_BUFFER_SIZE: usize = 1024 * 1024;
/// Default timeout applied by the CLI when none is given (6 hours)
pub const DEFAULT_DUMP_TIMEOUT: Duration = Duration::from_secs(6 * 60 * 60);
/// How long a terminated process group gets to exit before SIGKILL
pub const TERMINATION_GRACE: Duration = Duration::from_secs(5);
/// How long to keep reading stderr after the shell has exited
/// A process that escaped the group may hold the pipe open indefinitely
pub const STDERR_DRAIN_GRACE: Duration = Duration::from_secs(2);

// Scratch files
/// Number of random bytes in a scratch file name (rendered as hex)
pub const SCRATCH_SUFFIX_BYTES: usize = 8;

// Error message size limits
/// Maximum error message length in characters (2000 chars)
/// Diagnostic text longer than this is truncated with a note about the original length
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2000;

// Blob upload
/// Size of each staged block (8MB)
pub const UPLOAD_BLOCK_SIZE: usize = 8 * 1024 * 1024;
/// Storage service REST API version sent as `x-ms-version`
pub const AZURE_API_VERSION: &str = "2021-08-06";
/// Endpoint suffix used when a connection string does not name one
pub const AZURE_DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";
/// Per-request timeout for upload calls
pub const UPLOAD_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
