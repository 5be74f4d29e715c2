//! Dump request types and per-engine command builders.
//!
//! Each builder turns one request variant into a typed [`CommandLine`] and then
//! into a [`PipelineSpec`] of the shape `<tool> <args...> | <compressor> -<level>`.
//! Building is pure: it validates structure and never touches the filesystem
//! or spawns anything.

pub mod mongo;
pub mod mysql;
pub mod postgres;
mod types;
mod validate;

pub use types::{
    Codec, Compression, Connection, DumpMode, DumpRequest, Engine, MongoDump, MySqlDump,
    PostgresDump, ResolvedMode, SslMode, TableFilter,
};

use crate::error_handling::BuildError;
use crate::pipeline::PipelineSpec;
use crate::shell::CommandLine;

/// Builds the pipeline for any request variant.
///
/// # Errors
///
/// Returns a [`BuildError`] for structurally invalid requests (missing
/// database, out-of-range port, conflicting filters).
pub fn build(request: &DumpRequest) -> Result<PipelineSpec, BuildError> {
    match request {
        DumpRequest::MySql(r) => mysql::build(r),
        DumpRequest::Postgres(r) => postgres::build(r),
        DumpRequest::Mongo(r) => mongo::build(r),
    }
}

/// Compressor command for `compression`, reading stdin and writing stdout.
pub fn compressor(compression: Compression) -> CommandLine {
    let level = format!("-{}", compression.effective_level());
    match compression.codec {
        Codec::Gzip => {
            let mut cmd = CommandLine::new("gzip");
            cmd.raw([level]);
            cmd
        }
        Codec::Zstd => {
            let mut cmd = CommandLine::new("zstd");
            cmd.raw([level]).flag("-c");
            cmd
        }
        Codec::None => CommandLine::new("cat"),
    }
}
