//! `pg_dump` command builder.

use crate::builder::types::{PostgresDump, ResolvedMode};
use crate::builder::{compressor, validate};
use crate::config::{POSTGRES_DEFAULT_PORT, POSTGRES_PASSWORD_ENV, POSTGRES_SSLMODE_ENV};
use crate::error_handling::BuildError;
use crate::pipeline::PipelineSpec;
use crate::shell::{CommandLine, Value};

/// Builds the `pg_dump` argument list.
///
/// `--no-password` keeps pg_dump from ever prompting; stdin is closed anyway.
pub fn command(request: &PostgresDump) -> Result<CommandLine, BuildError> {
    let conn = &request.connection;
    validate::require("host", &conn.host)?;
    validate::require("user", &conn.user)?;
    validate::require("database", &conn.database)?;
    let port = validate::port(conn.port, POSTGRES_DEFAULT_PORT)?;
    validate::filter(&request.filter, "table")?;

    let mut cmd = CommandLine::new("pg_dump");
    cmd.option("-h", Value::text(&conn.host))
        .option("-p", Value::Number(port))
        .option("-U", Value::text(&conn.user))
        .flag("--no-password");

    match request.mode.resolve() {
        ResolvedMode::SchemaOnly => {
            cmd.flag("--schema-only");
        }
        ResolvedMode::DataOnly => {
            cmd.flag("--data-only");
        }
        ResolvedMode::Full => {}
    }

    for table in &request.filter.include {
        cmd.option("-t", Value::text(table));
    }
    for table in &request.filter.exclude {
        cmd.option("-T", Value::text(table));
    }

    cmd.raw(request.extra_args.iter().cloned());
    cmd.positional(Value::text(&conn.database));
    Ok(cmd)
}

/// Builds the full pipeline: `pg_dump ... | <compressor>`.
///
/// The password goes to `PGPASSWORD` and the SSL mode to `PGSSLMODE`; pg_dump
/// has no command-line flag for either.
pub fn build(request: &PostgresDump) -> Result<PipelineSpec, BuildError> {
    let dump = command(request)?;
    let mut spec = PipelineSpec::pipe(&dump, &compressor(request.compression))
        .with_timeout(request.timeout);
    if let Some(password) = &request.connection.password {
        spec = spec.with_env(POSTGRES_PASSWORD_ENV, password);
    }
    if let Some(mode) = request.ssl_mode {
        spec = spec.with_env(POSTGRES_SSLMODE_ENV, mode.as_str());
    }
    Ok(spec)
}
