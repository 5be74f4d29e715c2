//! `mongodump` command builder.
//!
//! mongodump writes a single archive stream to stdout with `--archive` and no
//! file name. It has no password environment variable and anything passed as
//! an argument is readable in its argv, so the password travels as a YAML
//! config document: the overlay holds it, the shell's `printf` builtin writes
//! it to mongodump's stdin, and `--config` reads it from there.

use crate::builder::types::MongoDump;
use crate::builder::{compressor, validate};
use crate::config::{MONGO_CONFIG_ENV, MONGO_CONFIG_SOURCE, MONGO_DEFAULT_PORT};
use crate::error_handling::BuildError;
use crate::pipeline::PipelineSpec;
use crate::shell::{CommandLine, Value};

/// Builds the `mongodump` argument list.
pub fn command(request: &MongoDump) -> Result<CommandLine, BuildError> {
    let conn = &request.connection;
    validate::require("database", &conn.database)?;
    validate::filter(&request.filter, "collection")?;
    if request.filter.include.len() > 1 {
        return Err(BuildError::UnsupportedFilter(
            "mongodump accepts a single --collection",
        ));
    }
    if !request.filter.include.is_empty() && !request.filter.exclude.is_empty() {
        return Err(BuildError::UnsupportedFilter(
            "mongodump cannot combine --collection with --excludeCollection",
        ));
    }

    let mut cmd = CommandLine::new("mongodump");
    if conn.password.is_some() {
        cmd.joined("--config", Value::text(MONGO_CONFIG_SOURCE));
    }
    cmd.flag("--archive");

    match request.uri.as_deref().filter(|uri| !uri.trim().is_empty()) {
        Some(uri) => {
            cmd.joined("--uri", Value::text(uri));
        }
        None => {
            validate::require("host", &conn.host)?;
            let port = validate::port(conn.port, MONGO_DEFAULT_PORT)?;
            cmd.joined("--host", Value::text(&conn.host))
                .joined("--port", Value::Number(port));
            if !conn.user.is_empty() {
                cmd.joined("--username", Value::text(&conn.user));
            }
        }
    }

    if let Some(auth_db) = request.auth_database.as_deref() {
        cmd.joined("--authenticationDatabase", Value::text(auth_db));
    }

    cmd.joined("--db", Value::text(&conn.database));
    for collection in &request.filter.include {
        cmd.joined("--collection", Value::text(collection));
    }
    for collection in &request.filter.exclude {
        cmd.joined("--excludeCollection", Value::text(collection));
    }

    cmd.raw(request.extra_args.iter().cloned());
    Ok(cmd)
}

/// `printf '%s\n' "${DBDUMP_MONGO_CONFIG}"`, run as a shell builtin.
fn config_feed() -> CommandLine {
    let mut cmd = CommandLine::new("printf");
    cmd.positional(Value::text("%s\\n"))
        .positional(Value::EnvRef(MONGO_CONFIG_ENV));
    cmd
}

/// YAML document carrying the password.
///
/// A JSON string literal is a valid YAML double-quoted scalar, so
/// `serde_json` does the escaping.
fn config_document(password: &str) -> String {
    format!("password: {}", serde_json::Value::from(password))
}

/// Builds the full pipeline: `mongodump --archive ... | <compressor>`, fed
/// its config document on stdin when a password is set.
pub fn build(request: &MongoDump) -> Result<PipelineSpec, BuildError> {
    let dump = command(request)?;
    let compress = compressor(request.compression);
    let spec = match &request.connection.password {
        Some(password) => PipelineSpec::chain(&[&config_feed(), &dump, &compress])
            .with_env(MONGO_CONFIG_ENV, config_document(password)),
        None => PipelineSpec::pipe(&dump, &compress),
    };
    Ok(spec.with_timeout(request.timeout))
}
