//! `mysqldump` command builder.

use crate::builder::types::{MySqlDump, ResolvedMode};
use crate::builder::{compressor, validate};
use crate::config::{MYSQL_DEFAULT_PORT, MYSQL_PASSWORD_ENV};
use crate::error_handling::BuildError;
use crate::pipeline::PipelineSpec;
use crate::shell::{CommandLine, Value};

/// Builds the `mysqldump` argument list.
///
/// Shape: connection flags, `--single-transaction --skip-lock-tables`, mode
/// and object flags, one `--ignore-table db.table` per exclusion, extra
/// arguments, the database, then included tables.
pub fn command(request: &MySqlDump) -> Result<CommandLine, BuildError> {
    let conn = &request.connection;
    validate::require("host", &conn.host)?;
    validate::require("user", &conn.user)?;
    validate::require("database", &conn.database)?;
    let port = validate::port(conn.port, MYSQL_DEFAULT_PORT)?;
    validate::filter(&request.filter, "table")?;

    let mut cmd = CommandLine::new("mysqldump");
    cmd.option("-h", Value::text(&conn.host))
        .option("-P", Value::Number(port))
        .option("-u", Value::text(&conn.user))
        .flag("--single-transaction")
        .flag("--skip-lock-tables");

    match request.mode.resolve() {
        ResolvedMode::SchemaOnly => {
            cmd.flag("--no-data");
        }
        ResolvedMode::DataOnly => {
            cmd.flag("--no-create-info");
        }
        ResolvedMode::Full => {}
    }

    cmd.flag_if(!request.triggers, "--skip-triggers")
        .flag_if(request.routines, "--routines")
        .flag_if(request.events, "--events");

    for table in &request.filter.exclude {
        cmd.option(
            "--ignore-table",
            Value::Qualified(conn.database.clone(), table.clone()),
        );
    }

    cmd.raw(request.extra_args.iter().cloned());
    cmd.positional(Value::text(&conn.database));
    for table in &request.filter.include {
        cmd.positional(Value::text(table));
    }
    Ok(cmd)
}

/// Builds the full pipeline: `mysqldump ... | <compressor>`, password in `MYSQL_PWD`.
pub fn build(request: &MySqlDump) -> Result<PipelineSpec, BuildError> {
    let dump = command(request)?;
    let mut spec = PipelineSpec::pipe(&dump, &compressor(request.compression))
        .with_timeout(request.timeout);
    if let Some(password) = &request.connection.password {
        spec = spec.with_env(MYSQL_PASSWORD_ENV, password);
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::types::{Connection, DumpMode, TableFilter};

    fn request() -> MySqlDump {
        MySqlDump {
            connection: Connection {
                host: "db.internal".into(),
                port: None,
                database: "shop".into(),
                user: "backup".into(),
                password: None,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_command() {
        let cmd = command(&request()).unwrap();
        assert_eq!(
            cmd.render(),
            "mysqldump -h 'db.internal' -P 3306 -u 'backup' --single-transaction \
             --skip-lock-tables 'shop'"
        );
    }

    #[test]
    fn test_full_pipeline_with_all_flags() {
        let mut r = request();
        r.connection.port = Some(3307);
        r.mode = DumpMode {
            schema_only: false,
            data_only: true,
        };
        r.triggers = false;
        r.routines = true;
        r.events = true;
        r.filter = TableFilter {
            include: vec!["orders".into(), "users".into()],
            exclude: vec!["audit".into()],
        };
        r.extra_args = vec!["--hex-blob".into()];
        let spec = build(&r).unwrap();
        assert_eq!(
            spec.command(),
            "mysqldump -h 'db.internal' -P 3307 -u 'backup' --single-transaction \
             --skip-lock-tables --no-create-info --skip-triggers --routines --events \
             --ignore-table 'shop'.'audit' --hex-blob 'shop' 'orders' 'users' | gzip -6"
        );
    }

    #[test]
    fn test_schema_only_takes_precedence() {
        let mut r = request();
        r.mode = DumpMode {
            schema_only: true,
            data_only: true,
        };
        let rendered = command(&r).unwrap().render();
        assert!(rendered.contains("--no-data"));
        assert!(!rendered.contains("--no-create-info"));
    }

    #[test]
    fn test_password_only_in_environment() {
        let mut r = request();
        r.connection.password = Some("pa$$'word".into());
        let spec = build(&r).unwrap();
        assert!(!spec.command().contains("pa$$"));
        assert_eq!(
            spec.env().get("MYSQL_PWD").map(String::as_str),
            Some("pa$$'word")
        );
    }

    #[test]
    fn test_hostile_table_name_is_quoted() {
        let mut r = request();
        r.filter.include = vec!["x'; rm -rf / #".into()];
        let rendered = command(&r).unwrap().render();
        assert!(rendered.ends_with(r"'shop' 'x'\''; rm -rf / #'"));
    }

    #[test]
    fn test_missing_database_fails() {
        let mut r = request();
        r.connection.database.clear();
        assert_eq!(command(&r), Err(BuildError::MissingField("database")));
    }

    #[test]
    fn test_negative_port_fails() {
        let mut r = request();
        r.connection.port = Some(-3306);
        assert_eq!(command(&r), Err(BuildError::InvalidPort(-3306)));
    }
}
