//! Tests for command-line parsing into engine configuration and dump requests.

use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use dbdump_pipeline::builder::{Codec, DumpRequest, Engine, SslMode};
use dbdump_pipeline::cli::{Cli, DumpCommand};
use dbdump_pipeline::upload::BlobDestination;
use dbdump_pipeline::LogLevel;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args.iter()).expect("Should parse")
}

#[test]
fn test_postgres_defaults() {
    let cli = parse(&["dbdump", "postgres", "--user", "app", "--database", "app"]);

    assert_eq!(
        log::LevelFilter::from(cli.log_level.clone()),
        log::LevelFilter::from(LogLevel::Info)
    );
    assert_eq!(cli.codec, Codec::Gzip);
    assert_eq!(cli.compression_level, 6);

    let config = cli.config();
    assert_eq!(config.shell, PathBuf::from("sh"));
    assert_eq!(config.default_timeout, Some(Duration::from_secs(6 * 60 * 60)));

    let request = cli.request();
    assert_eq!(request.engine(), Engine::Postgres);
    assert_eq!(request.connection().host, "localhost");
    assert_eq!(request.connection().port, None);
    assert_eq!(request.archive_extension(), "sql.gz");
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&[
        "dbdump",
        "mysql",
        "--host",
        "db",
        "--user",
        "root",
        "--database",
        "shop",
        "--codec",
        "zstd",
        "--compression-level",
        "9",
        "--timeout-seconds",
        "0",
    ]);

    assert_eq!(cli.codec, Codec::Zstd);
    assert!(cli.config().default_timeout.is_none());
    let request = cli.request();
    assert_eq!(request.compression().effective_level(), 9);
    assert_eq!(request.timeout(), None);
    assert_eq!(request.archive_extension(), "sql.zst");
}

#[test]
fn test_compression_level_out_of_range_is_rejected() {
    let result = Cli::try_parse_from([
        "dbdump",
        "--compression-level",
        "12",
        "postgres",
        "--database",
        "app",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_mysql_filters_modes_and_extra_args() {
    let cli = parse(&[
        "dbdump",
        "mysql",
        "--user",
        "root",
        "--database",
        "shop",
        "--table",
        "orders",
        "--table",
        "customers",
        "--exclude-table",
        "audit",
        "--schema-only",
        "--routines",
        "--skip-triggers",
        "--password",
        "pw",
        "--",
        "--hex-blob",
        "--max-allowed-packet=1G",
    ]);

    match cli.request() {
        DumpRequest::MySql(r) => {
            assert_eq!(r.filter.include, vec!["orders", "customers"]);
            assert_eq!(r.filter.exclude, vec!["audit"]);
            assert!(r.mode.schema_only);
            assert!(r.routines);
            assert!(!r.triggers);
            assert!(!r.events);
            assert_eq!(r.connection.password.as_deref(), Some("pw"));
            assert_eq!(r.extra_args, vec!["--hex-blob", "--max-allowed-packet=1G"]);
        }
        other => panic!("expected mysql request, got {other:?}"),
    }
}

#[test]
fn test_postgres_sslmode() {
    let cli = parse(&[
        "dbdump",
        "postgres",
        "--database",
        "app",
        "--sslmode",
        "verify-full",
        "--port",
        "6432",
    ]);
    match cli.request() {
        DumpRequest::Postgres(r) => {
            assert_eq!(r.ssl_mode, Some(SslMode::VerifyFull));
            assert_eq!(r.connection.port, Some(6432));
        }
        other => panic!("expected postgres request, got {other:?}"),
    }
}

#[test]
fn test_mongo_collections() {
    let cli = parse(&[
        "dbdump",
        "mongo",
        "--database",
        "events",
        "--uri",
        "mongodb://reader@mongo:27017",
        "--exclude-collection",
        "sessions",
    ]);
    assert!(matches!(cli.command, DumpCommand::Mongo(_)));
    match cli.request() {
        DumpRequest::Mongo(r) => {
            assert_eq!(r.uri.as_deref(), Some("mongodb://reader@mongo:27017"));
            assert_eq!(r.filter.exclude, vec!["sessions"]);
            assert!(r.filter.include.is_empty());
        }
        other => panic!("expected mongo request, got {other:?}"),
    }
}

#[test]
fn test_missing_database_is_rejected() {
    assert!(Cli::try_parse_from(["dbdump", "postgres", "--user", "app"]).is_err());
}

#[test]
fn test_missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["dbdump", "--codec", "gzip"]).is_err());
}

#[test]
fn test_upload_destination_selection() {
    let cli = parse(&[
        "dbdump",
        "postgres",
        "--database",
        "app",
        "--azure-sas-url",
        "https://acct.blob.core.windows.net/backups?sig=x",
    ]);
    assert!(matches!(
        cli.upload.destination(),
        Ok(Some(BlobDestination::ContainerSas { .. }))
    ));

    let cli = parse(&[
        "dbdump",
        "postgres",
        "--database",
        "app",
        "--azure-account-name",
        "acct",
        "--azure-account-key",
        "a2V5",
    ]);
    // Account credentials without a container
    assert!(cli.upload.destination().is_err());

    let cli = parse(&[
        "dbdump",
        "postgres",
        "--database",
        "app",
        "--azure-account-name",
        "acct",
        "--azure-account-key",
        "a2V5",
        "--azure-container",
        "backups",
    ]);
    assert!(matches!(
        cli.upload.destination(),
        Ok(Some(BlobDestination::SharedKey { .. }))
    ));
}

#[test]
fn test_command_definition_is_consistent() {
    Cli::command().debug_assert();
    let help = Cli::command().render_long_help().to_string();
    assert!(help.contains("mysql"));
    assert!(help.contains("--azure-sas-url"));
}
