//! Command-line options.
//!
//! Parsed with `clap`; every secret can come from the environment (or a `.env`
//! file) so it never has to appear in `ps` output or shell history.
//!
//! # Examples
//!
//! ```bash
//! # PostgreSQL, password from PGPASSWORD, 2 hour deadline
//! dbdump --timeout-seconds 7200 postgres --host db --user app --database app
//!
//! # MySQL with zstd, upload to a container SAS URL
//! dbdump --codec zstd --azure-sas-url "$SAS" mysql --host db --user root --database shop
//!
//! # Extra tool arguments go after `--`
//! dbdump mongo --uri "$MONGO_URI" --database events -- --numParallelCollections=2
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::builder::{
    Codec, Compression, Connection, DumpMode, DumpRequest, MongoDump, MySqlDump, PostgresDump,
    SslMode, TableFilter,
};
use crate::config::{
    Config, LogFormat, LogLevel, DEFAULT_COMPRESSION_LEVEL, DEFAULT_DUMP_TIMEOUT, DEFAULT_SHELL,
    MAX_STDERR_CAPTURE_BYTES,
};
use crate::upload::BlobDestination;

/// Command-line options of the `dbdump` binary.
#[derive(Debug, Parser)]
#[command(
    name = "dbdump",
    version,
    about = "Dumps a database through a compressor into an archive, optionally uploading it."
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// Directory for archives (defaults to the system temp directory)
    #[arg(long, env = "DBDUMP_SCRATCH_DIR", global = true)]
    pub scratch_dir: Option<PathBuf>,

    /// Hard deadline for the whole pipeline in seconds (0 disables it)
    #[arg(long, default_value_t = DEFAULT_DUMP_TIMEOUT.as_secs(), global = true)]
    pub timeout_seconds: u64,

    /// Compressor level (1-9)
    #[arg(
        long,
        default_value_t = DEFAULT_COMPRESSION_LEVEL,
        value_parser = clap::value_parser!(u8).range(1..=9),
        global = true
    )]
    pub compression_level: u8,

    /// Compressor: gzip|zstd|none
    #[arg(long, value_enum, default_value_t = Codec::Gzip, global = true)]
    pub codec: Codec,

    /// Shell used to run the pipeline
    #[arg(long, env = "DBDUMP_SHELL", default_value = DEFAULT_SHELL, global = true)]
    pub shell: PathBuf,

    /// Print the result as a JSON object instead of a sentence
    #[arg(long, global = true)]
    pub json: bool,

    /// Upload destination flags
    #[command(flatten)]
    pub upload: UploadArgs,

    /// Engine to dump
    #[command(subcommand)]
    pub command: DumpCommand,
}

/// Optional upload after a successful dump.
#[derive(Debug, Clone, Args)]
pub struct UploadArgs {
    /// Storage connection string (needs --azure-container)
    #[arg(long, env = "AZURE_STORAGE_CONNECTION_STRING", hide_env_values = true, global = true)]
    pub azure_connection_string: Option<String>,

    /// Storage account name (needs --azure-account-key and --azure-container)
    #[arg(long, env = "AZURE_STORAGE_ACCOUNT", global = true)]
    pub azure_account_name: Option<String>,

    /// Storage account key
    #[arg(long, env = "AZURE_STORAGE_KEY", hide_env_values = true, global = true)]
    pub azure_account_key: Option<String>,

    /// Container name for connection-string or account-key uploads
    #[arg(long, env = "AZURE_STORAGE_CONTAINER", global = true)]
    pub azure_container: Option<String>,

    /// Container URL with a SAS token
    #[arg(long, env = "AZURE_CONTAINER_SAS_URL", hide_env_values = true, global = true)]
    pub azure_sas_url: Option<String>,

    /// Keep the local archive after a successful upload
    #[arg(long, global = true)]
    pub keep_local: bool,
}

impl UploadArgs {
    /// Destination named by the flags, `None` when no upload was asked for.
    ///
    /// A SAS URL wins over a connection string, which wins over an account key.
    pub fn destination(&self) -> Result<Option<BlobDestination>, String> {
        if let Some(url) = &self.azure_sas_url {
            return Ok(Some(BlobDestination::ContainerSas { url: url.clone() }));
        }
        if let Some(connection_string) = &self.azure_connection_string {
            return Ok(Some(BlobDestination::ConnectionString {
                connection_string: connection_string.clone(),
                container: self.container()?,
            }));
        }
        match (&self.azure_account_name, &self.azure_account_key) {
            (Some(account_name), Some(account_key)) => Ok(Some(BlobDestination::SharedKey {
                account_name: account_name.clone(),
                account_key: account_key.clone(),
                container: self.container()?,
            })),
            (Some(_), None) => Err("--azure-account-name needs --azure-account-key".to_string()),
            (None, Some(_)) => Err("--azure-account-key needs --azure-account-name".to_string()),
            (None, None) => Ok(None),
        }
    }

    fn container(&self) -> Result<String, String> {
        self.azure_container
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| "--azure-container is required for this upload destination".to_string())
    }
}

/// Engine to dump.
#[derive(Debug, Clone, Subcommand)]
pub enum DumpCommand {
    /// Dump a MySQL or MariaDB database with mysqldump
    Mysql(MySqlArgs),
    /// Dump a PostgreSQL database with pg_dump
    Postgres(PostgresArgs),
    /// Dump a MongoDB database with mongodump
    Mongo(MongoArgs),
}

/// Server and database selection shared by every engine.
#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    /// Server host
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Server port (engine default when omitted)
    #[arg(long, allow_negative_numbers = true)]
    pub port: Option<i32>,

    /// User name
    #[arg(long, default_value = "")]
    pub user: String,

    /// Database to dump
    #[arg(long)]
    pub database: String,
}

impl ServerArgs {
    fn connection(&self, password: &Option<String>) -> Connection {
        Connection {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            password: password.clone().filter(|p| !p.is_empty()),
        }
    }
}

/// `mysqldump` options.
#[derive(Debug, Clone, Args)]
pub struct MySqlArgs {
    /// Server and database selection
    #[command(flatten)]
    pub server: ServerArgs,

    /// Password
    #[arg(long, env = "MYSQL_PWD", hide_env_values = true)]
    pub password: Option<String>,

    /// Table to dump (repeatable; all tables when omitted)
    #[arg(long = "table")]
    pub tables: Vec<String>,

    /// Table to skip (repeatable)
    #[arg(long = "exclude-table")]
    pub exclude_tables: Vec<String>,

    /// Dump table definitions only
    #[arg(long)]
    pub schema_only: bool,

    /// Dump rows only
    #[arg(long)]
    pub data_only: bool,

    /// Include stored procedures and functions
    #[arg(long)]
    pub routines: bool,

    /// Include scheduled events
    #[arg(long)]
    pub events: bool,

    /// Leave triggers out
    #[arg(long)]
    pub skip_triggers: bool,

    /// Extra mysqldump arguments, passed through unquoted
    #[arg(last = true)]
    pub extra_args: Vec<String>,
}

/// `pg_dump` options.
#[derive(Debug, Clone, Args)]
pub struct PostgresArgs {
    /// Server and database selection
    #[command(flatten)]
    pub server: ServerArgs,

    /// Password
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Table pattern to dump (repeatable)
    #[arg(long = "table")]
    pub tables: Vec<String>,

    /// Table pattern to skip (repeatable)
    #[arg(long = "exclude-table")]
    pub exclude_tables: Vec<String>,

    /// Dump object definitions only
    #[arg(long)]
    pub schema_only: bool,

    /// Dump rows only
    #[arg(long)]
    pub data_only: bool,

    /// SSL mode
    #[arg(long, value_enum)]
    pub sslmode: Option<SslMode>,

    /// Extra pg_dump arguments, passed through unquoted
    #[arg(last = true)]
    pub extra_args: Vec<String>,
}

/// `mongodump` options.
#[derive(Debug, Clone, Args)]
pub struct MongoArgs {
    /// Server and database selection
    #[command(flatten)]
    pub server: ServerArgs,

    /// Password
    #[arg(long, env = "MONGO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Connection string, used instead of --host/--port/--user
    #[arg(long, env = "MONGO_URI", hide_env_values = true)]
    pub uri: Option<String>,

    /// Database holding the user's credentials
    #[arg(long)]
    pub auth_database: Option<String>,

    /// Collection to dump (at most one)
    #[arg(long = "collection")]
    pub collections: Vec<String>,

    /// Collection to skip (repeatable)
    #[arg(long = "exclude-collection")]
    pub exclude_collections: Vec<String>,

    /// Extra mongodump arguments, passed through unquoted
    #[arg(last = true)]
    pub extra_args: Vec<String>,
}

impl Cli {
    /// Engine configuration derived from the global flags.
    pub fn config(&self) -> Config {
        Config {
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            scratch_dir: self.scratch_dir.clone(),
            shell: self.shell.clone(),
            stderr_limit: MAX_STDERR_CAPTURE_BYTES,
            compression_level: self.compression_level,
            default_timeout: self.timeout(),
        }
    }

    fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }

    fn compression(&self) -> Compression {
        Compression {
            codec: self.codec,
            level: i32::from(self.compression_level),
        }
    }

    /// The dump request named by the subcommand.
    pub fn request(&self) -> DumpRequest {
        let compression = self.compression();
        let timeout = self.timeout();
        match &self.command {
            DumpCommand::Mysql(args) => MySqlDump {
                connection: args.server.connection(&args.password),
                filter: TableFilter {
                    include: args.tables.clone(),
                    exclude: args.exclude_tables.clone(),
                },
                mode: DumpMode {
                    schema_only: args.schema_only,
                    data_only: args.data_only,
                },
                routines: args.routines,
                triggers: !args.skip_triggers,
                events: args.events,
                extra_args: args.extra_args.clone(),
                compression,
                timeout,
            }
            .into(),
            DumpCommand::Postgres(args) => PostgresDump {
                connection: args.server.connection(&args.password),
                filter: TableFilter {
                    include: args.tables.clone(),
                    exclude: args.exclude_tables.clone(),
                },
                mode: DumpMode {
                    schema_only: args.schema_only,
                    data_only: args.data_only,
                },
                ssl_mode: args.sslmode,
                extra_args: args.extra_args.clone(),
                compression,
                timeout,
            }
            .into(),
            DumpCommand::Mongo(args) => MongoDump {
                connection: args.server.connection(&args.password),
                uri: args.uri.clone().filter(|u| !u.is_empty()),
                auth_database: args.auth_database.clone(),
                filter: TableFilter {
                    include: args.collections.clone(),
                    exclude: args.exclude_collections.clone(),
                },
                extra_args: args.extra_args.clone(),
                compression,
                timeout,
            }
            .into(),
        }
    }
}
