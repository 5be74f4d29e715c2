//! Dump request types.
//!
//! A [`DumpRequest`] describes one dump of one database. It is polymorphic over
//! the target engine; every variant carries connection parameters, table or
//! collection filters, extra operator arguments, compression settings and an
//! optional deadline.

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;

use crate::config::{
    DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL, MIN_COMPRESSION_LEVEL, MONGO_DEFAULT_PORT,
    MYSQL_DEFAULT_PORT, POSTGRES_DEFAULT_PORT,
};

/// Database engine targeted by a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// MySQL / MariaDB via `mysqldump`
    MySql,
    /// PostgreSQL via `pg_dump`
    Postgres,
    /// MongoDB via `mongodump`
    Mongo,
}

impl Engine {
    /// Name of the external dump tool.
    pub fn tool(&self) -> &'static str {
        match self {
            Engine::MySql => "mysqldump",
            Engine::Postgres => "pg_dump",
            Engine::Mongo => "mongodump",
        }
    }

    /// Port used when the connection does not name one.
    pub fn default_port(&self) -> u16 {
        match self {
            Engine::MySql => MYSQL_DEFAULT_PORT,
            Engine::Postgres => POSTGRES_DEFAULT_PORT,
            Engine::Mongo => MONGO_DEFAULT_PORT,
        }
    }

    /// Prefix of scratch archive file names.
    pub fn scratch_prefix(&self) -> &'static str {
        match self {
            Engine::MySql => "mysqldump",
            Engine::Postgres => "pgdump",
            Engine::Mongo => "mongodump",
        }
    }

    /// Extension of the uncompressed dump format.
    pub fn dump_extension(&self) -> &'static str {
        match self {
            Engine::MySql | Engine::Postgres => "sql",
            Engine::Mongo => "archive",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Engine::MySql => "mysql",
            Engine::Postgres => "postgres",
            Engine::Mongo => "mongo",
        })
    }
}

/// Connection parameters shared by every engine.
///
/// The password is never rendered into the command line; builders place it in
/// the environment overlay of the spawned shell.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Connection {
    /// Server host name or address
    pub host: String,
    /// Server port (engine default when `None`)
    pub port: Option<i32>,
    /// Database to dump
    pub database: String,
    /// User to authenticate as
    pub user: String,
    /// Password, passed through the environment only
    pub password: Option<String>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Table or collection include/exclude lists.
///
/// A name may appear in at most one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    /// Names to dump (everything when empty)
    pub include: Vec<String>,
    /// Names to skip
    pub exclude: Vec<String>,
}

/// Requested schema/data split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpMode {
    /// Dump object definitions only
    pub schema_only: bool,
    /// Dump rows only
    pub data_only: bool,
}

/// The split a dump tool is actually asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedMode {
    /// Schema and data
    Full,
    /// Schema only
    SchemaOnly,
    /// Data only
    DataOnly,
}

impl DumpMode {
    /// Resolves the two flags. Schema-only wins when both are set.
    pub fn resolve(&self) -> ResolvedMode {
        if self.schema_only {
            ResolvedMode::SchemaOnly
        } else if self.data_only {
            ResolvedMode::DataOnly
        } else {
            ResolvedMode::Full
        }
    }
}

/// Compressor program placed after the pipe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, EnumIterMacro)]
pub enum Codec {
    /// `gzip -<level>`
    #[default]
    Gzip,
    /// `zstd -<level> -c`
    Zstd,
    /// `cat`, output left uncompressed
    None,
}

impl Codec {
    /// File extension added by this codec, if any.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Codec::Gzip => Some("gz"),
            Codec::Zstd => Some("zst"),
            Codec::None => None,
        }
    }
}

/// Compression settings of a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    /// Compressor program
    pub codec: Codec,
    /// Requested level; clamped to 1..=9 when rendered
    pub level: i32,
}

impl Default for Compression {
    fn default() -> Self {
        Self {
            codec: Codec::Gzip,
            level: i32::from(DEFAULT_COMPRESSION_LEVEL),
        }
    }
}

impl Compression {
    /// Level actually passed to the compressor.
    pub fn effective_level(&self) -> u8 {
        let clamped = self.level.clamp(
            i32::from(MIN_COMPRESSION_LEVEL),
            i32::from(MAX_COMPRESSION_LEVEL),
        );
        // In range 1..=9 after the clamp
        clamped as u8
    }
}

/// `pg_dump` SSL negotiation mode, exported as `PGSSLMODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, EnumIterMacro)]
pub enum SslMode {
    /// No SSL
    Disable,
    /// Try non-SSL first
    Allow,
    /// Try SSL first
    Prefer,
    /// Require SSL
    Require,
    /// Require SSL and verify the CA
    VerifyCa,
    /// Require SSL and verify the host name
    VerifyFull,
}

impl SslMode {
    /// Value understood by libpq.
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Allow => "allow",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }
}

/// MySQL dump options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlDump {
    /// Server and credentials
    pub connection: Connection,
    /// Tables to include or ignore (names without schema)
    pub filter: TableFilter,
    /// Schema/data split
    pub mode: DumpMode,
    /// Dump stored procedures and functions (`--routines`)
    pub routines: bool,
    /// Dump triggers; `false` adds `--skip-triggers`
    pub triggers: bool,
    /// Dump scheduled events (`--events`)
    pub events: bool,
    /// Operator arguments appended after the generated flags
    pub extra_args: Vec<String>,
    /// Compressor settings
    pub compression: Compression,
    /// Hard deadline for the whole pipeline
    pub timeout: Option<Duration>,
}

impl Default for MySqlDump {
    fn default() -> Self {
        Self {
            connection: Connection::default(),
            filter: TableFilter::default(),
            mode: DumpMode::default(),
            routines: false,
            triggers: true,
            events: false,
            extra_args: Vec::new(),
            compression: Compression::default(),
            timeout: None,
        }
    }
}

/// PostgreSQL dump options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostgresDump {
    /// Server and credentials
    pub connection: Connection,
    /// Tables to include (`-t`) or exclude (`-T`), `schema.table` patterns allowed
    pub filter: TableFilter,
    /// Schema/data split
    pub mode: DumpMode,
    /// SSL negotiation mode
    pub ssl_mode: Option<SslMode>,
    /// Operator arguments appended after the generated flags
    pub extra_args: Vec<String>,
    /// Compressor settings
    pub compression: Compression,
    /// Hard deadline for the whole pipeline
    pub timeout: Option<Duration>,
}

/// MongoDB dump options.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MongoDump {
    /// Server and credentials; host/port/user are ignored when `uri` is set
    pub connection: Connection,
    /// Full connection string, used instead of host/port/user
    pub uri: Option<String>,
    /// Database holding the user's credentials
    pub auth_database: Option<String>,
    /// Collections to include (at most one) or exclude
    pub filter: TableFilter,
    /// Operator arguments appended after the generated flags
    pub extra_args: Vec<String>,
    /// Compressor settings
    pub compression: Compression,
    /// Hard deadline for the whole pipeline
    pub timeout: Option<Duration>,
}

impl fmt::Debug for MongoDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoDump")
            .field("connection", &self.connection)
            .field("uri", &self.uri.as_ref().map(|_| "<redacted>"))
            .field("auth_database", &self.auth_database)
            .field("filter", &self.filter)
            .field("extra_args", &self.extra_args)
            .field("compression", &self.compression)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// One dump of one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpRequest {
    /// `mysqldump`
    MySql(MySqlDump),
    /// `pg_dump`
    Postgres(PostgresDump),
    /// `mongodump`
    Mongo(MongoDump),
}

impl DumpRequest {
    /// Targeted engine.
    pub fn engine(&self) -> Engine {
        match self {
            DumpRequest::MySql(_) => Engine::MySql,
            DumpRequest::Postgres(_) => Engine::Postgres,
            DumpRequest::Mongo(_) => Engine::Mongo,
        }
    }

    /// Connection parameters.
    pub fn connection(&self) -> &Connection {
        match self {
            DumpRequest::MySql(r) => &r.connection,
            DumpRequest::Postgres(r) => &r.connection,
            DumpRequest::Mongo(r) => &r.connection,
        }
    }

    /// Compressor settings.
    pub fn compression(&self) -> Compression {
        match self {
            DumpRequest::MySql(r) => r.compression,
            DumpRequest::Postgres(r) => r.compression,
            DumpRequest::Mongo(r) => r.compression,
        }
    }

    /// Configured deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            DumpRequest::MySql(r) => r.timeout,
            DumpRequest::Postgres(r) => r.timeout,
            DumpRequest::Mongo(r) => r.timeout,
        }
    }

    /// Extension of the finished archive, e.g. `sql.gz`.
    pub fn archive_extension(&self) -> String {
        let engine = self.engine();
        match self.compression().codec.extension() {
            Some(codec) => format!("{}.{}", engine.dump_extension(), codec),
            None => engine.dump_extension().to_string(),
        }
    }
}

impl From<MySqlDump> for DumpRequest {
    fn from(r: MySqlDump) -> Self {
        DumpRequest::MySql(r)
    }
}

impl From<PostgresDump> for DumpRequest {
    fn from(r: PostgresDump) -> Self {
        DumpRequest::Postgres(r)
    }
}

impl From<MongoDump> for DumpRequest {
    fn from(r: MongoDump) -> Self {
        DumpRequest::Mongo(r)
    }
}
