//! Per-dialect generators.
//!
//! Each dialect module pairs a quoter, a type map, a column formatter and
//! a [`Generator`] that overrides only the statements whose syntax differs
//! from standard SQL.

pub mod db2;
pub mod firebird;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sql_server;
pub mod sqlite;

pub use db2::Db2Generator;
pub use firebird::FirebirdGenerator;
pub use mysql::MySqlGenerator;
pub use oracle::OracleGenerator;
pub use postgres::PostgresGenerator;
pub use sql_server::{SqlServerGenerator, SqlServerVersion};
pub use sqlite::SqliteGenerator;

use tracing::debug;

use crate::generator::{DialectKind, Generator, GeneratorOptions};

pub fn generator_for(kind: DialectKind, options: GeneratorOptions) -> Box<dyn Generator> {
    use SqlServerVersion::*;

    debug!(dialect = kind.name(), compatibility = ?options.compatibility, "building generator");
    match kind {
        DialectKind::SqlServer2000 => Box::new(SqlServerGenerator::new(V2000, options)),
        DialectKind::SqlServer2005 => Box::new(SqlServerGenerator::new(V2005, options)),
        DialectKind::SqlServer2008 => Box::new(SqlServerGenerator::new(V2008, options)),
        DialectKind::SqlServer2012 => Box::new(SqlServerGenerator::new(V2012, options)),
        DialectKind::SqlServer2014 => Box::new(SqlServerGenerator::new(V2014, options)),
        DialectKind::SqlServer2016 => Box::new(SqlServerGenerator::new(V2016, options)),
        DialectKind::Postgres => Box::new(PostgresGenerator::new(options)),
        DialectKind::Sqlite => Box::new(SqliteGenerator::new(options)),
        DialectKind::Firebird => Box::new(FirebirdGenerator::new(options)),
        DialectKind::MySql => Box::new(MySqlGenerator::new(options)),
        DialectKind::Oracle => Box::new(OracleGenerator::new(options)),
        DialectKind::Db2 => Box::new(Db2Generator::new(options)),
    }
}
