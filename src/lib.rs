pub mod convention;
pub mod definition;
pub mod dialect;
pub mod error;
pub mod expression;
pub mod generator;
pub mod migration;
pub mod processor;
pub mod script;
pub mod value;

pub mod prelude {
    pub use crate::convention::{Conventions, DefaultConventions};
    pub use crate::definition::{
        ColumnDefinition, ConstraintDefinition, DataRow, DbType, ForeignKeyDefinition,
        IndexDefinition, IndexOrder, ReferentialAction, SequenceDefinition,
    };
    pub use crate::dialect::{
        generator_for, Db2Generator, FirebirdGenerator, MySqlGenerator, OracleGenerator,
        PostgresGenerator, SqlServerGenerator, SqlServerVersion, SqliteGenerator,
    };
    pub use crate::error::{MigrationError, Result};
    pub use crate::expression::*;
    pub use crate::generator::{
        CompatibilityMode, DialectKind, Generator, GeneratorConfig, GeneratorOptions,
    };
    pub use crate::migration::Migration;
    pub use crate::processor::{Processor, RecordingProcessor};
    pub use crate::script::{DirectoryResources, ResourceProvider, StaticResources};
    pub use crate::value::{SystemMethod, Value};

    #[cfg(feature = "sqlite")]
    pub use crate::processor::SqliteProcessor;

    #[cfg(feature = "postgres")]
    pub use crate::processor::PostgresProcessor;

    #[cfg(feature = "mysql")]
    pub use crate::processor::MySqlProcessor;
}
