//! Executing expressions against a database.

#[cfg(feature = "mysql")]
mod mysql;
#[cfg(feature = "postgres")]
mod postgres;
mod recording;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "mysql")]
pub use self::mysql::MySqlProcessor;
#[cfg(feature = "postgres")]
pub use self::postgres::PostgresProcessor;
pub use recording::RecordingProcessor;
#[cfg(feature = "sqlite")]
pub use self::sqlite::SqliteProcessor;

use sea_query::{Alias, Asterisk, Query, SelectStatement};
use tracing::debug;

use crate::definition::DataRow;
use crate::error::Result;
use crate::expression::*;
use crate::generator::Generator;

macro_rules! process_by_generation {
    ($($method:ident($kind:ident)),* $(,)?) => {
        $(
            fn $method(&mut self, expression: &$kind) -> Result<()> {
                self.run_generated(&Expression::$kind(expression.clone()))
            }
        )*
    };
}

/// Receives expressions from [`Expression::execute_with`].
///
/// Every `process_*` method defaults to generating SQL with
/// [`Processor::generator`] and executing it batch by batch. Merges read
/// the target table and execute the resulting inserts and updates.
pub trait Processor {
    fn generator(&self) -> &dyn Generator;

    /// Runs one batch of SQL text.
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Every row of a table, with column names as the database reports them.
    fn read_table_data(&mut self, schema: Option<&str>, table: &str) -> Result<Vec<DataRow>>;

    /// Implementations call `expression.run(self)`.
    fn process_perform_db_operation(&mut self, expression: &PerformDbOperation) -> Result<()>;

    fn run_generated(&mut self, expression: &Expression) -> Result<()> {
        let generator = self.generator();
        let sql = generator.generate(expression)?;
        let batches = generator.split_batches(&sql);
        if batches.is_empty() {
            debug!(kind = expression.kind(), "nothing to execute");
        }
        for batch in batches {
            debug!(sql = %batch, "executing");
            self.execute(&batch)?;
        }
        Ok(())
    }

    fn process_merge_data(&mut self, expression: &MergeData) -> Result<()> {
        let existing =
            self.read_table_data(expression.schema_name.as_deref(), &expression.table_name)?;
        for resolved in expression.resolve(&existing) {
            self.run_generated(&resolved)?;
        }
        Ok(())
    }

    process_by_generation! {
        process_create_schema(CreateSchema),
        process_delete_schema(DeleteSchema),
        process_alter_schema(AlterSchema),
        process_create_table(CreateTable),
        process_delete_table(DeleteTable),
        process_alter_table(AlterTable),
        process_rename_table(RenameTable),
        process_create_column(CreateColumn),
        process_alter_column(AlterColumn),
        process_delete_column(DeleteColumn),
        process_rename_column(RenameColumn),
        process_create_index(CreateIndex),
        process_delete_index(DeleteIndex),
        process_create_constraint(CreateConstraint),
        process_delete_constraint(DeleteConstraint),
        process_create_foreign_key(CreateForeignKey),
        process_delete_foreign_key(DeleteForeignKey),
        process_create_sequence(CreateSequence),
        process_delete_sequence(DeleteSequence),
        process_insert_data(InsertData),
        process_delete_data(DeleteData),
        process_update_data(UpdateData),
        process_alter_default_value(AlterDefaultValue),
        process_delete_default_constraint(DeleteDefaultConstraint),
        process_execute_sql(ExecuteSql),
        process_execute_sql_script(ExecuteSqlScript),
        process_execute_embedded_sql_script(ExecuteEmbeddedSqlScript),
    }
}

/// `SELECT * FROM [schema.]table`, used to read rows for merges.
pub fn select_all_query(schema: Option<&str>, table: &str) -> SelectStatement {
    let mut query = Query::select();
    query.column(Asterisk);
    match schema.filter(|s| !s.is_empty()) {
        Some(schema) => query.from((Alias::new(schema), Alias::new(table))),
        None => query.from(Alias::new(table)),
    };
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::{MysqlQueryBuilder, PostgresQueryBuilder, QueryStatementWriter, SqliteQueryBuilder};

    #[test]
    fn select_all_quotes_per_backend() {
        assert_eq!(
            select_all_query(None, "users").to_string(SqliteQueryBuilder),
            r#"SELECT * FROM "users""#
        );
        assert_eq!(
            select_all_query(Some("app"), "users").to_string(PostgresQueryBuilder),
            r#"SELECT * FROM "app"."users""#
        );
        assert_eq!(
            select_all_query(Some("app"), "users").to_string(MysqlQueryBuilder),
            "SELECT * FROM `app`.`users`"
        );
    }

    #[test]
    fn empty_schema_is_ignored() {
        assert_eq!(
            select_all_query(Some(""), "users").to_string(SqliteQueryBuilder),
            r#"SELECT * FROM "users""#
        );
    }
}
