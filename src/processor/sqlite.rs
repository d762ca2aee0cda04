use rusqlite::types::ValueRef;
use rusqlite::Connection;
use sea_query::{QueryStatementWriter, SqliteQueryBuilder};

use crate::definition::DataRow;
use crate::error::Result;
use crate::expression::PerformDbOperation;
use crate::generator::{DialectKind, Generator, GeneratorConfig};
use crate::processor::{select_all_query, Processor};
use crate::value::Value;

pub struct SqliteProcessor {
    connection: Connection,
    generator: Box<dyn Generator>,
}

impl SqliteProcessor {
    pub fn new(connection: Connection) -> Self {
        Self::with_generator(connection, GeneratorConfig::new(DialectKind::Sqlite).build())
    }

    pub fn with_generator(connection: Connection, generator: Box<dyn Generator>) -> Self {
        Self {
            connection,
            generator,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn into_inner(self) -> Connection {
        self.connection
    }
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}

impl Processor for SqliteProcessor {
    fn generator(&self) -> &dyn Generator {
        self.generator.as_ref()
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.connection.execute_batch(sql)?;
        Ok(())
    }

    fn read_table_data(&mut self, schema: Option<&str>, table: &str) -> Result<Vec<DataRow>> {
        let sql = select_all_query(schema, table).to_string(SqliteQueryBuilder);
        let mut statement = self.connection.prepare(&sql)?;
        let columns: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let rows = statement
            .query_map([], |row| {
                let mut data = DataRow::new();
                for (index, column) in columns.iter().enumerate() {
                    data.push(column.clone(), to_value(row.get_ref(index)?));
                }
                Ok(data)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn process_perform_db_operation(&mut self, expression: &PerformDbOperation) -> Result<()> {
        expression.run(self)
    }
}
