use std::collections::BTreeMap;

use crate::definition::DataRow;
use crate::error::Result;
use crate::expression::PerformDbOperation;
use crate::generator::Generator;
use crate::processor::Processor;

/// Keeps executed SQL in memory instead of sending it anywhere.
///
/// Merges read from table data seeded with [`RecordingProcessor::with_rows`];
/// unseeded tables read as empty.
pub struct RecordingProcessor {
    generator: Box<dyn Generator>,
    executed: Vec<String>,
    tables: BTreeMap<(Option<String>, String), Vec<DataRow>>,
}

impl RecordingProcessor {
    pub fn new(generator: Box<dyn Generator>) -> Self {
        Self {
            generator,
            executed: Vec::new(),
            tables: BTreeMap::new(),
        }
    }

    pub fn with_rows(mut self, schema: Option<&str>, table: &str, rows: Vec<DataRow>) -> Self {
        self.tables
            .insert((schema.map(str::to_string), table.to_string()), rows);
        self
    }

    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    pub fn take_executed(&mut self) -> Vec<String> {
        std::mem::take(&mut self.executed)
    }
}

impl Processor for RecordingProcessor {
    fn generator(&self) -> &dyn Generator {
        self.generator.as_ref()
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.executed.push(sql.to_string());
        Ok(())
    }

    fn read_table_data(&mut self, schema: Option<&str>, table: &str) -> Result<Vec<DataRow>> {
        Ok(self
            .tables
            .get(&(schema.map(str::to_string), table.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn process_perform_db_operation(&mut self, expression: &PerformDbOperation) -> Result<()> {
        expression.run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ColumnDefinition, DbType};
    use crate::expression::{CreateTable, Expression, MergeData};
    use crate::generator::{DialectKind, GeneratorConfig};

    fn sqlite() -> RecordingProcessor {
        RecordingProcessor::new(GeneratorConfig::new(DialectKind::Sqlite).build())
    }

    #[test]
    fn generated_sql_is_recorded() {
        let mut processor = sqlite();
        let expr: Expression = CreateTable::new("users")
            .column(ColumnDefinition::new("id", DbType::Int32).primary_key())
            .into();
        expr.execute_with(&mut processor).unwrap();

        assert_eq!(processor.executed().len(), 1);
        assert!(processor.executed()[0].starts_with("CREATE TABLE \"users\""));
    }

    #[test]
    fn merge_updates_matches_and_inserts_the_rest() {
        let mut processor = sqlite().with_rows(
            None,
            "users",
            vec![DataRow::new().with("id", 1).with("name", "old")],
        );
        let expr: Expression = MergeData::new("users")
            .row(DataRow::new().with("id", 1).with("name", "Ada"))
            .row(DataRow::new().with("id", 99).with("name", "Grace"))
            .match_on(&["id"])
            .into();
        expr.execute_with(&mut processor).unwrap();

        assert_eq!(
            processor.take_executed(),
            vec![
                "UPDATE \"users\" SET \"name\" = 'Ada' WHERE \"id\" = 1",
                "INSERT INTO \"users\" (\"id\", \"name\") VALUES (99, 'Grace')",
            ]
        );
        assert!(processor.executed().is_empty());
    }

    #[test]
    fn db_operations_run_against_the_processor() {
        let mut processor = sqlite();
        let expr: Expression = PerformDbOperation::new("seed", |p| p.execute("SELECT 1")).into();
        expr.execute_with(&mut processor).unwrap();
        assert_eq!(processor.executed(), ["SELECT 1"]);
    }

    #[test]
    fn skipped_operations_execute_nothing() {
        let mut processor = sqlite();
        let expr: Expression = crate::expression::RenameColumn::new("users", "a", "b").into();
        expr.execute_with(&mut processor).unwrap();
        assert!(processor.executed().is_empty());
    }
}
