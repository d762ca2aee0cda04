//! Expression-to-SQL generation.
//!
//! A [`Generator`] composes a [`Quoter`], a [`ColumnFormatter`] and a
//! [`DescriptionGenerator`]. The provided per-kind methods render standard
//! SQL; each dialect overrides the statements whose syntax differs and
//! switches off the capabilities it lacks.

pub mod column;
pub mod compatibility;
pub mod config;
pub mod description;
pub mod quoter;
pub mod truncate;
pub mod type_map;

use std::borrow::Cow;

use tracing::trace;

pub use column::{ColumnFormatter, ColumnStep, DEFAULT_STEPS};
pub use compatibility::CompatibilityMode;
pub use config::{DialectKind, FirebirdOptions, GeneratorConfig, GeneratorOptions};
pub use description::{CommentDescriptions, DescriptionGenerator, NoDescriptions};
pub use quoter::Quoter;
pub use truncate::Truncator;
pub use type_map::TypeMap;

use crate::definition::{ColumnDefinition, DataRow, ReferentialAction};
use crate::error::{MigrationError, Result};
use crate::expression::*;

/// Renders migration expressions as SQL for one dialect.
///
/// The provided methods produce standard SQL; each dialect supplies its
/// quoter, column formatter and description generator, and overrides the
/// statements whose syntax differs. Operations the dialect cannot express
/// go through [`Generator::handle`] or [`Generator::degrade`], so the
/// compatibility mode decides whether they are skipped or rejected.
/// `generate` returns an empty string for a skipped statement.
pub trait Generator: Send + Sync {
    fn dialect(&self) -> DialectKind;

    fn options(&self) -> &GeneratorOptions;

    fn quoter(&self) -> &dyn Quoter;

    fn column(&self) -> &dyn ColumnFormatter;

    fn describer(&self) -> &dyn DescriptionGenerator;

    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn compatibility(&self) -> CompatibilityMode {
        self.options().compatibility
    }

    /// Skips (loose) or rejects (strict) a whole statement.
    fn handle(&self, operation: &str) -> Result<String> {
        self.compatibility().handle(self.name(), operation)
    }

    /// Drops (loose) or rejects (strict) an optional clause.
    fn degrade(&self, clause: &str) -> Result<()> {
        self.compatibility().degrade(self.name(), clause)
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn supports_foreign_keys(&self) -> bool {
        true
    }

    fn supports_clustered_indexes(&self) -> bool {
        false
    }

    fn supports_included_columns(&self) -> bool {
        false
    }

    fn supports_filtered_indexes(&self) -> bool {
        false
    }

    fn supports_drop_if_exists(&self) -> bool {
        true
    }

    fn supports_computed(&self, _stored: bool) -> bool {
        true
    }

    fn supports_referential_action(&self, _on_update: bool, _action: ReferentialAction) -> bool {
        true
    }

    fn statement_separator(&self) -> &'static str {
        ";\n"
    }

    /// Splits generated text into the units a connection executes one at a
    /// time.
    fn split_batches(&self, sql: &str) -> Vec<String> {
        let sql = sql.trim();
        if sql.is_empty() {
            Vec::new()
        } else {
            vec![sql.to_string()]
        }
    }

    /// Joins the non-empty statements with the statement separator.
    fn join(&self, statements: Vec<String>) -> String {
        statements
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(self.statement_separator())
    }

    /// Rewrites an expression before generation. Dialects with identifier
    /// limits shorten names here.
    fn normalize<'a>(&self, expression: &'a Expression) -> Result<Cow<'a, Expression>> {
        Ok(Cow::Borrowed(expression))
    }

    fn generate(&self, expression: &Expression) -> Result<String> {
        let expression = self.normalize(expression)?;
        let sql = match expression.as_ref() {
            Expression::CreateSchema(e) => self.create_schema(e),
            Expression::DeleteSchema(e) => self.delete_schema(e),
            Expression::AlterSchema(e) => self.alter_schema(e),
            Expression::CreateTable(e) => self.create_table(e),
            Expression::DeleteTable(e) => self.delete_table(e),
            Expression::AlterTable(e) => self.alter_table(e),
            Expression::RenameTable(e) => self.rename_table(e),
            Expression::CreateColumn(e) => self.create_column(e),
            Expression::AlterColumn(e) => self.alter_column(e),
            Expression::DeleteColumn(e) => self.delete_column(e),
            Expression::RenameColumn(e) => self.rename_column(e),
            Expression::CreateIndex(e) => self.create_index(e),
            Expression::DeleteIndex(e) => self.delete_index(e),
            Expression::CreateConstraint(e) => self.create_constraint(e),
            Expression::DeleteConstraint(e) => self.delete_constraint(e),
            Expression::CreateForeignKey(e) => self.create_foreign_key(e),
            Expression::DeleteForeignKey(e) => self.delete_foreign_key(e),
            Expression::CreateSequence(e) => self.create_sequence(e),
            Expression::DeleteSequence(e) => self.delete_sequence(e),
            Expression::InsertData(e) => self.insert_data(e),
            Expression::DeleteData(e) => self.delete_data(e),
            Expression::UpdateData(e) => self.update_data(e),
            Expression::AlterDefaultValue(e) => self.alter_default_value(e),
            Expression::DeleteDefaultConstraint(e) => self.delete_default_constraint(e),
            Expression::ExecuteSql(e) => self.execute_sql(e),
            Expression::ExecuteSqlScript(e) => self.execute_sql_script(e),
            Expression::ExecuteEmbeddedSqlScript(e) => self.execute_embedded_sql_script(e),
            Expression::MergeData(_) | Expression::PerformDbOperation(_) => {
                Err(MigrationError::ProcessorOnly(expression.kind()))
            }
        }?;
        trace!(dialect = self.name(), kind = expression.kind(), sql = %sql, "generated");
        Ok(sql)
    }

    /// Applies the computed-column capability gate. A loose generator
    /// falls back to the other storage mode.
    fn prepare_column(&self, column: &ColumnDefinition) -> Result<ColumnDefinition> {
        let mut column = column.clone();
        if column.is_computed() && !self.supports_computed(column.expression_stored) {
            self.degrade(if column.expression_stored {
                "Stored computed columns"
            } else {
                "Virtual computed columns"
            })?;
            column.expression_stored = !column.expression_stored;
        }
        Ok(column)
    }

    fn table_name(&self, table: &str, schema: Option<&str>) -> String {
        self.quoter().quote_table_name(table, schema)
    }

    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.quoter().quote_column_name(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `a = 1 AND b IS NULL`, in the row's column order.
    fn where_clause(&self, row: &DataRow) -> Result<String> {
        let mut predicates = Vec::with_capacity(row.len());
        for (column, value) in row.iter() {
            let column = self.quoter().quote_column_name(column);
            if value.is_null() {
                predicates.push(format!("{} IS NULL", column));
            } else {
                predicates.push(format!("{} = {}", column, self.quoter().quote_value(value)?));
            }
        }
        Ok(predicates.join(" AND "))
    }

    fn referential_actions(
        &self,
        on_delete: ReferentialAction,
        on_update: ReferentialAction,
    ) -> Result<String> {
        let mut clauses = String::new();
        for (on_update, action) in [(false, on_delete), (true, on_update)] {
            if action == ReferentialAction::NoAction {
                continue;
            }
            let clause = if on_update { "ON UPDATE" } else { "ON DELETE" };
            if self.supports_referential_action(on_update, action) {
                clauses.push_str(&format!(" {} {}", clause, action.as_sql()));
            } else {
                self.degrade(&format!("{} {}", clause, action.as_sql()))?;
            }
        }
        Ok(clauses)
    }

    fn create_schema(&self, expression: &CreateSchema) -> Result<String> {
        if !self.supports_schemas() {
            return self.handle("Creating schemas");
        }
        Ok(format!(
            "CREATE SCHEMA {}",
            self.quoter().quote(&expression.schema_name)
        ))
    }

    fn delete_schema(&self, expression: &DeleteSchema) -> Result<String> {
        if !self.supports_schemas() {
            return self.handle("Deleting schemas");
        }
        Ok(format!(
            "DROP SCHEMA {}",
            self.quoter().quote(&expression.schema_name)
        ))
    }

    fn alter_schema(&self, _expression: &AlterSchema) -> Result<String> {
        self.handle("Moving tables between schemas")
    }

    /// Trailing text after the column list, such as a storage engine.
    fn table_options(&self, _expression: &CreateTable) -> Result<String> {
        Ok(String::new())
    }

    fn create_table(&self, expression: &CreateTable) -> Result<String> {
        let columns = expression
            .owned_columns()
            .iter()
            .map(|c| self.prepare_column(c))
            .collect::<Result<Vec<_>>>()?;
        let create = format!(
            "CREATE TABLE {} ({}){}",
            self.table_name(&expression.table_name, expression.schema_name.as_deref()),
            self.column().format_all(&columns)?,
            self.table_options(expression)?
        );
        let mut statements = vec![create];
        statements.extend(self.describer().create_table_descriptions(expression));
        Ok(self.join(statements))
    }

    fn delete_table(&self, expression: &DeleteTable) -> Result<String> {
        let table = self.table_name(&expression.table_name, expression.schema_name.as_deref());
        if expression.if_exists {
            if self.supports_drop_if_exists() {
                return Ok(format!("DROP TABLE IF EXISTS {}", table));
            }
            self.degrade("DROP TABLE IF EXISTS")?;
        }
        Ok(format!("DROP TABLE {}", table))
    }

    fn alter_table(&self, expression: &AlterTable) -> Result<String> {
        let statements = match description::non_empty(expression.description.as_deref()) {
            Some(description) => self.describer().alter_table_description(
                expression.schema_name.as_deref(),
                &expression.table_name,
                description,
            ),
            None => Vec::new(),
        };
        Ok(self.join(statements))
    }

    fn rename_table(&self, expression: &RenameTable) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} RENAME TO {}",
            self.table_name(&expression.old_name, expression.schema_name.as_deref()),
            self.quoter().quote(&expression.new_name)
        ))
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD COLUMN"
    }

    fn create_column(&self, expression: &CreateColumn) -> Result<String> {
        let column = self.prepare_column(&expression.owned_column())?;
        let schema = expression.schema_name.as_deref();
        let mut statements = vec![format!(
            "ALTER TABLE {} {} {}",
            self.table_name(&expression.table_name, schema),
            self.add_column_keyword(),
            self.column().format(&column)?
        )];
        if let Some(description) = description::non_empty(column.description.as_deref()) {
            statements.extend(self.describer().column_description(
                schema,
                &expression.table_name,
                &column.name,
                description,
            ));
        }
        Ok(self.join(statements))
    }

    /// One standard `ALTER COLUMN` statement per changed attribute.
    fn alter_column(&self, expression: &AlterColumn) -> Result<String> {
        let column = self.prepare_column(&expression.owned_column())?;
        let schema = expression.schema_name.as_deref();
        let prefix = format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            self.table_name(&expression.table_name, schema),
            self.quoter().quote_column_name(&column.name)
        );

        let mut statements = Vec::new();
        if column.has_type() {
            statements.push(format!(
                "{} SET DATA TYPE {}",
                prefix,
                self.column().format_type(&column)?
            ));
        }
        match column.nullable {
            Some(true) => statements.push(format!("{} DROP NOT NULL", prefix)),
            Some(false) => statements.push(format!("{} SET NOT NULL", prefix)),
            None => {}
        }
        if let Some(default) = &column.default {
            statements.push(format!(
                "{} SET DEFAULT {}",
                prefix,
                self.column().format_default_literal(default)?
            ));
        }
        if let Some(description) = description::non_empty(column.description.as_deref()) {
            statements.extend(self.describer().alter_column_description(
                schema,
                &expression.table_name,
                &column.name,
                description,
            ));
        }
        Ok(self.join(statements))
    }

    fn delete_column(&self, expression: &DeleteColumn) -> Result<String> {
        let table = self.table_name(&expression.table_name, expression.schema_name.as_deref());
        let statements = expression
            .column_names
            .iter()
            .map(|column| {
                format!(
                    "ALTER TABLE {} DROP COLUMN {}",
                    table,
                    self.quoter().quote_column_name(column)
                )
            })
            .collect();
        Ok(self.join(statements))
    }

    fn rename_column(&self, expression: &RenameColumn) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.table_name(&expression.table_name, expression.schema_name.as_deref()),
            self.quoter().quote_column_name(&expression.old_name),
            self.quoter().quote_column_name(&expression.new_name)
        ))
    }

    fn index_columns(&self, expression: &CreateIndex) -> String {
        expression
            .index
            .columns
            .iter()
            .map(|c| format!("{} {}", self.quoter().quote_column_name(&c.name), c.order.as_sql()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn create_index(&self, expression: &CreateIndex) -> Result<String> {
        let index = &expression.index;
        let mut sql = String::from("CREATE ");
        if index.unique {
            sql.push_str("UNIQUE ");
        }
        if index.clustered {
            if self.supports_clustered_indexes() {
                sql.push_str("CLUSTERED ");
            } else {
                self.degrade("Clustered indexes")?;
            }
        }
        sql.push_str(&format!(
            "INDEX {} ON {} ({})",
            self.quoter().quote(&index.name),
            self.table_name(&index.table_name, index.schema_name.as_deref()),
            self.index_columns(expression)
        ));

        let includes = index.includes();
        if !includes.is_empty() {
            if self.supports_included_columns() {
                sql.push_str(&format!(" INCLUDE ({})", self.column_list(&includes)));
            } else {
                self.degrade("Included index columns")?;
            }
        }
        if let Some(filter) = index.filter_predicate() {
            if self.supports_filtered_indexes() {
                sql.push_str(&format!(" WHERE {}", filter));
            } else {
                self.degrade("Filtered indexes")?;
            }
        }
        Ok(sql)
    }

    fn delete_index(&self, expression: &DeleteIndex) -> Result<String> {
        let index = &expression.index;
        Ok(format!(
            "DROP INDEX {}",
            self.quoter()
                .quote_index_name(&index.name, index.schema_name.as_deref())
        ))
    }

    fn create_constraint(&self, expression: &CreateConstraint) -> Result<String> {
        let constraint = &expression.constraint;
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {} ({})",
            self.table_name(&constraint.table_name, constraint.schema_name.as_deref()),
            self.quoter().quote_constraint_name(&constraint.name),
            constraint.kind.as_sql(),
            self.column_list(&constraint.columns)
        ))
    }

    fn delete_constraint(&self, expression: &DeleteConstraint) -> Result<String> {
        let constraint = &expression.constraint;
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.table_name(&constraint.table_name, constraint.schema_name.as_deref()),
            self.quoter().quote_constraint_name(&constraint.name)
        ))
    }

    fn create_foreign_key(&self, expression: &CreateForeignKey) -> Result<String> {
        if !self.supports_foreign_keys() {
            return self.handle("Foreign keys");
        }
        let fk = &expression.foreign_key;
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}){}",
            self.table_name(&fk.foreign_table, fk.foreign_table_schema.as_deref()),
            self.quoter().quote_constraint_name(&fk.name),
            self.column_list(&fk.foreign_columns),
            self.table_name(&fk.primary_table, fk.primary_table_schema.as_deref()),
            self.column_list(&fk.primary_columns),
            self.referential_actions(fk.on_delete, fk.on_update)?
        ))
    }

    fn delete_foreign_key(&self, expression: &DeleteForeignKey) -> Result<String> {
        if !self.supports_foreign_keys() {
            return self.handle("Foreign keys");
        }
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.table_name(&expression.table_name, expression.schema_name.as_deref()),
            self.quoter()
                .quote_constraint_name(&expression.foreign_key.name)
        ))
    }

    fn create_sequence(&self, expression: &CreateSequence) -> Result<String> {
        if !self.supports_sequences() {
            return self.handle("Sequences");
        }
        let sequence = &expression.sequence;
        let mut sql = format!(
            "CREATE SEQUENCE {}",
            self.quoter()
                .quote_sequence_name(&sequence.name, sequence.schema_name.as_deref())
        );
        if let Some(increment) = sequence.increment {
            sql.push_str(&format!(" INCREMENT BY {}", increment));
        }
        if let Some(min) = sequence.min_value {
            sql.push_str(&format!(" MINVALUE {}", min));
        }
        if let Some(max) = sequence.max_value {
            sql.push_str(&format!(" MAXVALUE {}", max));
        }
        if let Some(start) = sequence.start_with {
            sql.push_str(&format!(" START WITH {}", start));
        }
        if let Some(cache) = sequence.cache {
            sql.push_str(&format!(" CACHE {}", cache));
        }
        if sequence.cycle {
            sql.push_str(" CYCLE");
        }
        Ok(sql)
    }

    fn delete_sequence(&self, expression: &DeleteSequence) -> Result<String> {
        if !self.supports_sequences() {
            return self.handle("Sequences");
        }
        Ok(format!(
            "DROP SEQUENCE {}",
            self.quoter()
                .quote_sequence_name(&expression.sequence_name, expression.schema_name.as_deref())
        ))
    }

    fn insert_row(&self, table: &str, row: &DataRow) -> Result<String> {
        let columns: Vec<String> = row.columns().map(str::to_string).collect();
        let values = row
            .values()
            .map(|v| self.quoter().quote_value(v))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            self.column_list(&columns),
            values.join(", ")
        ))
    }

    fn insert_data(&self, expression: &InsertData) -> Result<String> {
        let table = self.table_name(&expression.table_name, expression.schema_name.as_deref());
        let statements = expression
            .rows
            .iter()
            .map(|row| self.insert_row(&table, row))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.join(statements))
    }

    fn delete_data(&self, expression: &DeleteData) -> Result<String> {
        let table = self.table_name(&expression.table_name, expression.schema_name.as_deref());
        if expression.all_rows {
            return Ok(format!("DELETE FROM {}", table));
        }
        let statements = expression
            .rows
            .iter()
            .map(|row| Ok(format!("DELETE FROM {} WHERE {}", table, self.where_clause(row)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.join(statements))
    }

    fn update_data(&self, expression: &UpdateData) -> Result<String> {
        let assignments = expression
            .set
            .iter()
            .map(|(column, value)| {
                Ok(format!(
                    "{} = {}",
                    self.quoter().quote_column_name(column),
                    self.quoter().quote_value(value)?
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.table_name(&expression.table_name, expression.schema_name.as_deref()),
            assignments.join(", ")
        );
        if !expression.all_rows && !expression.filter.is_empty() {
            sql.push_str(&format!(" WHERE {}", self.where_clause(&expression.filter)?));
        }
        Ok(sql)
    }

    fn alter_default_value(&self, expression: &AlterDefaultValue) -> Result<String> {
        let prefix = format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            self.table_name(&expression.table_name, expression.schema_name.as_deref()),
            self.quoter().quote_column_name(&expression.column_name)
        );
        match &expression.default {
            Some(value) => Ok(format!(
                "{} SET DEFAULT {}",
                prefix,
                self.column().format_default_literal(value)?
            )),
            None => Ok(format!("{} DROP DEFAULT", prefix)),
        }
    }

    fn delete_default_constraint(&self, expression: &DeleteDefaultConstraint) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
            self.table_name(&expression.table_name, expression.schema_name.as_deref()),
            self.quoter().quote_column_name(&expression.column_name)
        ))
    }

    fn execute_sql(&self, expression: &ExecuteSql) -> Result<String> {
        if expression.applies_to(self.dialect()) {
            Ok(expression.sql.clone())
        } else {
            Ok(String::new())
        }
    }

    fn execute_sql_script(&self, expression: &ExecuteSqlScript) -> Result<String> {
        expression.sql_text()
    }

    fn execute_embedded_sql_script(&self, expression: &ExecuteEmbeddedSqlScript) -> Result<String> {
        expression.sql_text()
    }
}

/// Splits on lines consisting only of `GO`, as SQL Server tooling does.
pub(crate) fn split_on_go(sql: &str) -> Vec<String> {
    let mut batches = Vec::new();
    let mut current = Vec::new();
    for line in sql.lines() {
        if line.trim().eq_ignore_ascii_case("GO") {
            batches.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    batches.push(current.join("\n"));
    batches
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_on_go_drops_empty_batches() {
        let batches = split_on_go("SELECT 1;\nGO\n\ngo\nSELECT 2\nGO");
        assert_eq!(batches, vec!["SELECT 1;", "SELECT 2"]);
    }

    #[test]
    fn go_inside_a_line_is_not_a_separator() {
        let batches = split_on_go("SELECT 'GO' AS word");
        assert_eq!(batches, vec!["SELECT 'GO' AS word"]);
    }
}
