use crate::definition::{ColumnDefinition, ConstraintKind, DbType};
use crate::error::{MigrationError, Result};
use crate::expression::*;
use crate::generator::{
    ColumnFormatter, DescriptionGenerator, DialectKind, Generator, GeneratorOptions,
    NoDescriptions, Quoter, TypeMap,
};
use crate::value::SystemMethod;

const NAME: &str = "sqlite";

/// SQLite has no schemas; any schema name is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteQuoter;

impl Quoter for SqliteQuoter {
    fn dialect(&self) -> &'static str {
        NAME
    }

    fn quote_schema_name(&self, _schema: Option<&str>) -> String {
        String::new()
    }

    fn format_bytes(&self, value: &[u8]) -> String {
        format!("X'{}'", crate::generator::quoter::hex(value))
    }

    fn format_system_method(&self, method: SystemMethod) -> Result<String> {
        match method {
            SystemMethod::CurrentDateTime => Ok("(datetime('now','localtime'))".to_string()),
            SystemMethod::CurrentUtcDateTime => Ok("CURRENT_TIMESTAMP".to_string()),
            _ => Err(MigrationError::unsupported(
                NAME,
                format!("The {} system method", method.name()),
            )),
        }
    }
}

pub fn type_map() -> TypeMap {
    let mut map = TypeMap::new(NAME);
    for text in [
        DbType::AnsiString,
        DbType::AnsiStringFixedLength,
        DbType::String,
        DbType::StringFixedLength,
        DbType::Xml,
    ] {
        map.set(text, "TEXT");
    }
    for integer in [
        DbType::Boolean,
        DbType::Byte,
        DbType::Int16,
        DbType::Int32,
        DbType::Int64,
    ] {
        map.set(integer, "INTEGER");
    }
    for numeric in [
        DbType::Currency,
        DbType::Decimal,
        DbType::Double,
        DbType::Single,
    ] {
        map.set(numeric, "NUMERIC");
    }
    for temporal in [
        DbType::Date,
        DbType::DateTime,
        DbType::DateTime2,
        DbType::DateTimeOffset,
        DbType::Time,
    ] {
        map.set(temporal, "DATETIME");
    }
    map.set(DbType::Binary, "BLOB")
        .set(DbType::Guid, "UNIQUEIDENTIFIER");
    map
}

#[derive(Debug, Clone)]
pub struct SqliteColumn {
    quoter: SqliteQuoter,
    type_map: TypeMap,
}

impl SqliteColumn {
    fn is_autoincrement(column: &ColumnDefinition) -> bool {
        column.identity && column.primary_key
    }
}

impl ColumnFormatter for SqliteColumn {
    fn quoter(&self) -> &dyn Quoter {
        &self.quoter
    }

    fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    /// An identity key is only valid as `INTEGER PRIMARY KEY AUTOINCREMENT`
    /// written on the column itself.
    fn format_primary_key(&self, column: &ColumnDefinition) -> String {
        if Self::is_autoincrement(column) {
            "PRIMARY KEY AUTOINCREMENT".to_string()
        } else {
            String::new()
        }
    }

    fn format_identity(&self, _column: &ColumnDefinition) -> String {
        String::new()
    }

    fn renders_primary_key_inline(&self, columns: &[ColumnDefinition]) -> bool {
        columns.iter().any(Self::is_autoincrement)
    }
}

pub struct SqliteGenerator {
    options: GeneratorOptions,
    quoter: SqliteQuoter,
    column: SqliteColumn,
}

impl SqliteGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            quoter: SqliteQuoter,
            column: SqliteColumn {
                quoter: SqliteQuoter,
                type_map: type_map(),
            },
        }
    }
}

impl Default for SqliteGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl Generator for SqliteGenerator {
    fn dialect(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn quoter(&self) -> &dyn Quoter {
        &self.quoter
    }

    fn column(&self) -> &dyn ColumnFormatter {
        &self.column
    }

    fn describer(&self) -> &dyn DescriptionGenerator {
        &NoDescriptions
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    fn supports_sequences(&self) -> bool {
        false
    }

    /// Foreign keys can only be declared when a table is created.
    fn supports_foreign_keys(&self) -> bool {
        false
    }

    fn supports_filtered_indexes(&self) -> bool {
        true
    }

    fn alter_column(&self, _expression: &AlterColumn) -> Result<String> {
        self.handle("Altering columns")
    }

    fn rename_column(&self, _expression: &RenameColumn) -> Result<String> {
        self.handle("Renaming columns")
    }

    /// Unique constraints become unique indexes.
    fn create_constraint(&self, expression: &CreateConstraint) -> Result<String> {
        let constraint = &expression.constraint;
        match constraint.kind {
            ConstraintKind::PrimaryKey => self.handle("Adding primary key constraints"),
            ConstraintKind::Unique => Ok(format!(
                "CREATE UNIQUE INDEX {} ON {} ({})",
                self.quoter.quote(&constraint.name),
                self.table_name(&constraint.table_name, None),
                self.column_list(&constraint.columns)
            )),
        }
    }

    fn delete_constraint(&self, expression: &DeleteConstraint) -> Result<String> {
        let constraint = &expression.constraint;
        match constraint.kind {
            ConstraintKind::PrimaryKey => self.handle("Dropping primary key constraints"),
            ConstraintKind::Unique => {
                Ok(format!("DROP INDEX {}", self.quoter.quote(&constraint.name)))
            }
        }
    }

    fn alter_default_value(&self, _expression: &AlterDefaultValue) -> Result<String> {
        self.handle("Altering default values")
    }

    fn delete_default_constraint(&self, _expression: &DeleteDefaultConstraint) -> Result<String> {
        self.handle("Dropping default values")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ConstraintDefinition, DataRow, IndexDefinition};
    use crate::value::Value;

    fn generate(expression: impl Into<Expression>) -> String {
        SqliteGenerator::default().generate(&expression.into()).unwrap()
    }

    #[test]
    fn identity_key_is_inline_autoincrement() {
        let sql = generate(
            CreateTable::new("users")
                .schema("ignored")
                .column(ColumnDefinition::new("id", DbType::Int32).identity().primary_key())
                .column(ColumnDefinition::new("name", DbType::String).nullable()),
        );
        assert_eq!(
            sql,
            "CREATE TABLE \"users\" (\"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \"name\" TEXT)"
        );
    }

    #[test]
    fn composite_key_is_a_trailing_clause() {
        let sql = generate(
            CreateTable::new("pairs")
                .column(ColumnDefinition::new("a", DbType::Int32).primary_key())
                .column(ColumnDefinition::new("b", DbType::Int32).primary_key()),
        );
        assert_eq!(
            sql,
            "CREATE TABLE \"pairs\" (\"a\" INTEGER NOT NULL, \"b\" INTEGER NOT NULL, PRIMARY KEY (\"a\", \"b\"))"
        );
    }

    #[test]
    fn one_insert_per_row_with_escaped_quotes() {
        let sql = generate(
            InsertData::new("people")
                .row(DataRow::new().with("id", 1).with("name", "Just'in"))
                .row(DataRow::new().with("id", 2).with("name", "Ada")),
        );
        assert_eq!(
            sql,
            "INSERT INTO \"people\" (\"id\", \"name\") VALUES (1, 'Just''in');\n\
             INSERT INTO \"people\" (\"id\", \"name\") VALUES (2, 'Ada')"
        );
    }

    #[test]
    fn unsupported_statements_are_skipped_when_loose() {
        assert_eq!(generate(RenameColumn::new("t", "a", "b")), "");
        assert_eq!(
            generate(AlterColumn::new("t", ColumnDefinition::new("a", DbType::Int64))),
            ""
        );
        assert_eq!(generate(CreateSchema::new("app")), "");
    }

    #[test]
    fn unsupported_statements_fail_when_strict() {
        let strict = SqliteGenerator::new(GeneratorOptions::strict());
        let err = strict
            .generate(&RenameColumn::new("t", "a", "b").into())
            .unwrap_err();
        assert_eq!(err.to_string(), "Renaming columns is not supported by sqlite");
    }

    #[test]
    fn unique_constraint_is_an_index() {
        let constraint = ConstraintDefinition::unique("users")
            .named("UC_users_email")
            .column("email");
        assert_eq!(
            generate(CreateConstraint::new(constraint.clone())),
            "CREATE UNIQUE INDEX \"UC_users_email\" ON \"users\" (\"email\")"
        );
        assert_eq!(
            generate(DeleteConstraint::new(constraint)),
            "DROP INDEX \"UC_users_email\""
        );
    }

    #[test]
    fn partial_index() {
        let sql = generate(CreateIndex::new(
            IndexDefinition::new("ix_active", "users")
                .column("email")
                .filter("active = 1"),
        ));
        assert_eq!(
            sql,
            "CREATE INDEX \"ix_active\" ON \"users\" (\"email\" ASC) WHERE active = 1"
        );
    }

    #[test]
    fn blob_and_timestamp_literals() {
        let quoter = SqliteQuoter;
        assert_eq!(quoter.quote_value(&Value::Bytes(vec![0x0A])).unwrap(), "X'0A'");
        assert_eq!(
            quoter
                .quote_value(&Value::SystemMethod(SystemMethod::CurrentUtcDateTime))
                .unwrap(),
            "CURRENT_TIMESTAMP"
        );
        assert!(quoter
            .quote_value(&Value::SystemMethod(SystemMethod::NewGuid))
            .is_err());
    }
}
