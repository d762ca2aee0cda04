use crate::definition::{ColumnDefinition, DbType};
use crate::error::{MigrationError, Result};
use crate::expression::AlterSchema;
use crate::generator::{
    ColumnFormatter, CommentDescriptions, DescriptionGenerator, DialectKind, Generator,
    GeneratorOptions, Quoter, TypeMap,
};
use crate::value::SystemMethod;

const NAME: &str = "postgres";

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresQuoter;

impl Quoter for PostgresQuoter {
    fn dialect(&self) -> &'static str {
        NAME
    }

    fn quote_schema_name(&self, schema: Option<&str>) -> String {
        self.quote(schema.filter(|s| !s.is_empty()).unwrap_or("public"))
    }

    fn format_bool(&self, value: bool) -> String {
        value.to_string()
    }

    fn format_bytes(&self, value: &[u8]) -> String {
        format!(
            "E'\\\\x{}'",
            crate::generator::quoter::hex(value)
        )
    }

    fn format_system_method(&self, method: SystemMethod) -> Result<String> {
        Ok(match method {
            SystemMethod::NewGuid => "uuid_generate_v4()",
            SystemMethod::CurrentDateTime => "now()",
            SystemMethod::CurrentUtcDateTime => "(now() at time zone 'UTC')",
            SystemMethod::CurrentDateTimeOffset => "current_timestamp",
            SystemMethod::CurrentUser => "current_user",
            SystemMethod::NewSequentialId => {
                return Err(MigrationError::unsupported(
                    NAME,
                    format!("The {} system method", method.name()),
                ))
            }
        }
        .to_string())
    }
}

pub fn type_map() -> TypeMap {
    let mut map = TypeMap::new(NAME);
    map.set(DbType::AnsiStringFixedLength, "CHAR(255)")
        .set_sized(DbType::AnsiStringFixedLength, 10_485_760, "CHAR($size)")
        .set(DbType::AnsiString, "TEXT")
        .set_sized(DbType::AnsiString, 10_485_760, "VARCHAR($size)")
        .set(DbType::Binary, "BYTEA")
        .set_sized(DbType::Binary, u32::MAX, "BYTEA")
        .set(DbType::Boolean, "BOOLEAN")
        .set(DbType::Byte, "SMALLINT")
        .set(DbType::Currency, "MONEY")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "TIMESTAMP")
        .set(DbType::DateTime2, "TIMESTAMP")
        .set(DbType::DateTimeOffset, "TIMESTAMPTZ")
        .set(DbType::Decimal, "DECIMAL(19,5)")
        .set_sized(DbType::Decimal, 1000, "DECIMAL($size,$precision)")
        .set(DbType::Double, "DOUBLE PRECISION")
        .set(DbType::Guid, "UUID")
        .set(DbType::Int16, "SMALLINT")
        .set(DbType::Int32, "INTEGER")
        .set(DbType::Int64, "BIGINT")
        .set(DbType::Single, "REAL")
        .set(DbType::StringFixedLength, "CHAR(255)")
        .set_sized(DbType::StringFixedLength, 10_485_760, "CHAR($size)")
        .set(DbType::String, "TEXT")
        .set_sized(DbType::String, 10_485_760, "VARCHAR($size)")
        .set(DbType::Time, "TIME")
        .set(DbType::Xml, "XML");
    map
}

#[derive(Debug, Clone)]
pub struct PostgresColumn {
    quoter: PostgresQuoter,
    type_map: TypeMap,
}

impl ColumnFormatter for PostgresColumn {
    fn quoter(&self) -> &dyn Quoter {
        &self.quoter
    }

    fn type_map(&self) -> &TypeMap {
        &self.type_map
    }
}

pub struct PostgresGenerator {
    options: GeneratorOptions,
    quoter: PostgresQuoter,
    column: PostgresColumn,
    describer: CommentDescriptions<PostgresQuoter>,
}

impl PostgresGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            quoter: PostgresQuoter,
            column: PostgresColumn {
                quoter: PostgresQuoter,
                type_map: type_map(),
            },
            describer: CommentDescriptions::new(PostgresQuoter),
        }
    }
}

impl Default for PostgresGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl Generator for PostgresGenerator {
    fn dialect(&self) -> DialectKind {
        DialectKind::Postgres
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
        &self.describer
    }

    fn supports_included_columns(&self) -> bool {
        true
    }

    fn supports_filtered_indexes(&self) -> bool {
        true
    }

    fn supports_computed(&self, stored: bool) -> bool {
        stored
    }

    fn alter_schema(&self, expression: &AlterSchema) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} SET SCHEMA {}",
            self.table_name(&expression.table_name, expression.source_schema.as_deref()),
            self.quoter
                .quote_schema_name(expression.destination_schema.as_deref())
        ))
    }

    fn prepare_column(&self, column: &ColumnDefinition) -> Result<ColumnDefinition> {
        let mut column = column.clone();
        if column.is_computed() && !column.expression_stored {
            self.degrade("Virtual computed columns")?;
            column.expression_stored = true;
        }
        Ok(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ForeignKeyDefinition, IndexDefinition, ReferentialAction};
    use crate::expression::*;
    use crate::generator::GeneratorOptions;
    use crate::value::Value;

    fn generate(expression: impl Into<Expression>) -> String {
        PostgresGenerator::default()
            .generate(&expression.into())
            .unwrap()
    }

    #[test]
    fn create_table_defaults_to_public_schema() {
        let sql = generate(
            CreateTable::new("users")
                .column(ColumnDefinition::new("id", DbType::Int64).identity().primary_key())
                .column(ColumnDefinition::new("email", DbType::String).size(200)),
        );
        assert_eq!(
            sql,
            "CREATE TABLE \"public\".\"users\" (\"id\" BIGINT NOT NULL GENERATED BY DEFAULT AS IDENTITY, \"email\" VARCHAR(200) NOT NULL, PRIMARY KEY (\"id\"))"
        );
    }

    #[test]
    fn table_and_column_descriptions_use_comment_on() {
        let sql = generate(
            CreateTable::new("users")
                .description("People")
                .column(ColumnDefinition::new("id", DbType::Int32).description("Key")),
        );
        assert!(sql.contains(";\nCOMMENT ON TABLE \"public\".\"users\" IS 'People'"));
        assert!(sql.ends_with("COMMENT ON COLUMN \"public\".\"users\".\"id\" IS 'Key'"));
    }

    #[test]
    fn literals() {
        let quoter = PostgresQuoter;
        assert_eq!(quoter.quote_value(&Value::Bool(true)).unwrap(), "true");
        assert_eq!(
            quoter.quote_value(&Value::Bytes(vec![0x01, 0xAB])).unwrap(),
            "E'\\\\x01AB'"
        );
        assert_eq!(
            quoter
                .quote_value(&Value::SystemMethod(SystemMethod::CurrentDateTime))
                .unwrap(),
            "now()"
        );
    }

    #[test]
    fn alter_column_emits_one_statement_per_change() {
        let sql = generate(AlterColumn::new(
            "users",
            ColumnDefinition::new("email", DbType::String)
                .size(300)
                .nullable()
                .default("none"),
        ));
        assert_eq!(
            sql,
            "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"email\" SET DATA TYPE VARCHAR(300);\n\
             ALTER TABLE \"public\".\"users\" ALTER COLUMN \"email\" DROP NOT NULL;\n\
             ALTER TABLE \"public\".\"users\" ALTER COLUMN \"email\" SET DEFAULT 'none'"
        );
    }

    #[test]
    fn alter_schema_moves_the_table() {
        let sql = generate(AlterSchema::new("users").from_schema("staging").to_schema("app"));
        assert_eq!(sql, "ALTER TABLE \"staging\".\"users\" SET SCHEMA \"app\"");
    }

    #[test]
    fn partial_covering_index() {
        let sql = generate(CreateIndex::new(
            IndexDefinition::new("ix_users_email", "users")
                .column("email")
                .column_desc("created_at")
                .include("name")
                .filter("deleted_at IS NULL"),
        ));
        assert_eq!(
            sql,
            "CREATE INDEX \"ix_users_email\" ON \"public\".\"users\" (\"email\" ASC, \"created_at\" DESC) INCLUDE (\"name\") WHERE deleted_at IS NULL"
        );
    }

    #[test]
    fn clustered_index_is_degraded_or_rejected() {
        let index = CreateIndex::new(IndexDefinition::new("ix", "t").column("a").clustered());
        assert_eq!(generate(index.clone()), "CREATE INDEX \"ix\" ON \"public\".\"t\" (\"a\" ASC)");

        let strict = PostgresGenerator::new(GeneratorOptions::strict());
        assert!(strict.generate(&index.into()).is_err());
    }

    #[test]
    fn foreign_key_with_cascade() {
        let sql = generate(CreateForeignKey::new(
            ForeignKeyDefinition::new("fk_orders_users")
                .from_table("orders")
                .foreign_columns(&["user_id"])
                .to_table("users")
                .primary_columns(&["id"])
                .on_delete(ReferentialAction::Cascade),
        ));
        assert_eq!(
            sql,
            "ALTER TABLE \"public\".\"orders\" ADD CONSTRAINT \"fk_orders_users\" FOREIGN KEY (\"user_id\") REFERENCES \"public\".\"users\" (\"id\") ON DELETE CASCADE"
        );
    }

    #[test]
    fn virtual_computed_columns_become_stored() {
        let sql = generate(CreateColumn::new(
            "orders",
            ColumnDefinition::new("total", DbType::Decimal).computed("price * qty", false),
        ));
        assert_eq!(
            sql,
            "ALTER TABLE \"public\".\"orders\" ADD COLUMN \"total\" DECIMAL(19,5) GENERATED ALWAYS AS (price * qty) STORED NOT NULL"
        );
    }

    #[test]
    fn delete_data_matches_nulls_with_is_null() {
        let sql = generate(
            DeleteData::new("users")
                .row(crate::definition::DataRow::new().with("id", 1).with("name", Value::Null)),
        );
        assert_eq!(
            sql,
            "DELETE FROM \"public\".\"users\" WHERE \"id\" = 1 AND \"name\" IS NULL"
        );
    }
}
