use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::definition::{features, ColumnDefinition, DbType, ReferentialAction};
use crate::error::{MigrationError, Result};
use crate::expression::*;
use crate::generator::quoter::hex;
use crate::generator::{
    ColumnFormatter, CommentDescriptions, DescriptionGenerator, DialectKind, Generator,
    GeneratorOptions, Quoter, TypeMap,
};
use crate::value::SystemMethod;

const NAME: &str = "db2";

#[derive(Debug, Clone, Copy, Default)]
pub struct Db2Quoter;

impl Quoter for Db2Quoter {
    fn dialect(&self) -> &'static str {
        NAME
    }

    // Booleans are stored as CHAR(1).
    fn format_bool(&self, value: bool) -> String {
        if value { "'1'" } else { "'0'" }.to_string()
    }

    fn format_bytes(&self, value: &[u8]) -> String {
        format!("BX'{}'", hex(value))
    }

    fn format_date(&self, value: &NaiveDate) -> String {
        format!("DATE '{}'", value.format("%Y-%m-%d"))
    }

    fn format_date_time(&self, value: &NaiveDateTime) -> String {
        format!("TIMESTAMP '{}'", value.format("%Y-%m-%d-%H.%M.%S"))
    }

    fn format_guid(&self, value: &Uuid) -> String {
        self.format_bytes(value.as_bytes())
    }

    fn format_system_method(&self, method: SystemMethod) -> Result<String> {
        Ok(match method {
            SystemMethod::CurrentDateTime => "CURRENT_TIMESTAMP",
            SystemMethod::CurrentUtcDateTime => "(CURRENT_TIMESTAMP - CURRENT_TIMEZONE)",
            SystemMethod::CurrentUser => "USER",
            SystemMethod::NewGuid
            | SystemMethod::NewSequentialId
            | SystemMethod::CurrentDateTimeOffset => {
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
        .set_sized(DbType::AnsiStringFixedLength, 255, "CHAR($size)")
        .set(DbType::AnsiString, "VARCHAR(255)")
        .set_sized(DbType::AnsiString, 32_704, "VARCHAR($size)")
        .set_sized(DbType::AnsiString, 2_147_483_647, "CLOB($size)")
        .set(DbType::Binary, "BINARY(255)")
        .set_sized(DbType::Binary, 255, "BINARY($size)")
        .set_sized(DbType::Binary, 32_704, "VARBINARY($size)")
        .set_sized(DbType::Binary, 2_147_483_647, "BLOB($size)")
        .set(DbType::Boolean, "CHAR(1)")
        .set(DbType::Byte, "SMALLINT")
        .set(DbType::Currency, "DECIMAL(19,4)")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "TIMESTAMP")
        .set(DbType::DateTime2, "TIMESTAMP(7)")
        .set(DbType::Decimal, "DECIMAL(19,5)")
        .set_sized(DbType::Decimal, 31, "DECIMAL($size,$precision)")
        .set(DbType::Double, "DOUBLE")
        .set(DbType::Guid, "CHAR(16) FOR BIT DATA")
        .set(DbType::Int16, "SMALLINT")
        .set(DbType::Int32, "INTEGER")
        .set(DbType::Int64, "BIGINT")
        .set(DbType::Single, "REAL")
        .set(DbType::StringFixedLength, "GRAPHIC(128) CCSID 1200")
        .set_sized(DbType::StringFixedLength, 128, "GRAPHIC($size) CCSID 1200")
        .set(DbType::String, "VARGRAPHIC(8000) CCSID 1200")
        .set_sized(DbType::String, 16_336, "VARGRAPHIC($size) CCSID 1200")
        .set_sized(DbType::String, 1_073_741_823, "DBCLOB($size) CCSID 1200")
        .set(DbType::Time, "TIME")
        .set(DbType::Xml, "XML");
    map
}

#[derive(Debug, Clone)]
pub struct Db2Column {
    quoter: Db2Quoter,
    type_map: TypeMap,
}

impl ColumnFormatter for Db2Column {
    fn quoter(&self) -> &dyn Quoter {
        &self.quoter
    }

    fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    /// Generated columns are always materialized.
    fn format_computed(&self, column: &ColumnDefinition) -> Result<String> {
        let data_type = self.format_type(column)?;
        let clause = format!(
            "GENERATED ALWAYS AS ({})",
            column.expression.as_deref().unwrap_or_default()
        );
        Ok(if data_type.is_empty() {
            clause
        } else {
            format!("{} {}", data_type, clause)
        })
    }

    fn format_identity(&self, column: &ColumnDefinition) -> String {
        if !column.identity {
            return String::new();
        }
        format!(
            "GENERATED BY DEFAULT AS IDENTITY (START WITH {} INCREMENT BY {})",
            column.features.int(features::IDENTITY_SEED).unwrap_or(1),
            column.features.int(features::IDENTITY_INCREMENT).unwrap_or(1)
        )
    }
}

pub struct Db2Generator {
    options: GeneratorOptions,
    quoter: Db2Quoter,
    column: Db2Column,
    describer: CommentDescriptions<Db2Quoter>,
}

impl Db2Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            quoter: Db2Quoter,
            column: Db2Column {
                quoter: Db2Quoter,
                type_map: type_map(),
            },
            describer: CommentDescriptions::new(Db2Quoter),
        }
    }
}

impl Default for Db2Generator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl Generator for Db2Generator {
    fn dialect(&self) -> DialectKind {
        DialectKind::Db2
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

    fn supports_drop_if_exists(&self) -> bool {
        false
    }

    fn supports_computed(&self, stored: bool) -> bool {
        stored
    }

    fn supports_referential_action(&self, on_update: bool, action: ReferentialAction) -> bool {
        if on_update {
            action == ReferentialAction::Restrict
        } else {
            action != ReferentialAction::SetDefault
        }
    }

    fn delete_schema(&self, expression: &DeleteSchema) -> Result<String> {
        Ok(format!(
            "DROP SCHEMA {} RESTRICT",
            self.quoter.quote(&expression.schema_name)
        ))
    }

    fn rename_table(&self, expression: &RenameTable) -> Result<String> {
        Ok(format!(
            "RENAME TABLE {} TO {}",
            self.table_name(&expression.old_name, expression.schema_name.as_deref()),
            self.quoter.quote(&expression.new_name)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{DataRow, ForeignKeyDefinition};
    use crate::value::Value;

    fn generate(expression: impl Into<Expression>) -> String {
        Db2Generator::default().generate(&expression.into()).unwrap()
    }

    #[test]
    fn identity_states_start_and_increment() {
        let sql = generate(
            CreateTable::new("ORDERS")
                .schema("SALES")
                .column(
                    ColumnDefinition::new("ID", DbType::Int64)
                        .identity_with(1000, 10)
                        .primary_key(),
                )
                .column(ColumnDefinition::new("NOTE", DbType::String).size(200).nullable()),
        );
        assert_eq!(
            sql,
            "CREATE TABLE \"SALES\".\"ORDERS\" (\"ID\" BIGINT NOT NULL GENERATED BY DEFAULT AS IDENTITY (START WITH 1000 INCREMENT BY 10), \"NOTE\" VARGRAPHIC(200) CCSID 1200, PRIMARY KEY (\"ID\"))"
        );
    }

    #[test]
    fn computed_columns_are_materialized() {
        let column = ColumnDefinition::new("TOTAL", DbType::Decimal)
            .precision(12, 2)
            .computed("PRICE * QTY", true);
        assert_eq!(
            Db2Generator::default().column().format(&column).unwrap(),
            "\"TOTAL\" DECIMAL(12,2) GENERATED ALWAYS AS (PRICE * QTY) NOT NULL"
        );
        let virtual_column = ColumnDefinition::new("TOTAL", DbType::Int32).computed("A + B", false);
        assert!(Db2Generator::new(GeneratorOptions::strict())
            .generate(&CreateColumn::new("ORDERS", virtual_column).into())
            .is_err());
    }

    #[test]
    fn rename_and_drop_schema() {
        assert_eq!(
            generate(RenameTable::new("ORDERS", "PURCHASES")),
            "RENAME TABLE \"ORDERS\" TO \"PURCHASES\""
        );
        assert_eq!(
            generate(DeleteSchema::new("SALES")),
            "DROP SCHEMA \"SALES\" RESTRICT"
        );
    }

    #[test]
    fn timestamp_literal_uses_db2_separators() {
        let moment = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(
            Db2Quoter.quote_value(&Value::DateTime(moment)).unwrap(),
            "TIMESTAMP '2024-03-09-14.05.00'"
        );
        assert_eq!(Db2Quoter.quote_value(&Value::Bytes(vec![0xFF])).unwrap(), "BX'FF'");
    }

    #[test]
    fn booleans_insert_as_characters() {
        let sql = generate(
            InsertData::new("FLAGS")
                .row(DataRow::new().with("ID", 1).with("ACTIVE", true))
                .row(DataRow::new().with("ID", 2).with("ACTIVE", false)),
        );
        assert_eq!(
            sql,
            "INSERT INTO \"FLAGS\" (\"ID\", \"ACTIVE\") VALUES (1, '1');\n\
             INSERT INTO \"FLAGS\" (\"ID\", \"ACTIVE\") VALUES (2, '0')"
        );
    }

    #[test]
    fn comments_describe_columns() {
        let sql = generate(CreateColumn::new(
            "ORDERS",
            ColumnDefinition::new("NOTE", DbType::String)
                .nullable()
                .description("Free text"),
        ));
        assert_eq!(
            sql,
            "ALTER TABLE \"ORDERS\" ADD COLUMN \"NOTE\" VARGRAPHIC(8000) CCSID 1200;\n\
             COMMENT ON COLUMN \"ORDERS\".\"NOTE\" IS 'Free text'"
        );
    }

    #[test]
    fn on_update_only_allows_restrict() {
        let fk = ForeignKeyDefinition::new("FK_ORDERS_USERS")
            .from_table("ORDERS")
            .foreign_columns(&["USER_ID"])
            .to_table("USERS")
            .primary_columns(&["ID"])
            .on_delete(ReferentialAction::SetNull)
            .on_update(ReferentialAction::Restrict);
        assert_eq!(
            generate(CreateForeignKey::new(fk)),
            "ALTER TABLE \"ORDERS\" ADD CONSTRAINT \"FK_ORDERS_USERS\" FOREIGN KEY (\"USER_ID\") REFERENCES \"USERS\" (\"ID\") ON DELETE SET NULL ON UPDATE RESTRICT"
        );
    }
}
