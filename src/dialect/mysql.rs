use crate::definition::{ColumnDefinition, ConstraintKind, DbType, ReferentialAction};
use crate::error::{MigrationError, Result};
use crate::expression::*;
use crate::generator::{
    ColumnFormatter, ColumnStep, DescriptionGenerator, DialectKind, Generator, GeneratorOptions,
    NoDescriptions, Quoter, TypeMap,
};
use crate::value::SystemMethod;

const NAME: &str = "mysql";

const STEPS: &[ColumnStep] = &[
    ColumnStep::Name,
    ColumnStep::Type,
    ColumnStep::Nullable,
    ColumnStep::DefaultValue,
    ColumnStep::PrimaryKey,
    ColumnStep::Identity,
    ColumnStep::Description,
];

/// Backtick identifiers. Schemas are databases in MySQL and are left off.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlQuoter;

impl Quoter for MySqlQuoter {
    fn dialect(&self) -> &'static str {
        NAME
    }

    fn open_quote(&self) -> &'static str {
        "`"
    }

    fn close_quote(&self) -> &'static str {
        "`"
    }

    fn close_quote_escape(&self) -> &'static str {
        "``"
    }

    fn quote_schema_name(&self, _schema: Option<&str>) -> String {
        String::new()
    }

    fn format_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }

    fn format_system_method(&self, method: SystemMethod) -> Result<String> {
        Ok(match method {
            SystemMethod::NewGuid => "(UUID())",
            SystemMethod::CurrentDateTime => "CURRENT_TIMESTAMP",
            SystemMethod::CurrentUtcDateTime => "(UTC_TIMESTAMP())",
            SystemMethod::CurrentUser => "(CURRENT_USER())",
            SystemMethod::NewSequentialId | SystemMethod::CurrentDateTimeOffset => {
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
        .set_sized(DbType::AnsiString, 65_535, "VARCHAR($size)")
        .set_sized(DbType::AnsiString, 16_777_215, "MEDIUMTEXT")
        .set_sized(DbType::AnsiString, u32::MAX, "LONGTEXT")
        .set(DbType::Binary, "LONGBLOB")
        .set_sized(DbType::Binary, 255, "TINYBLOB")
        .set_sized(DbType::Binary, 65_535, "BLOB")
        .set_sized(DbType::Binary, 16_777_215, "MEDIUMBLOB")
        .set_sized(DbType::Binary, u32::MAX, "LONGBLOB")
        .set(DbType::Boolean, "TINYINT(1)")
        .set(DbType::Byte, "TINYINT UNSIGNED")
        .set(DbType::Currency, "DECIMAL(19,4)")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "DATETIME")
        .set(DbType::DateTime2, "DATETIME(6)")
        .set(DbType::Decimal, "DECIMAL(19,5)")
        .set_sized(DbType::Decimal, 65, "DECIMAL($size,$precision)")
        .set(DbType::Double, "DOUBLE")
        .set(DbType::Guid, "CHAR(36)")
        .set(DbType::Int16, "SMALLINT")
        .set(DbType::Int32, "INTEGER")
        .set(DbType::Int64, "BIGINT")
        .set(DbType::Single, "FLOAT")
        .set(DbType::StringFixedLength, "NCHAR(255)")
        .set_sized(DbType::StringFixedLength, 255, "NCHAR($size)")
        .set(DbType::String, "VARCHAR(255)")
        .set_sized(DbType::String, 16_383, "VARCHAR($size)")
        .set_sized(DbType::String, 16_777_215, "MEDIUMTEXT")
        .set_sized(DbType::String, u32::MAX, "LONGTEXT")
        .set(DbType::Time, "TIME")
        .set(DbType::Xml, "TEXT");
    map
}

#[derive(Debug, Clone)]
pub struct MySqlColumn {
    quoter: MySqlQuoter,
    type_map: TypeMap,
}

impl ColumnFormatter for MySqlColumn {
    fn quoter(&self) -> &dyn Quoter {
        &self.quoter
    }

    fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    fn steps(&self) -> &[ColumnStep] {
        STEPS
    }

    fn format_identity(&self, column: &ColumnDefinition) -> String {
        if column.identity {
            "AUTO_INCREMENT".to_string()
        } else {
            String::new()
        }
    }

    fn format_description(&self, column: &ColumnDefinition) -> Result<String> {
        Ok(match column.description.as_deref().filter(|d| !d.is_empty()) {
            Some(description) => format!("COMMENT {}", self.quoter.format_string(description)),
            None => String::new(),
        })
    }
}

/// Descriptions travel inline with the column and table definitions, so
/// the separate description generator is a no-op.
pub struct MySqlGenerator {
    options: GeneratorOptions,
    quoter: MySqlQuoter,
    column: MySqlColumn,
}

impl MySqlGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            quoter: MySqlQuoter,
            column: MySqlColumn {
                quoter: MySqlQuoter,
                type_map: type_map(),
            },
        }
    }
}

impl Default for MySqlGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl Generator for MySqlGenerator {
    fn dialect(&self) -> DialectKind {
        DialectKind::MySql
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

    /// InnoDB rejects `SET DEFAULT`.
    fn supports_referential_action(&self, _on_update: bool, action: ReferentialAction) -> bool {
        action != ReferentialAction::SetDefault
    }

    fn table_options(&self, expression: &CreateTable) -> Result<String> {
        let mut options = String::from(" ENGINE = INNODB");
        if let Some(description) = expression.description.as_deref().filter(|d| !d.is_empty()) {
            options.push_str(&format!(" COMMENT {}", self.quoter.format_string(description)));
        }
        Ok(options)
    }

    fn alter_table(&self, expression: &AlterTable) -> Result<String> {
        match expression.description.as_deref().filter(|d| !d.is_empty()) {
            Some(description) => Ok(format!(
                "ALTER TABLE {} COMMENT {}",
                self.table_name(&expression.table_name, None),
                self.quoter.format_string(description)
            )),
            None => Ok(String::new()),
        }
    }

    fn rename_table(&self, expression: &RenameTable) -> Result<String> {
        Ok(format!(
            "RENAME TABLE {} TO {}",
            self.table_name(&expression.old_name, None),
            self.quoter.quote(&expression.new_name)
        ))
    }

    /// A typed alteration restates the whole column with `MODIFY COLUMN`;
    /// an untyped one can only change the default.
    fn alter_column(&self, expression: &AlterColumn) -> Result<String> {
        let column = self.prepare_column(&expression.owned_column())?;
        let table = self.table_name(&expression.table_name, None);
        if column.has_type() {
            return Ok(format!(
                "ALTER TABLE {} MODIFY COLUMN {}",
                table,
                self.column.format(&column)?
            ));
        }
        if column.nullable.is_some() {
            self.degrade("Changing nullability without a column type")?;
        }
        match &column.default {
            Some(default) => Ok(format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {}",
                table,
                self.quoter.quote_column_name(&column.name),
                self.column.format_default_literal(default)?
            )),
            None => Ok(String::new()),
        }
    }

    fn delete_index(&self, expression: &DeleteIndex) -> Result<String> {
        let index = &expression.index;
        Ok(format!(
            "DROP INDEX {} ON {}",
            self.quoter.quote(&index.name),
            self.table_name(&index.table_name, None)
        ))
    }

    fn delete_constraint(&self, expression: &DeleteConstraint) -> Result<String> {
        let constraint = &expression.constraint;
        let table = self.table_name(&constraint.table_name, None);
        Ok(match constraint.kind {
            ConstraintKind::PrimaryKey => format!("ALTER TABLE {} DROP PRIMARY KEY", table),
            ConstraintKind::Unique => format!(
                "ALTER TABLE {} DROP INDEX {}",
                table,
                self.quoter.quote_constraint_name(&constraint.name)
            ),
        })
    }

    fn delete_foreign_key(&self, expression: &DeleteForeignKey) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.table_name(&expression.table_name, None),
            self.quoter
                .quote_constraint_name(&expression.foreign_key.name)
        ))
    }
}
