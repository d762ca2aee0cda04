use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::definition::{ColumnDefinition, ColumnModification, DbType, ReferentialAction};
use crate::error::{MigrationError, Result};
use crate::expression::*;
use crate::generator::quoter::hex;
use crate::generator::{
    ColumnFormatter, ColumnStep, CommentDescriptions, DescriptionGenerator, DialectKind,
    Generator, GeneratorOptions, Quoter, TypeMap,
};
use crate::value::SystemMethod;

const NAME: &str = "oracle";

const STEPS: &[ColumnStep] = &[
    ColumnStep::Name,
    ColumnStep::Type,
    ColumnStep::DefaultValue,
    ColumnStep::Identity,
    ColumnStep::Nullable,
    ColumnStep::PrimaryKey,
];

/// Schemas in Oracle are users; a table is only qualified when a schema
/// is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleQuoter;

impl Quoter for OracleQuoter {
    fn dialect(&self) -> &'static str {
        NAME
    }

    fn format_bytes(&self, value: &[u8]) -> String {
        format!("hextoraw('{}')", hex(value))
    }

    fn format_date(&self, value: &NaiveDate) -> String {
        format!("to_date('{}','yyyy-mm-dd')", value.format("%Y-%m-%d"))
    }

    fn format_date_time(&self, value: &NaiveDateTime) -> String {
        format!(
            "to_date('{}','yyyy-mm-dd hh24:mi:ss')",
            value.format("%Y-%m-%d %H:%M:%S")
        )
    }

    fn format_date_time_offset(&self, value: &DateTime<FixedOffset>) -> String {
        format!(
            "to_timestamp_tz('{}','yyyy-mm-dd hh24:mi:ss tzh:tzm')",
            value.format("%Y-%m-%d %H:%M:%S %:z")
        )
    }

    /// GUID columns are `RAW(16)`.
    fn format_guid(&self, value: &Uuid) -> String {
        self.format_bytes(value.as_bytes())
    }

    fn format_system_method(&self, method: SystemMethod) -> Result<String> {
        Ok(match method {
            SystemMethod::NewGuid => "sys_guid()",
            SystemMethod::CurrentDateTime => "LOCALTIMESTAMP",
            SystemMethod::CurrentUtcDateTime => "sys_extract_utc(SYSTIMESTAMP)",
            SystemMethod::CurrentDateTimeOffset => "CURRENT_TIMESTAMP",
            SystemMethod::CurrentUser => "USER",
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
        .set_sized(DbType::AnsiStringFixedLength, 2000, "CHAR($size)")
        .set(DbType::AnsiString, "VARCHAR2(255)")
        .set_sized(DbType::AnsiString, 4000, "VARCHAR2($size)")
        .set_sized(DbType::AnsiString, u32::MAX, "CLOB")
        .set(DbType::Binary, "RAW(2000)")
        .set_sized(DbType::Binary, 2000, "RAW($size)")
        .set_sized(DbType::Binary, u32::MAX, "BLOB")
        .set(DbType::Boolean, "NUMBER(1,0)")
        .set(DbType::Byte, "NUMBER(3,0)")
        .set(DbType::Currency, "NUMBER(19,4)")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "TIMESTAMP(4)")
        .set(DbType::DateTime2, "TIMESTAMP(7)")
        .set(DbType::DateTimeOffset, "TIMESTAMP(4) WITH TIME ZONE")
        .set(DbType::Decimal, "NUMBER(19,5)")
        .set_sized(DbType::Decimal, 38, "NUMBER($size,$precision)")
        .set(DbType::Double, "DOUBLE PRECISION")
        .set(DbType::Guid, "RAW(16)")
        .set(DbType::Int16, "NUMBER(5,0)")
        .set(DbType::Int32, "NUMBER(10,0)")
        .set(DbType::Int64, "NUMBER(19,0)")
        .set(DbType::Single, "FLOAT(24)")
        .set(DbType::StringFixedLength, "NCHAR(255)")
        .set_sized(DbType::StringFixedLength, 2000, "NCHAR($size)")
        .set(DbType::String, "NVARCHAR2(255)")
        .set_sized(DbType::String, 2000, "NVARCHAR2($size)")
        .set_sized(DbType::String, u32::MAX, "NCLOB")
        .set(DbType::Time, "DATE")
        .set(DbType::Xml, "XMLTYPE");
    map
}

#[derive(Debug, Clone)]
pub struct OracleColumn {
    quoter: OracleQuoter,
    type_map: TypeMap,
}

impl ColumnFormatter for OracleColumn {
    fn quoter(&self) -> &dyn Quoter {
        &self.quoter
    }

    fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    fn steps(&self) -> &[ColumnStep] {
        STEPS
    }

    /// `MODIFY` keeps the current nullability unless told otherwise, so an
    /// explicit nullable alteration has to say `NULL`.
    fn format_nullable(&self, column: &ColumnDefinition) -> String {
        if column.is_computed() {
            return String::new();
        }
        match (column.nullable, column.modification) {
            (Some(true), ColumnModification::Alter) => "NULL".to_string(),
            (Some(true), ColumnModification::Create) => String::new(),
            (None, ColumnModification::Alter) => String::new(),
            (Some(false), _) | (None, ColumnModification::Create) => "NOT NULL".to_string(),
        }
    }

    fn format_identity(&self, column: &ColumnDefinition) -> String {
        if column.identity {
            "GENERATED BY DEFAULT ON NULL AS IDENTITY".to_string()
        } else {
            String::new()
        }
    }
}

pub struct OracleGenerator {
    options: GeneratorOptions,
    quoter: OracleQuoter,
    column: OracleColumn,
    describer: CommentDescriptions<OracleQuoter>,
}

impl OracleGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            quoter: OracleQuoter,
            column: OracleColumn {
                quoter: OracleQuoter,
                type_map: type_map(),
            },
            describer: CommentDescriptions::new(OracleQuoter),
        }
    }

    fn modify_default(&self, table: &str, schema: Option<&str>, column: &str, default: &str) -> String {
        format!(
            "ALTER TABLE {} MODIFY {} DEFAULT {}",
            self.table_name(table, schema),
            self.quoter.quote_column_name(column),
            default
        )
    }
}

impl Default for OracleGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl Generator for OracleGenerator {
    fn dialect(&self) -> DialectKind {
        DialectKind::Oracle
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

    /// Schemas are created as users, outside of migrations.
    fn supports_schemas(&self) -> bool {
        false
    }

    fn supports_drop_if_exists(&self) -> bool {
        false
    }

    fn supports_computed(&self, stored: bool) -> bool {
        !stored
    }

    /// No `ON UPDATE` at all; `ON DELETE` takes `CASCADE` or `SET NULL`.
    fn supports_referential_action(&self, on_update: bool, action: ReferentialAction) -> bool {
        !on_update && matches!(action, ReferentialAction::Cascade | ReferentialAction::SetNull)
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD"
    }

    fn alter_column(&self, expression: &AlterColumn) -> Result<String> {
        let column = self.prepare_column(&expression.owned_column())?;
        let schema = expression.schema_name.as_deref();
        let mut statements = Vec::new();
        let definition = self.column.format(&column)?;
        // A bare name means only the description changes.
        if definition != self.quoter.quote_column_name(&column.name) {
            statements.push(format!(
                "ALTER TABLE {} MODIFY {}",
                self.table_name(&expression.table_name, schema),
                definition
            ));
        }
        if let Some(description) = column.description.as_deref().filter(|d| !d.is_empty()) {
            statements.extend(self.describer.alter_column_description(
                schema,
                &expression.table_name,
                &column.name,
                description,
            ));
        }
        Ok(self.join(statements))
    }

    fn alter_default_value(&self, expression: &AlterDefaultValue) -> Result<String> {
        let default = match &expression.default {
            Some(value) => self.column.format_default_literal(value)?,
            None => "NULL".to_string(),
        };
        Ok(self.modify_default(
            &expression.table_name,
            expression.schema_name.as_deref(),
            &expression.column_name,
            &default,
        ))
    }

    fn delete_default_constraint(&self, expression: &DeleteDefaultConstraint) -> Result<String> {
        Ok(self.modify_default(
            &expression.table_name,
            expression.schema_name.as_deref(),
            &expression.column_name,
            "NULL",
        ))
    }
}
