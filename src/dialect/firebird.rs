use std::borrow::Cow;
use std::collections::HashSet;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::definition::{ColumnDefinition, ColumnModification, DbType, IndexOrder};
use crate::error::{MigrationError, Result};
use crate::expression::*;
use crate::generator::quoter::hex;
use crate::generator::{
    ColumnFormatter, ColumnStep, DescriptionGenerator, DialectKind, FirebirdOptions, Generator,
    GeneratorOptions, NoDescriptions, Quoter, Truncator, TypeMap,
};
use crate::value::SystemMethod;

const NAME: &str = "firebird";

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_$]*$").unwrap());

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ACTIVE", "ADD", "ADMIN", "AFTER", "ALL", "ALTER", "AND", "ANY", "AS", "ASC",
        "ASCENDING", "AT", "AUTO", "AVG", "BEFORE", "BEGIN", "BETWEEN", "BIGINT", "BIT_LENGTH",
        "BLOB", "BOOLEAN", "BOTH", "BY", "CASE", "CAST", "CHAR", "CHAR_LENGTH", "CHARACTER",
        "CHARACTER_LENGTH", "CHECK", "CLOSE", "COLLATE", "COLUMN", "COMMIT", "COMMITTED",
        "COMPUTED", "CONDITIONAL", "CONNECT", "CONSTRAINT", "CONTAINING", "COUNT", "CREATE",
        "CROSS", "CSTRING", "CURRENT", "CURRENT_CONNECTION", "CURRENT_DATE", "CURRENT_ROLE",
        "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_TRANSACTION", "CURRENT_USER", "CURSOR",
        "DATABASE", "DATE", "DAY", "DEC", "DECIMAL", "DECLARE", "DEFAULT", "DELETE",
        "DELETING", "DESC", "DESCENDING", "DISCONNECT", "DISTINCT", "DO", "DOMAIN", "DOUBLE",
        "DROP", "ELSE", "END", "ENTRY_POINT", "ESCAPE", "EXCEPTION", "EXECUTE", "EXISTS",
        "EXIT", "EXTERNAL", "EXTRACT", "FALSE", "FETCH", "FILE", "FILTER", "FLOAT", "FOR",
        "FOREIGN", "FROM", "FULL", "FUNCTION", "GDSCODE", "GENERATOR", "GEN_ID", "GLOBAL",
        "GRANT", "GROUP", "HAVING", "HOUR", "IF", "IN", "INACTIVE", "INDEX", "INNER",
        "INPUT_TYPE", "INSENSITIVE", "INSERT", "INSERTING", "INT", "INTEGER", "INTO", "IS",
        "ISOLATION", "JOIN", "KEY", "LEADING", "LEFT", "LENGTH", "LEVEL", "LIKE", "LONG",
        "LOWER", "MAX", "MAXIMUM_SEGMENT", "MERGE", "MIN", "MINUTE", "MODULE_NAME", "MONTH",
        "NATIONAL", "NATURAL", "NCHAR", "NO", "NOT", "NULL", "NUMERIC", "OCTET_LENGTH", "OF",
        "OFFSET", "ON", "ONLY", "OPEN", "OPTION", "OR", "ORDER", "OUTER", "PARAMETER",
        "PASSWORD", "PLAN", "POSITION", "POST_EVENT", "PRECISION", "PRIMARY", "PROCEDURE",
        "PROTECTED", "RDB$DB_KEY", "READ", "REAL", "RECORD_VERSION", "RECREATE", "RECURSIVE",
        "REFERENCES", "RELEASE", "RETURN", "RETURNING_VALUES", "RETURNS", "REVOKE", "RIGHT",
        "ROLLBACK", "ROW", "ROW_COUNT", "ROWS", "SAVEPOINT", "SCROLL", "SECOND", "SELECT",
        "SENSITIVE", "SET", "SHADOW", "SIMILAR", "SINGULAR", "SIZE", "SMALLINT", "SNAPSHOT",
        "SOME", "SORT", "SQLCODE", "STABILITY", "START", "STARTING", "STARTS", "STATEMENT",
        "SUM", "TABLE", "THEN", "TIME", "TIMESTAMP", "TO", "TRAILING", "TRANSACTION",
        "TRIGGER", "TRIM", "TRUE", "TYPE", "UNCOMMITTED", "UNION", "UNIQUE", "UNKNOWN",
        "UPDATE", "UPDATING", "UPPER", "USER", "USING", "VALUE", "VALUES", "VARCHAR",
        "VARIABLE", "VARYING", "VIEW", "WAIT", "WHEN", "WHERE", "WHILE", "WITH", "WORK",
        "WRITE", "YEAR",
    ]
    .into_iter()
    .collect()
});

/// Quotes only identifiers that would otherwise be misread: keywords and
/// names outside `[A-Za-z][A-Za-z0-9_$]*`. Unquoted names are folded to
/// upper case by the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirebirdQuoter {
    pub force_quote: bool,
}

impl FirebirdQuoter {
    pub fn is_keyword(name: &str) -> bool {
        KEYWORDS.contains(name.to_ascii_uppercase().as_str())
    }

    /// The name as the system tables store it.
    fn catalog_name(&self, name: &str) -> String {
        if self.should_quote(name) {
            name.to_string()
        } else {
            name.to_ascii_uppercase()
        }
    }
}

impl Quoter for FirebirdQuoter {
    fn dialect(&self) -> &'static str {
        NAME
    }

    fn should_quote(&self, name: &str) -> bool {
        self.force_quote || Self::is_keyword(name) || !PLAIN_IDENTIFIER.is_match(name)
    }

    fn quote_schema_name(&self, _schema: Option<&str>) -> String {
        String::new()
    }

    fn format_bytes(&self, value: &[u8]) -> String {
        format!("X'{}'", hex(value))
    }

    fn format_date_time(&self, value: &NaiveDateTime) -> String {
        format!("'{}'", value.format("%Y-%m-%d %H:%M:%S"))
    }

    // Guids live in CHAR(16) OCTETS columns.
    fn format_guid(&self, value: &Uuid) -> String {
        self.format_bytes(value.as_bytes())
    }

    fn format_system_method(&self, method: SystemMethod) -> Result<String> {
        match method {
            SystemMethod::NewGuid => Ok("gen_uuid()".to_string()),
            SystemMethod::CurrentDateTime => Ok("CURRENT_TIMESTAMP".to_string()),
            SystemMethod::CurrentUser => Ok("CURRENT_USER".to_string()),
            _ => Err(MigrationError::unsupported(
                NAME,
                format!("The {} system method", method.name()),
            )),
        }
    }
}

pub fn type_map() -> TypeMap {
    let mut map = TypeMap::new(NAME);
    map.set(DbType::AnsiStringFixedLength, "CHAR(255)")
        .set_sized(DbType::AnsiStringFixedLength, 32_767, "CHAR($size)")
        .set(DbType::AnsiString, "VARCHAR(255)")
        .set_sized(DbType::AnsiString, 32_765, "VARCHAR($size)")
        .set_sized(DbType::AnsiString, i32::MAX as u32, "BLOB SUB_TYPE TEXT")
        .set(DbType::Binary, "BLOB SUB_TYPE BINARY")
        .set_sized(DbType::Binary, i32::MAX as u32, "BLOB SUB_TYPE BINARY")
        .set(DbType::Boolean, "SMALLINT")
        .set(DbType::Byte, "SMALLINT")
        .set(DbType::Currency, "DECIMAL(18,4)")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "TIMESTAMP")
        .set(DbType::DateTime2, "TIMESTAMP")
        .set(DbType::Decimal, "DECIMAL(18,4)")
        .set_sized(DbType::Decimal, 18, "DECIMAL($size,$precision)")
        .set(DbType::Double, "DOUBLE PRECISION")
        .set(DbType::Guid, "CHAR(16) CHARACTER SET OCTETS")
        .set(DbType::Int16, "SMALLINT")
        .set(DbType::Int32, "INTEGER")
        .set(DbType::Int64, "BIGINT")
        .set(DbType::Single, "FLOAT")
        .set(DbType::StringFixedLength, "CHAR(255)")
        .set_sized(DbType::StringFixedLength, 32_767, "CHAR($size)")
        .set(DbType::String, "VARCHAR(255)")
        .set_sized(DbType::String, 32_765, "VARCHAR($size)")
        .set_sized(DbType::String, i32::MAX as u32, "BLOB SUB_TYPE TEXT")
        .set(DbType::Time, "TIME")
        .set(DbType::Xml, "BLOB SUB_TYPE TEXT");
    map
}

const STEPS: &[ColumnStep] = &[
    ColumnStep::Name,
    ColumnStep::Type,
    ColumnStep::DefaultValue,
    ColumnStep::Nullable,
    ColumnStep::PrimaryKey,
    ColumnStep::Identity,
];

/// Identity columns render nothing; auto numbering needs a generator and
/// trigger created separately.
#[derive(Debug, Clone)]
pub struct FirebirdColumn {
    quoter: FirebirdQuoter,
    type_map: TypeMap,
}

impl ColumnFormatter for FirebirdColumn {
    fn quoter(&self) -> &dyn Quoter {
        &self.quoter
    }

    fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    fn steps(&self) -> &[ColumnStep] {
        STEPS
    }

    fn format_computed(&self, column: &ColumnDefinition) -> Result<String> {
        Ok(format!(
            "COMPUTED BY ({})",
            column.expression.as_deref().unwrap_or_default()
        ))
    }

    fn format_nullable(&self, column: &ColumnDefinition) -> String {
        if column.is_computed() {
            return String::new();
        }
        match (column.nullable, column.modification) {
            (Some(false), _) | (None, ColumnModification::Create) => "NOT NULL".to_string(),
            _ => String::new(),
        }
    }

    fn format_identity(&self, _column: &ColumnDefinition) -> String {
        String::new()
    }
}

pub struct FirebirdGenerator {
    options: GeneratorOptions,
    quoter: FirebirdQuoter,
    column: FirebirdColumn,
    truncator: Truncator,
}

impl FirebirdGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        let FirebirdOptions {
            max_name_length,
            truncate_names,
            pack_key_names,
            force_quote,
        } = options.firebird.clone();
        let quoter = FirebirdQuoter { force_quote };
        let mut truncator = Truncator::new(NAME, max_name_length);
        truncator.truncate_names = truncate_names;
        truncator.pack_key_names = pack_key_names;
        Self {
            options,
            quoter,
            column: FirebirdColumn {
                quoter,
                type_map: type_map(),
            },
            truncator,
        }
    }

    /// Drops the column's default only when the catalog says it has one.
    fn drop_default_block(&self, table: &str, table_name: &str, column: &str) -> String {
        let statement = format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
            table,
            self.quoter.quote_column_name(column)
        );
        format!(
            "EXECUTE BLOCK AS BEGIN IF (EXISTS(SELECT 1 FROM RDB$RELATION_FIELDS \
             WHERE RDB$RELATION_NAME = {} AND RDB$FIELD_NAME = {} \
             AND RDB$DEFAULT_SOURCE IS NOT NULL)) THEN EXECUTE STATEMENT {}; END",
            self.quoter.format_string(&self.quoter.catalog_name(table_name)),
            self.quoter.format_string(&self.quoter.catalog_name(column)),
            self.quoter.format_string(&statement)
        )
    }
}

impl Default for FirebirdGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl Generator for FirebirdGenerator {
    fn dialect(&self) -> DialectKind {
        DialectKind::Firebird
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

    fn supports_drop_if_exists(&self) -> bool {
        false
    }

    fn supports_computed(&self, stored: bool) -> bool {
        !stored
    }

    fn normalize<'a>(&self, expression: &'a Expression) -> Result<Cow<'a, Expression>> {
        Ok(Cow::Owned(self.truncator.apply(expression)?))
    }

    fn rename_table(&self, _expression: &RenameTable) -> Result<String> {
        self.handle("Renaming tables")
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD"
    }

    fn alter_column(&self, expression: &AlterColumn) -> Result<String> {
        let column = self.prepare_column(&expression.owned_column())?;
        let prefix = format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            self.table_name(&expression.table_name, None),
            self.quoter.quote_column_name(&column.name)
        );

        let mut statements = Vec::new();
        if column.has_type() {
            statements.push(format!("{} TYPE {}", prefix, self.column.format_type(&column)?));
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
                self.column.format_default_literal(default)?
            ));
        }
        Ok(self.join(statements))
    }

    fn delete_column(&self, expression: &DeleteColumn) -> Result<String> {
        let table = self.table_name(&expression.table_name, None);
        let mut statements = Vec::new();
        for column in &expression.column_names {
            statements.push(self.drop_default_block(&table, &expression.table_name, column));
            statements.push(format!(
                "ALTER TABLE {} DROP {}",
                table,
                self.quoter.quote_column_name(column)
            ));
        }
        Ok(self.join(statements))
    }

    fn rename_column(&self, expression: &RenameColumn) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {} TO {}",
            self.table_name(&expression.table_name, None),
            self.quoter.quote_column_name(&expression.old_name),
            self.quoter.quote_column_name(&expression.new_name)
        ))
    }

    /// Firebird indexes have one direction for all columns.
    fn create_index(&self, expression: &CreateIndex) -> Result<String> {
        let index = &expression.index;
        let descending = match index.columns.first().map(|c| c.order) {
            Some(IndexOrder::Desc) if index.columns.iter().all(|c| c.order == IndexOrder::Desc) => {
                true
            }
            _ => {
                if index.columns.iter().any(|c| c.order == IndexOrder::Desc) {
                    self.degrade("Mixed index column directions")?;
                }
                false
            }
        };
        if index.clustered {
            self.degrade("Clustered indexes")?;
        }
        if !index.includes().is_empty() {
            self.degrade("Included index columns")?;
        }
        if index.filter_predicate().is_some() {
            self.degrade("Filtered indexes")?;
        }

        let columns: Vec<String> = index.columns.iter().map(|c| c.name.clone()).collect();
        Ok(format!(
            "CREATE {}{}INDEX {} ON {} ({})",
            if index.unique { "UNIQUE " } else { "" },
            if descending { "DESCENDING " } else { "" },
            self.quoter.quote(&index.name),
            self.table_name(&index.table_name, None),
            self.column_list(&columns)
        ))
    }

    /// Only `START WITH` and `INCREMENT BY` exist; other options are
    /// degraded.
    fn create_sequence(&self, expression: &CreateSequence) -> Result<String> {
        let sequence = &expression.sequence;
        let mut sql = format!(
            "CREATE SEQUENCE {}",
            self.quoter.quote_sequence_name(&sequence.name, None)
        );
        if let Some(start) = sequence.start_with {
            sql.push_str(&format!(" START WITH {}", start));
        }
        if let Some(increment) = sequence.increment {
            sql.push_str(&format!(" INCREMENT BY {}", increment));
        }
        if sequence.min_value.is_some() || sequence.max_value.is_some() {
            self.degrade("Sequence bounds")?;
        }
        if sequence.cache.is_some() {
            self.degrade("Sequence caching")?;
        }
        if sequence.cycle {
            self.degrade("Cycling sequences")?;
        }
        Ok(sql)
    }
}
