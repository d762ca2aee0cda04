use crate::error::{MigrationError, Result};
use crate::generator::Quoter;
use crate::value::SystemMethod;

use super::SqlServerVersion;

#[derive(Debug, Clone, Copy)]
pub struct SqlServerQuoter {
    pub version: SqlServerVersion,
}

impl SqlServerQuoter {
    pub fn new(version: SqlServerVersion) -> Self {
        Self { version }
    }
}

impl Quoter for SqlServerQuoter {
    fn dialect(&self) -> &'static str {
        self.version.name()
    }

    fn open_quote(&self) -> &'static str {
        "["
    }

    fn close_quote(&self) -> &'static str {
        "]"
    }

    fn close_quote_escape(&self) -> &'static str {
        "]]"
    }

    /// 2000 has owners rather than schemas and leaves the name unqualified.
    fn quote_schema_name(&self, schema: Option<&str>) -> String {
        match schema.filter(|s| !s.is_empty()) {
            Some(schema) => self.quote(schema),
            None if self.version >= SqlServerVersion::V2005 => self.quote("dbo"),
            None => String::new(),
        }
    }

    /// Indexes belong to their table; the schema is never prefixed.
    fn quote_index_name(&self, index: &str, _schema: Option<&str>) -> String {
        self.quote(index)
    }

    fn format_string(&self, value: &str) -> String {
        format!("N'{}'", value.replace('\'', "''"))
    }

    fn format_system_method(&self, method: SystemMethod) -> Result<String> {
        let unsupported = || {
            Err(MigrationError::unsupported(
                self.dialect(),
                format!("The {} system method", method.name()),
            ))
        };
        Ok(match method {
            SystemMethod::NewGuid => "NEWID()",
            SystemMethod::NewSequentialId if self.version >= SqlServerVersion::V2005 => {
                "NEWSEQUENTIALID()"
            }
            SystemMethod::CurrentDateTime => "GETDATE()",
            SystemMethod::CurrentUtcDateTime => "GETUTCDATE()",
            SystemMethod::CurrentDateTimeOffset if self.version >= SqlServerVersion::V2008 => {
                "SYSDATETIMEOFFSET()"
            }
            SystemMethod::CurrentUser => "CURRENT_USER",
            SystemMethod::NewSequentialId | SystemMethod::CurrentDateTimeOffset => {
                return unsupported()
            }
        }
        .to_string())
    }
}
