use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::error::{MigrationError, Result};
use crate::value::{SystemMethod, Value};

/// Identifier and literal escaping for one dialect.
///
/// The provided methods implement ANSI double-quote identifiers and
/// single-quoted strings; dialects override the pieces that differ.
pub trait Quoter: Send + Sync {
    fn dialect(&self) -> &'static str;

    fn open_quote(&self) -> &'static str {
        "\""
    }

    fn close_quote(&self) -> &'static str {
        "\""
    }

    fn close_quote_escape(&self) -> &'static str {
        "\"\""
    }

    fn should_quote(&self, _name: &str) -> bool {
        true
    }

    fn is_quoted(&self, name: &str) -> bool {
        let (open, close) = (self.open_quote(), self.close_quote());
        name.len() >= open.len() + close.len() && name.starts_with(open) && name.ends_with(close)
    }

    fn quote(&self, name: &str) -> String {
        if name.is_empty() || self.is_quoted(name) || !self.should_quote(name) {
            return name.to_string();
        }
        format!(
            "{}{}{}",
            self.open_quote(),
            name.replace(self.close_quote(), self.close_quote_escape()),
            self.close_quote()
        )
    }

    fn unquote(&self, name: &str) -> String {
        if !self.is_quoted(name) {
            return name.to_string();
        }
        let inner = &name[self.open_quote().len()..name.len() - self.close_quote().len()];
        inner.replace(self.close_quote_escape(), self.close_quote())
    }

    fn quote_column_name(&self, name: &str) -> String {
        self.quote(name)
    }

    /// Empty when the schema is unset; dialects with a default schema
    /// override this.
    fn quote_schema_name(&self, schema: Option<&str>) -> String {
        match schema.filter(|s| !s.is_empty()) {
            Some(schema) => self.quote(schema),
            None => String::new(),
        }
    }

    fn qualify(&self, name: &str, schema: Option<&str>) -> String {
        let schema = self.quote_schema_name(schema);
        if schema.is_empty() {
            self.quote(name)
        } else {
            format!("{}.{}", schema, self.quote(name))
        }
    }

    fn quote_table_name(&self, table: &str, schema: Option<&str>) -> String {
        self.qualify(table, schema)
    }

    fn quote_index_name(&self, index: &str, schema: Option<&str>) -> String {
        self.qualify(index, schema)
    }

    fn quote_constraint_name(&self, name: &str) -> String {
        self.quote(name)
    }

    fn quote_sequence_name(&self, sequence: &str, schema: Option<&str>) -> String {
        self.qualify(sequence, schema)
    }

    fn quote_value(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(v) => self.format_bool(*v),
            Value::Int(v) => v.to_string(),
            Value::Float(v) if !v.is_finite() => {
                return Err(MigrationError::Invalid(vec![format!(
                    "Float literal {} has no SQL representation",
                    v
                )]))
            }
            Value::Float(v) => v.to_string(),
            Value::Decimal(v) => v.clone(),
            Value::String(v) => self.format_string(v),
            Value::Bytes(v) => self.format_bytes(v),
            Value::Date(v) => self.format_date(v),
            Value::DateTime(v) => self.format_date_time(v),
            Value::DateTimeOffset(v) => self.format_date_time_offset(v),
            Value::Guid(v) => self.format_guid(v),
            Value::SystemMethod(method) => return self.format_system_method(*method),
            Value::RawSql(sql) => sql.clone(),
        })
    }

    fn format_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn format_bool(&self, value: bool) -> String {
        if value { "1" } else { "0" }.to_string()
    }

    fn format_bytes(&self, value: &[u8]) -> String {
        format!("0x{}", hex(value))
    }

    fn format_date(&self, value: &NaiveDate) -> String {
        format!("'{}'", value.format("%Y-%m-%d"))
    }

    fn format_date_time(&self, value: &NaiveDateTime) -> String {
        format!("'{}'", value.format("%Y-%m-%dT%H:%M:%S"))
    }

    fn format_date_time_offset(&self, value: &DateTime<FixedOffset>) -> String {
        format!("'{}'", value.format("%Y-%m-%dT%H:%M:%S%:z"))
    }

    fn format_guid(&self, value: &Uuid) -> String {
        format!("'{}'", value)
    }

    fn format_system_method(&self, method: SystemMethod) -> Result<String> {
        Err(MigrationError::unsupported(
            self.dialect(),
            format!("The {} system method", method.name()),
        ))
    }
}

/// Uppercase hex digits, two per byte.
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AnsiQuoter;

    impl Quoter for AnsiQuoter {
        fn dialect(&self) -> &'static str {
            "ansi"
        }
    }

    #[test]
    fn quote_doubles_embedded_close_quotes() {
        assert_eq!(AnsiQuoter.quote("my\"table"), "\"my\"\"table\"");
    }

    #[test]
    fn unquote_reverses_quote() {
        for name in ["users", "my table", "a\"b", "select"] {
            assert_eq!(AnsiQuoter.unquote(&AnsiQuoter.quote(name)), name);
        }
    }

    #[test]
    fn already_quoted_names_are_left_alone() {
        assert_eq!(AnsiQuoter.quote("\"users\""), "\"users\"");
    }

    #[test]
    fn schema_is_omitted_when_unset() {
        assert_eq!(AnsiQuoter.quote_table_name("users", None), "\"users\"");
        assert_eq!(AnsiQuoter.quote_table_name("users", Some("")), "\"users\"");
        assert_eq!(
            AnsiQuoter.quote_table_name("users", Some("app")),
            "\"app\".\"users\""
        );
    }

    #[test]
    fn literal_values() {
        assert_eq!(AnsiQuoter.quote_value(&Value::Null).unwrap(), "NULL");
        assert_eq!(
            AnsiQuoter.quote_value(&"Just'in".into()).unwrap(),
            "'Just''in'"
        );
        assert_eq!(AnsiQuoter.quote_value(&Value::Int(-4)).unwrap(), "-4");
        assert_eq!(
            AnsiQuoter.quote_value(&Value::Bytes(vec![0xDE, 0xAD, 0x01])).unwrap(),
            "0xDEAD01"
        );
        assert_eq!(AnsiQuoter.quote_value(&Value::raw("now()")).unwrap(), "now()");
    }

    #[test]
    fn dates_use_iso_literals() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let datetime = date.and_hms_opt(14, 5, 0).unwrap();
        assert_eq!(AnsiQuoter.quote_value(&Value::Date(date)).unwrap(), "'2024-03-09'");
        assert_eq!(
            AnsiQuoter.quote_value(&Value::DateTime(datetime)).unwrap(),
            "'2024-03-09T14:05:00'"
        );
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = AnsiQuoter.quote_value(&Value::Float(value)).unwrap_err();
            assert!(matches!(err, MigrationError::Invalid(_)), "{}", value);
        }
        assert_eq!(AnsiQuoter.quote_value(&Value::Float(2.5)).unwrap(), "2.5");
    }

    #[test]
    fn system_methods_are_unsupported_by_default() {
        let err = AnsiQuoter
            .quote_value(&Value::SystemMethod(SystemMethod::NewGuid))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The NewGuid system method is not supported by ansi"
        );
    }
}
