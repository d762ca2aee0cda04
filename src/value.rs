use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use uuid::Uuid;

/// Placeholders for database functions whose spelling differs per dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemMethod {
    NewGuid,
    NewSequentialId,
    CurrentDateTime,
    CurrentUtcDateTime,
    CurrentDateTimeOffset,
    CurrentUser,
}

impl SystemMethod {
    pub fn name(&self) -> &'static str {
        match self {
            SystemMethod::NewGuid => "NewGuid",
            SystemMethod::NewSequentialId => "NewSequentialId",
            SystemMethod::CurrentDateTime => "CurrentDateTime",
            SystemMethod::CurrentUtcDateTime => "CurrentUTCDateTime",
            SystemMethod::CurrentDateTimeOffset => "CurrentDateTimeOffset",
            SystemMethod::CurrentUser => "CurrentUser",
        }
    }
}

/// A literal carried by default values, data rows and WHERE pairs.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Exact numeric kept as text so no precision is lost.
    Decimal(String),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Guid(Uuid),
    SystemMethod(SystemMethod),
    /// Emitted verbatim, never quoted.
    RawSql(String),
}

impl Value {
    pub fn raw(sql: impl Into<String>) -> Self {
        Value::RawSql(sql.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Equality used when comparing incoming rows against rows read back
    /// from a database. `NULL` matches `NULL`. Integers compare exactly,
    /// other numbers by value across the integer, float and decimal
    /// variants. Booleans match the 0/1 integers drivers store them as,
    /// and guids and dates match their canonical text or byte forms.
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(left), Value::Int(right)) => left == right,
            (Value::Bool(flag), Value::Int(_) | Value::Float(_) | Value::Decimal(_)) => {
                Value::Int(i64::from(*flag)).matches(other)
            }
            (Value::Int(_) | Value::Float(_) | Value::Decimal(_), Value::Bool(flag)) => {
                self.matches(&Value::Int(i64::from(*flag)))
            }
            (Value::Bool(flag), Value::String(text)) | (Value::String(text), Value::Bool(flag)) => {
                text.trim() == if *flag { "1" } else { "0" }
            }
            (Value::Guid(id), Value::String(text)) | (Value::String(text), Value::Guid(id)) => {
                Uuid::parse_str(text.trim()).is_ok_and(|parsed| parsed == *id)
            }
            (Value::Guid(id), Value::Bytes(bytes)) | (Value::Bytes(bytes), Value::Guid(id)) => {
                id.as_bytes().as_slice() == bytes.as_slice()
            }
            (Value::Date(date), Value::String(text)) | (Value::String(text), Value::Date(date)) => {
                NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").is_ok_and(|parsed| parsed == *date)
            }
            (Value::DateTime(at), Value::String(text))
            | (Value::String(text), Value::DateTime(at)) => parse_date_time(text) == Some(*at),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(left), Some(right)) => left == right,
                _ => self == other,
            },
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Decimal(v) => v.parse().ok(),
            _ => None,
        }
    }
}

fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text.trim(), format).ok())
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::DateTimeOffset(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Guid(value)
    }
}

impl From<SystemMethod> for Value {
    fn from(value: SystemMethod) -> Self {
        Value::SystemMethod(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
