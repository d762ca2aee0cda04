use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use postgres::types::{FromSql, Type};
use postgres::Client;
use rust_decimal::Decimal;
use sea_query::{PostgresQueryBuilder, QueryStatementWriter};
use tracing::debug;
use uuid::Uuid;

use crate::definition::DataRow;
use crate::error::{MigrationError, Result};
use crate::expression::PerformDbOperation;
use crate::generator::{DialectKind, Generator, GeneratorConfig};
use crate::processor::{select_all_query, Processor};
use crate::value::Value;

pub struct PostgresProcessor {
    client: Client,
    generator: Box<dyn Generator>,
}

impl PostgresProcessor {
    pub fn new(client: Client) -> Self {
        Self::with_generator(client, GeneratorConfig::new(DialectKind::Postgres).build())
    }

    pub fn with_generator(client: Client, generator: Box<dyn Generator>) -> Self {
        Self { client, generator }
    }

    pub fn client(&mut self) -> &mut Client {
        &mut self.client
    }

    pub fn into_inner(self) -> Client {
        self.client
    }
}

/// A column left undecoded so each one can be read by its own type.
struct RawColumn<'a>(Option<&'a [u8]>);

impl<'a> FromSql<'a> for RawColumn<'a> {
    fn from_sql(_: &Type, raw: &'a [u8]) -> std::result::Result<Self, BoxError> {
        Ok(RawColumn(Some(raw)))
    }

    fn from_sql_null(_: &Type) -> std::result::Result<Self, BoxError> {
        Ok(RawColumn(None))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

type BoxError = Box<dyn std::error::Error + Sync + Send>;

fn decode<'a, T: FromSql<'a>>(ty: &Type, raw: Option<&'a [u8]>) -> Result<Option<T>> {
    Option::<T>::from_sql_nullable(ty, raw)
        .map_err(|e| MigrationError::Processor(format!("Cannot read {} column: {}", ty, e)))
}

// Types without a mapping read as NULL.
fn to_value(ty: &Type, raw: Option<&[u8]>) -> Result<Value> {
    let value = match ty.name() {
        "bool" => decode::<bool>(ty, raw)?.map(Value::Bool),
        "int2" => decode::<i16>(ty, raw)?.map(|v| Value::Int(v.into())),
        "int4" => decode::<i32>(ty, raw)?.map(|v| Value::Int(v.into())),
        "int8" => decode::<i64>(ty, raw)?.map(Value::Int),
        "float4" => decode::<f32>(ty, raw)?.map(|v| Value::Float(v.into())),
        "float8" => decode::<f64>(ty, raw)?.map(Value::Float),
        "numeric" => decode::<Decimal>(ty, raw)?.map(|v| Value::Decimal(v.to_string())),
        "text" | "varchar" | "bpchar" | "name" => decode::<String>(ty, raw)?.map(Value::String),
        "bytea" => decode::<Vec<u8>>(ty, raw)?.map(Value::Bytes),
        "uuid" => decode::<Uuid>(ty, raw)?.map(Value::Guid),
        "date" => decode::<NaiveDate>(ty, raw)?.map(Value::Date),
        "timestamp" => decode::<NaiveDateTime>(ty, raw)?.map(Value::DateTime),
        "timestamptz" => decode::<DateTime<Utc>>(ty, raw)?.map(|v| Value::DateTimeOffset(v.into())),
        other => {
            debug!(column_type = other, "unmapped column type read as null");
            None
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

impl Processor for PostgresProcessor {
    fn generator(&self) -> &dyn Generator {
        self.generator.as_ref()
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.client.batch_execute(sql)?;
        Ok(())
    }

    fn read_table_data(&mut self, schema: Option<&str>, table: &str) -> Result<Vec<DataRow>> {
        let sql = select_all_query(schema, table).to_string(PostgresQueryBuilder);
        let mut rows = Vec::new();
        for row in self.client.query(sql.as_str(), &[])? {
            let mut data = DataRow::new();
            for (index, column) in row.columns().iter().enumerate() {
                let raw: RawColumn = row.try_get(index)?;
                data.push(column.name(), to_value(column.type_(), raw.0)?);
            }
            rows.push(data);
        }
        Ok(rows)
    }

    fn process_perform_db_operation(&mut self, expression: &PerformDbOperation) -> Result<()> {
        expression.run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn integers_and_nulls() {
        assert_eq!(to_value(&Type::INT4, Some(&[0_u8, 0, 0, 42][..])).unwrap(), Value::Int(42));
        assert_eq!(to_value(&Type::INT4, None).unwrap(), Value::Null);
    }

    #[test]
    fn uuids_are_guids() {
        let id = Uuid::parse_str("6f9619ff-8b86-d011-b42d-00c04fc964ff").unwrap();
        let value = to_value(&Type::UUID, Some(&id.as_bytes()[..])).unwrap();
        assert_eq!(value, Value::Guid(id));
        assert!(Value::Guid(id).matches(&value));
    }

    #[test]
    fn dates_and_timestamps() {
        // Days and microseconds since 2000-01-01.
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            to_value(&Type::DATE, Some(&8766_i32.to_be_bytes()[..])).unwrap(),
            Value::Date(date)
        );

        let micros = 1_000_000_i64.to_be_bytes();
        let moment = NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 1)
            .unwrap();
        assert_eq!(
            to_value(&Type::TIMESTAMP, Some(&micros[..])).unwrap(),
            Value::DateTime(moment)
        );
        assert_eq!(
            to_value(&Type::TIMESTAMPTZ, Some(&micros[..])).unwrap(),
            Value::DateTimeOffset(moment.and_utc().with_timezone(&FixedOffset::east_opt(0).unwrap()))
        );
    }

    #[test]
    fn numerics_keep_their_digits() {
        // ndigits 2, weight 0, positive, dscale 2: 12 and .5000
        let raw: [u8; 12] = [0, 2, 0, 0, 0, 0, 0, 2, 0, 12, 0x13, 0x88];
        let value = to_value(&Type::NUMERIC, Some(&raw[..])).unwrap();
        assert!(matches!(value, Value::Decimal(_)));
        assert!(Value::Float(12.5).matches(&value));
    }

    #[test]
    fn unmapped_types_read_as_null() {
        assert_eq!(to_value(&Type::JSON, Some(&b"{}"[..])).unwrap(), Value::Null);
    }
}
