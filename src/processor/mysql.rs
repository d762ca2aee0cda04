use chrono::{NaiveDate, NaiveDateTime};
use mysql::consts::ColumnType;
use mysql::prelude::Queryable;
use mysql::{Pool, Row, Value as MySqlValue};
use sea_query::{MysqlQueryBuilder, QueryStatementWriter};

use crate::definition::DataRow;
use crate::error::Result;
use crate::expression::PerformDbOperation;
use crate::generator::{DialectKind, Generator, GeneratorConfig};
use crate::processor::{select_all_query, Processor};
use crate::value::Value;

/// Checks a connection out of the pool for every call.
pub struct MySqlProcessor {
    pool: Pool,
    generator: Box<dyn Generator>,
}

impl MySqlProcessor {
    pub fn new(pool: Pool) -> Self {
        Self::with_generator(pool, GeneratorConfig::new(DialectKind::MySql).build())
    }

    pub fn with_generator(pool: Pool, generator: Box<dyn Generator>) -> Self {
        Self { pool, generator }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

fn to_value(value: &MySqlValue, column_type: ColumnType) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Int(v) => Value::Int(*v),
        MySqlValue::UInt(v) => i64::try_from(*v)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Decimal(v.to_string())),
        MySqlValue::Float(v) => Value::Float((*v).into()),
        MySqlValue::Double(v) => Value::Float(*v),
        MySqlValue::Bytes(bytes) => from_text(bytes, column_type),
        MySqlValue::Date(year, month, day, hour, minute, second, micros) => {
            let date = NaiveDate::from_ymd_opt((*year).into(), (*month).into(), (*day).into());
            match date.and_then(|d| {
                d.and_hms_micro_opt((*hour).into(), (*minute).into(), (*second).into(), *micros)
            }) {
                Some(datetime) if (*hour, *minute, *second, *micros) == (0, 0, 0, 0) => {
                    Value::Date(datetime.date())
                }
                Some(datetime) => Value::DateTime(datetime),
                None => Value::Null,
            }
        }
        MySqlValue::Time(negative, days, hours, minutes, seconds, _) => Value::String(format!(
            "{}{:02}:{:02}:{:02}",
            if *negative { "-" } else { "" },
            u32::from(*hours) + days * 24,
            minutes,
            seconds
        )),
    }
}

// The text protocol sends every non-NULL value as bytes; the column type
// says how to read them back.
fn from_text(bytes: &[u8], column_type: ColumnType) -> Value {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return Value::Bytes(bytes.to_vec());
    };
    let parsed = match column_type {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => Some(
            text.parse()
                .map(Value::Int)
                .unwrap_or_else(|_| Value::Decimal(text.to_string())),
        ),
        ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => {
            text.parse().ok().map(Value::Float)
        }
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
            Some(Value::Decimal(text.to_string()))
        }
        ColumnType::MYSQL_TYPE_DATE => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(Value::Date),
        ColumnType::MYSQL_TYPE_DATETIME | ColumnType::MYSQL_TYPE_TIMESTAMP => {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(Value::DateTime)
        }
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::String(text.to_string()))
}

fn to_data_row(row: &Row) -> DataRow {
    row.columns_ref()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let value = row
                .as_ref(index)
                .map(|value| to_value(value, column.column_type()))
                .unwrap_or(Value::Null);
            (column.name_str().into_owned(), value)
        })
        .collect()
}

impl Processor for MySqlProcessor {
    fn generator(&self) -> &dyn Generator {
        self.generator.as_ref()
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        let mut conn = self.pool.get_conn()?;
        conn.query_drop(sql)?;
        Ok(())
    }

    fn read_table_data(&mut self, schema: Option<&str>, table: &str) -> Result<Vec<DataRow>> {
        let sql = select_all_query(schema, table).to_string(MysqlQueryBuilder);
        let mut conn = self.pool.get_conn()?;
        let rows: Vec<Row> = conn.query(sql.as_str())?;
        Ok(rows.iter().map(to_data_row).collect())
    }

    fn process_perform_db_operation(&mut self, expression: &PerformDbOperation) -> Result<()> {
        expression.run(self)
    }
}
