use crate::definition::DbType;
use crate::generator::TypeMap;

use super::SqlServerVersion;

const ANSI_MAX: u32 = i32::MAX as u32;
const UNICODE_MAX: u32 = ANSI_MAX / 2;

/// Each version starts from the previous version's table.
pub fn type_map(version: SqlServerVersion) -> TypeMap {
    let mut map = TypeMap::new(version.name());
    sql_server_2000(&mut map);
    if version >= SqlServerVersion::V2005 {
        sql_server_2005(&mut map);
    }
    if version >= SqlServerVersion::V2008 {
        sql_server_2008(&mut map);
    }
    map
}

fn sql_server_2000(map: &mut TypeMap) {
    map.set(DbType::AnsiStringFixedLength, "CHAR(255)")
        .set_sized(DbType::AnsiStringFixedLength, 8000, "CHAR($size)")
        .set(DbType::AnsiString, "VARCHAR(255)")
        .set_sized(DbType::AnsiString, 8000, "VARCHAR($size)")
        .set_sized(DbType::AnsiString, ANSI_MAX, "TEXT")
        .set(DbType::Binary, "VARBINARY(8000)")
        .set_sized(DbType::Binary, 8000, "VARBINARY($size)")
        .set_sized(DbType::Binary, ANSI_MAX, "IMAGE")
        .set(DbType::Boolean, "BIT")
        .set(DbType::Byte, "TINYINT")
        .set(DbType::Currency, "MONEY")
        .set(DbType::Date, "DATETIME")
        .set(DbType::DateTime, "DATETIME")
        .set(DbType::DateTime2, "DATETIME")
        .set(DbType::Decimal, "DECIMAL(19,5)")
        .set_sized(DbType::Decimal, 38, "DECIMAL($size,$precision)")
        .set(DbType::Double, "DOUBLE PRECISION")
        .set(DbType::Guid, "UNIQUEIDENTIFIER")
        .set(DbType::Int16, "SMALLINT")
        .set(DbType::Int32, "INT")
        .set(DbType::Int64, "BIGINT")
        .set(DbType::Single, "REAL")
        .set(DbType::StringFixedLength, "NCHAR(255)")
        .set_sized(DbType::StringFixedLength, 4000, "NCHAR($size)")
        .set(DbType::String, "NVARCHAR(255)")
        .set_sized(DbType::String, 4000, "NVARCHAR($size)")
        .set_sized(DbType::String, UNICODE_MAX, "NTEXT")
        .set(DbType::Time, "DATETIME")
        .set(DbType::Xml, "NTEXT");
}

fn sql_server_2005(map: &mut TypeMap) {
    map.set_sized(DbType::AnsiString, ANSI_MAX, "VARCHAR(MAX)")
        .set_sized(DbType::Binary, ANSI_MAX, "VARBINARY(MAX)")
        .set_sized(DbType::String, UNICODE_MAX, "NVARCHAR(MAX)")
        .set(DbType::Xml, "XML");
}

fn sql_server_2008(map: &mut TypeMap) {
    map.set(DbType::Date, "DATE")
        .set(DbType::Time, "TIME")
        .set(DbType::DateTime2, "DATETIME2")
        .set_sized(DbType::DateTime2, 7, "DATETIME2($size)")
        .set(DbType::DateTimeOffset, "DATETIMEOFFSET")
        .set_sized(DbType::DateTimeOffset, 7, "DATETIMEOFFSET($size)");
}
