//! SQLite工具函数：参数绑定、插入语句构建与行转换

use crate::error::{TierCacheError, TierCacheResult};
use crate::security::IdentifierValidator;
use crate::table::{ColumnType, TableSchema};
use crate::types::{DataValue, Record, parse_json_string_to_data_value};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// 绑定单个参数，嵌套 JSON 以文本形式落库
pub(crate) fn bind_value<'q>(query: SqliteQuery<'q>, value: &DataValue) -> SqliteQuery<'q> {
    match value {
        DataValue::Null => query.bind(Option::<String>::None),
        DataValue::Bool(b) => query.bind(*b),
        DataValue::Int(i) => query.bind(*i),
        DataValue::Float(f) => query.bind(*f),
        DataValue::String(s) => query.bind(s.clone()),
        DataValue::Json(json) => query.bind(json.to_string()),
    }
}

/// 构建参数化插入语句，返回 SQL 与按列顺序排列的参数
pub(crate) fn build_insert_sql(
    validator: &IdentifierValidator,
    table: &str,
    record: &Record,
) -> TierCacheResult<(String, Vec<DataValue>)> {
    let table_ident = validator.safe_table_identifier(table)?;

    if record.is_empty() {
        return Ok((format!("INSERT INTO {} DEFAULT VALUES", table_ident), Vec::new()));
    }

    let mut columns = Vec::with_capacity(record.len());
    let mut values = Vec::with_capacity(record.len());
    for (field, value) in record.iter() {
        columns.push(validator.safe_column_identifier(field)?);
        values.push(value.clone());
    }
    let placeholders = vec!["?"; columns.len()].join(", ");

    Ok((
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table_ident,
            columns.join(", "),
            placeholders
        ),
        values,
    ))
}

/// 将一行数据转换为记录
///
/// 以值的实际存储类型解码。声明为 BOOLEAN 的整数列还原为布尔值；
/// 文本只有在表结构声明为 JSON 列时才还原为 `DataValue::Json`
pub(crate) fn row_to_record(
    row: &SqliteRow,
    schema: Option<&TableSchema>,
) -> TierCacheResult<Record> {
    let mut record = Record::new();

    for (idx, column) in row.columns().iter().enumerate() {
        let column_name = column.name();
        let schema_type = schema
            .and_then(|s| s.get_column(column_name))
            .map(|c| c.column_type);
        let is_boolean = schema_type == Some(ColumnType::Boolean)
            || column.type_info().name().eq_ignore_ascii_case("BOOLEAN");

        let raw = row.try_get_raw(idx).map_err(|e| TierCacheError::QueryError {
            message: format!("读取列 '{}' 失败: {}", column_name, e),
        })?;
        if raw.is_null() {
            record.insert(column_name, DataValue::Null);
            continue;
        }
        let value_type = raw.type_info().name().to_uppercase();

        let decode_err = |e: sqlx::Error| TierCacheError::QueryError {
            message: format!("解码列 '{}' 失败: {}", column_name, e),
        };

        let value = match value_type.as_str() {
            "INTEGER" | "BOOLEAN" => {
                let i: i64 = row.try_get_unchecked(idx).map_err(decode_err)?;
                if is_boolean {
                    DataValue::Bool(i != 0)
                } else {
                    DataValue::Int(i)
                }
            }
            "REAL" | "NUMERIC" => {
                let f: f64 = row.try_get_unchecked(idx).map_err(decode_err)?;
                DataValue::Float(f)
            }
            "BLOB" => {
                let bytes: Vec<u8> = row.try_get_unchecked(idx).map_err(decode_err)?;
                crate::debug_log!("列 {} 为BLOB，按UTF-8文本解码 ({} 字节)", column_name, bytes.len());
                DataValue::String(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => {
                let s: String = row.try_get_unchecked(idx).map_err(decode_err)?;
                if schema_type == Some(ColumnType::Json) {
                    parse_json_string_to_data_value(s)
                } else {
                    DataValue::String(s)
                }
            }
        };
        record.insert(column_name, value);
    }

    Ok(record)
}

/// 解析时间戳：RFC3339 或 SQLite `CURRENT_TIMESTAMP` 格式
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
