//! 表结构定义模块
//!
//! 描述持久化存储中的表结构。每张表都隐含一个由存储分配的自增整数主键 `id`，
//! 标记为 `unique` 的列会在写入前做唯一性预检查。

use crate::error::TierCacheResult;
use crate::security::IdentifierValidator;
use crate::types::performance_log::PERFORMANCE_LOG_TABLE;
use crate::types::{DataValue, Record};
use serde::{Deserialize, Serialize};

mod affinity;

/// 列类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Boolean,
    Timestamp,
    /// JSON 文档，以文本存储，读取时还原为 `DataValue::Json`
    Json,
}

impl ColumnType {
    /// SQLite 声明类型
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Json => "TEXT",
        }
    }

    /// 按列的存储亲和性转换值，结果与落库后读回的值一致
    pub fn normalize(&self, value: DataValue) -> DataValue {
        affinity::normalize_value(*self, value)
    }
}

/// 列定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub unique: bool,
    /// 原样写入 DDL 的默认值表达式，例如 `0` 或 `CURRENT_TIMESTAMP`
    #[serde(default)]
    pub default: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDefinition {
    pub fn new<S: Into<String>>(name: S, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            unique: false,
            default: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value<S: Into<String>>(mut self, expr: S) -> Self {
        self.default = Some(expr.into());
        self
    }
}

/// 表结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// 需要唯一性预检查的列
    pub fn unique_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| c.unique)
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// 按列类型转换整条记录，未声明的字段原样保留
    pub fn normalize_record(&self, record: &Record) -> Record {
        record
            .iter()
            .map(|(field, value)| {
                let value = match self.get_column(field) {
                    Some(column) => column.column_type.normalize(value.clone()),
                    None => value.clone(),
                };
                (field.clone(), value)
            })
            .collect()
    }

    /// 校验表名和列名都是安全的SQL标识符
    pub fn validate(&self) -> TierCacheResult<()> {
        let validator = IdentifierValidator::new();
        validator.validate_table_name(&self.name)?;
        for column in &self.columns {
            validator.validate_column_name(&column.name)?;
        }
        Ok(())
    }

    /// 用户表：username 唯一
    pub fn users() -> Self {
        Self::new("users")
            .column(ColumnDefinition::new("username", ColumnType::Text).not_null().unique())
            .column(ColumnDefinition::new("email", ColumnType::Text).not_null())
            .column(
                ColumnDefinition::new("created_at", ColumnType::Timestamp)
                    .default_value("CURRENT_TIMESTAMP"),
            )
            .column(ColumnDefinition::new("profile_data", ColumnType::Text))
    }

    /// 商品表
    pub fn products() -> Self {
        Self::new("products")
            .column(ColumnDefinition::new("name", ColumnType::Text).not_null())
            .column(ColumnDefinition::new("price", ColumnType::Real).not_null())
            .column(ColumnDefinition::new("category", ColumnType::Text))
            .column(ColumnDefinition::new("description", ColumnType::Text))
            .column(
                ColumnDefinition::new("stock_quantity", ColumnType::Integer).default_value("0"),
            )
    }

    /// 性能日志表
    pub fn performance_log() -> Self {
        Self::new(PERFORMANCE_LOG_TABLE)
            .column(ColumnDefinition::new("operation_type", ColumnType::Text).not_null())
            .column(ColumnDefinition::new("execution_time", ColumnType::Real).not_null())
            .column(ColumnDefinition::new("cache_used", ColumnType::Boolean).default_value("FALSE"))
            .column(
                ColumnDefinition::new("timestamp", ColumnType::Timestamp)
                    .default_value("CURRENT_TIMESTAMP"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_schema_unique_columns() {
        let users = TableSchema::users();
        let unique: Vec<&str> = users.unique_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(unique, vec!["username"]);
        assert!(users.validate().is_ok());
    }

    #[test]
    fn test_invalid_column_name_rejected() {
        let schema = TableSchema::new("users")
            .column(ColumnDefinition::new("name; DROP TABLE users", ColumnType::Text));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_normalize_record_follows_column_types() {
        let record = Record::new()
            .with("id", 3)
            .with("name", "Laptop")
            .with("price", 10)
            .with("stock_quantity", 5.0)
            .with("category", 42)
            .with("extra", 1);

        let normalized = TableSchema::products().normalize_record(&record);
        assert_eq!(normalized.get("price"), Some(&DataValue::Float(10.0)));
        assert_eq!(normalized.get("stock_quantity"), Some(&DataValue::Int(5)));
        assert_eq!(normalized.get("category"), Some(&DataValue::from("42")));
        assert_eq!(normalized.get("name"), Some(&DataValue::from("Laptop")));
        // 未声明的列不做转换
        assert_eq!(normalized.get("id"), Some(&DataValue::Int(3)));
        assert_eq!(normalized.get("extra"), Some(&DataValue::Int(1)));
    }

    #[test]
    fn test_json_column_serde_name() {
        let column: ColumnDefinition =
            serde_json::from_str(r#"{"name":"settings","column_type":"json"}"#).unwrap();
        assert_eq!(column.column_type, ColumnType::Json);
        assert_eq!(column.column_type.sql_type(), "TEXT");
    }
}
