//! SQL 标识符安全验证
//!
//! 表名和列名会直接拼接进 SQL 语句（参数化只覆盖值），
//! 所有标识符在使用前都必须经过这里的验证

use crate::error::{TierCacheError, TierCacheResult};

const MAX_IDENTIFIER_LEN: usize = 64;

const SQL_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER", "TABLE",
    "INDEX", "AND", "OR", "NOT", "NULL", "IS", "IN", "EXISTS", "BETWEEN", "LIKE", "UNION", "JOIN",
    "GROUP", "BY", "HAVING", "ORDER", "LIMIT", "OFFSET", "DISTINCT", "AS", "ON", "PRIMARY", "KEY",
    "FOREIGN", "REFERENCES", "CASE", "WHEN", "THEN", "ELSE", "END", "TRANSACTION", "COMMIT",
    "ROLLBACK", "VIEW", "TRIGGER", "CONSTRAINT", "VALUES", "SET",
];

/// SQLite 标识符验证器
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentifierValidator;

impl IdentifierValidator {
    pub fn new() -> Self {
        Self
    }

    /// 验证表名的安全性
    pub fn validate_table_name(&self, table_name: &str) -> TierCacheResult<()> {
        self.validate_identifier("table_name", table_name)
    }

    /// 验证列名的安全性
    pub fn validate_column_name(&self, column_name: &str) -> TierCacheResult<()> {
        self.validate_identifier("column_name", column_name)
    }

    /// 验证后返回带双引号的表标识符
    pub fn safe_table_identifier(&self, table_name: &str) -> TierCacheResult<String> {
        self.validate_table_name(table_name)?;
        Ok(format!("\"{}\"", table_name))
    }

    /// 验证后返回带双引号的列标识符
    pub fn safe_column_identifier(&self, column_name: &str) -> TierCacheResult<String> {
        self.validate_column_name(column_name)?;
        Ok(format!("\"{}\"", column_name))
    }

    fn validate_identifier(&self, kind: &str, name: &str) -> TierCacheResult<()> {
        let first = match name.chars().next() {
            Some(c) => c,
            None => {
                return Err(TierCacheError::ValidationError {
                    field: kind.to_string(),
                    message: "标识符不能为空".to_string(),
                });
            }
        };

        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(TierCacheError::ValidationError {
                field: name.to_string(),
                message: format!("标识符长度不能超过{}个字符", MAX_IDENTIFIER_LEN),
            });
        }

        if first.is_ascii_digit() {
            return Err(TierCacheError::ValidationError {
                field: name.to_string(),
                message: "标识符不能以数字开头".to_string(),
            });
        }

        for (i, ch) in name.chars().enumerate() {
            if !ch.is_ascii_alphanumeric() && ch != '_' {
                return Err(TierCacheError::ValidationError {
                    field: name.to_string(),
                    message: format!("标识符包含非法字符 '{}' 在位置 {}", ch, i),
                });
            }
        }

        let upper_name = name.to_uppercase();
        if SQL_KEYWORDS.contains(&upper_name.as_str()) {
            return Err(TierCacheError::ValidationError {
                field: name.to_string(),
                message: format!("标识符不能使用SQL关键字: {}", name),
            });
        }

        Ok(())
    }
}
