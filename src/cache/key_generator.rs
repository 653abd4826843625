//! 缓存键生成
//!
//! 两层存储用同一个键定位同一条逻辑记录：`{table}:{id}`

use std::fmt;

/// 键中表名与ID之间的分隔符
pub const KEY_SEPARATOR: char = ':';

/// 由 (表名, 记录ID) 确定的缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(table: &str, id: i64) -> Self {
        Self(format!("{}{}{}", table, KEY_SEPARATOR, id))
    }

    /// 某张表所有记录键的公共前缀
    pub fn table_prefix(table: &str) -> String {
        format!("{}{}", table, KEY_SEPARATOR)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
