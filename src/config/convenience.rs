//! # 便利配置函数模块
//!
//! 提供常用配置的便利函数，默认值沿用写穿透缓存演示环境的取值

use crate::config::core::{LogLevel, LoggingConfig, TierCacheConfig};
use crate::error::TierCacheResult;
use crate::table::TableSchema;
use crate::types::*;

/// 默认缓存存活时间：10 分钟
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// 默认分块写入大小
pub const DEFAULT_WRITE_BATCH_SIZE: usize = 50;

/// 默认连接池配置：20 秒忙等待
pub fn default_pool_config() -> PoolConfig {
    PoolConfig {
        max_connections: 4,
        acquire_timeout_secs: 5,
        busy_timeout_secs: 20,
    }
}

/// 默认缓存配置：进程内缓存，TTL 600 秒
pub fn default_cache_config() -> CacheConfig {
    CacheConfig {
        enabled: true,
        backend: CacheBackend::Memory,
        ttl_secs: DEFAULT_CACHE_TTL_SECS,
        max_capacity: 100_000,
        max_memory_mb: 128,
        cleanup_interval_secs: 60,
        key_prefixes: Vec::new(),
    }
}

/// 默认业务表：users 与 products
pub fn default_tables() -> Vec<TableSchema> {
    vec![TableSchema::users(), TableSchema::products()]
}

/// SQLite 内存数据库配置
pub fn sqlite_memory_database() -> DatabaseConfig {
    DatabaseConfig {
        connection: ConnectionConfig::Sqlite {
            path: ":memory:".to_string(),
            create_if_missing: true,
        },
        pool: default_pool_config(),
    }
}

/// 基于 SQLite 文件的完整配置，其余项使用默认值
pub fn sqlite_config<P: Into<String>>(path: P) -> TierCacheResult<TierCacheConfig> {
    let database = DatabaseConfig::builder()
        .connection(ConnectionConfig::Sqlite {
            path: path.into(),
            create_if_missing: true,
        })
        .pool(default_pool_config())
        .build()?;

    let mut builder = TierCacheConfig::builder()
        .database(database)
        .cache(default_cache_config())
        .write_batch_size(DEFAULT_WRITE_BATCH_SIZE)
        .performance_log_enabled(true)
        .logging(LoggingConfig {
            level: LogLevel::Info,
            console: true,
        });
    for table in default_tables() {
        builder = builder.table(table);
    }
    builder.build()
}

impl TierCacheConfig {
    /// 内存数据库 + 默认缓存配置，适合测试和嵌入式场景
    pub fn in_memory() -> Self {
        Self {
            database: sqlite_memory_database(),
            cache: default_cache_config(),
            write_batch_size: DEFAULT_WRITE_BATCH_SIZE,
            tables: default_tables(),
            performance_log_enabled: true,
            logging: LoggingConfig {
                level: LogLevel::Info,
                console: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_config_is_valid() {
        let config = TierCacheConfig::in_memory();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert!(config.table("users").is_some());
        assert!(config.table("products").is_some());
    }

    #[test]
    fn test_sqlite_config_builds() {
        let config = sqlite_config("data/demo_database.db").unwrap();
        assert!(!config.database.connection.is_memory());
        assert_eq!(config.write_batch_size, DEFAULT_WRITE_BATCH_SIZE);
    }
}
