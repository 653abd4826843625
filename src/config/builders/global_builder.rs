//! # 全局配置构建器模块

use crate::config::core::{LoggingConfig, TierCacheConfig};
use crate::error::TierCacheError;
use crate::table::TableSchema;
use crate::types::{CacheConfig, DatabaseConfig};
use rat_logger::info;

/// 双层缓存配置构建器
#[derive(Debug, Default)]
pub struct TierCacheConfigBuilder {
    database: Option<DatabaseConfig>,
    cache: Option<CacheConfig>,
    write_batch_size: Option<usize>,
    tables: Vec<TableSchema>,
    performance_log_enabled: Option<bool>,
    logging: Option<LoggingConfig>,
}

impl TierCacheConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置持久化存储配置
    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.database = Some(database);
        self
    }

    /// 设置缓存配置
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 设置分块写入大小
    pub fn write_batch_size(mut self, size: usize) -> Self {
        self.write_batch_size = Some(size);
        self
    }

    /// 添加业务表
    pub fn table(mut self, schema: TableSchema) -> Self {
        self.tables.push(schema);
        self
    }

    /// 设置是否记录性能日志
    pub fn performance_log_enabled(mut self, enabled: bool) -> Self {
        self.performance_log_enabled = Some(enabled);
        self
    }

    /// 设置日志配置
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// 构建并校验配置
    pub fn build(self) -> Result<TierCacheConfig, TierCacheError> {
        let database = self
            .database
            .ok_or_else(|| crate::tier_error!(config, "持久化存储配置必须设置"))?;
        let cache = self
            .cache
            .ok_or_else(|| crate::tier_error!(config, "缓存配置必须设置"))?;
        let write_batch_size = self
            .write_batch_size
            .ok_or_else(|| crate::tier_error!(config, "批量写入大小必须设置"))?;
        let performance_log_enabled = self
            .performance_log_enabled
            .ok_or_else(|| crate::tier_error!(config, "性能日志选项必须设置"))?;
        let logging = self
            .logging
            .ok_or_else(|| crate::tier_error!(config, "日志配置必须设置"))?;

        let config = TierCacheConfig {
            database,
            cache,
            write_batch_size,
            tables: self.tables,
            performance_log_enabled,
            logging,
        };
        config.validate()?;

        info!(
            "创建双层缓存配置: TTL={}秒, 表数量={}, 批量大小={}",
            config.cache.ttl_secs,
            config.tables.len(),
            config.write_batch_size
        );
        Ok(config)
    }
}
