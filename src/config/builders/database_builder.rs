//! # 持久化存储配置构建器模块

use crate::error::TierCacheError;
use crate::types::*;
use rat_logger::info;

/// 持久化存储配置构建器
#[derive(Debug, Default)]
pub struct DatabaseConfigBuilder {
    connection: Option<ConnectionConfig>,
    pool: Option<PoolConfig>,
}

impl DatabaseConfig {
    /// 创建持久化存储配置构建器
    pub fn builder() -> DatabaseConfigBuilder {
        DatabaseConfigBuilder::new()
    }
}

impl DatabaseConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置连接配置
    pub fn connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = Some(connection);
        self
    }

    /// 设置连接池配置
    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.pool = Some(pool);
        self
    }

    /// 构建持久化存储配置
    pub fn build(self) -> Result<DatabaseConfig, TierCacheError> {
        let connection = self
            .connection
            .ok_or_else(|| crate::tier_error!(config, "连接配置必须设置"))?;
        let pool = self
            .pool
            .ok_or_else(|| crate::tier_error!(config, "连接池配置必须设置"))?;

        let ConnectionConfig::Sqlite { path, .. } = &connection;
        if path.is_empty() {
            return Err(crate::tier_error!(config, "SQLite数据库路径不能为空"));
        }

        info!("创建持久化存储配置: 路径={}", path);
        Ok(DatabaseConfig { connection, pool })
    }
}
