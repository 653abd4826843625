//! # 连接池配置构建器模块

use crate::error::TierCacheError;
use crate::types::PoolConfig;

/// 连接池配置构建器
#[derive(Debug, Default)]
pub struct PoolConfigBuilder {
    max_connections: Option<u32>,
    acquire_timeout_secs: Option<u64>,
    busy_timeout_secs: Option<u64>,
}

impl PoolConfig {
    /// 创建连接池配置构建器
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::new()
    }
}

impl PoolConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置最大连接数
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    /// 设置获取连接超时（秒）
    pub fn acquire_timeout_secs(mut self, secs: u64) -> Self {
        self.acquire_timeout_secs = Some(secs);
        self
    }

    /// 设置数据库忙等待超时（秒）
    pub fn busy_timeout_secs(mut self, secs: u64) -> Self {
        self.busy_timeout_secs = Some(secs);
        self
    }

    /// 构建连接池配置
    pub fn build(self) -> Result<PoolConfig, TierCacheError> {
        let max_connections = self
            .max_connections
            .ok_or_else(|| crate::tier_error!(config, "最大连接数必须设置"))?;
        let acquire_timeout_secs = self
            .acquire_timeout_secs
            .ok_or_else(|| crate::tier_error!(config, "连接获取超时必须设置"))?;
        let busy_timeout_secs = self
            .busy_timeout_secs
            .ok_or_else(|| crate::tier_error!(config, "忙等待超时必须设置"))?;

        if max_connections == 0 {
            return Err(crate::tier_error!(config, "最大连接数不能为零"));
        }
        if acquire_timeout_secs == 0 {
            return Err(crate::tier_error!(config, "连接获取超时不能为零"));
        }

        Ok(PoolConfig {
            max_connections,
            acquire_timeout_secs,
            busy_timeout_secs,
        })
    }
}
