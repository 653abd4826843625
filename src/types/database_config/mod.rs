use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 持久化存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 连接配置
    pub connection: ConnectionConfig,
    /// 连接池配置
    pub pool: PoolConfig,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectionConfig {
    /// SQLite 数据库文件，`:memory:` 表示内存数据库
    Sqlite {
        /// 数据库文件路径
        path: String,
        /// 是否创建数据库文件（如果不存在）
        create_if_missing: bool,
    },
}

impl ConnectionConfig {
    pub fn is_memory(&self) -> bool {
        match self {
            ConnectionConfig::Sqlite { path, .. } => path == ":memory:",
        }
    }
}

/// 连接池配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// 最大连接数（内存数据库强制为1）
    pub max_connections: u32,
    /// 获取连接超时（秒）
    pub acquire_timeout_secs: u64,
    /// 数据库忙等待超时（秒）
    pub busy_timeout_secs: u64,
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}
