//! SQLite存储核心模块
//!
//! 负责建立连接池。文件数据库开启 WAL 与 `synchronous=NORMAL`，
//! 内存数据库只能使用单连接，否则每个连接各自拥有一个独立的库

use crate::error::{TierCacheError, TierCacheResult};
use crate::security::IdentifierValidator;
use crate::table::TableSchema;
use crate::types::{ConnectionConfig, DatabaseConfig};
use dashmap::DashMap;
use rat_logger::info;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// SQLite 持久化存储
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
    pub(crate) validator: IdentifierValidator,
    /// 已建表的结构，读取时按列类型解码
    pub(crate) schemas: Arc<DashMap<String, TableSchema>>,
}

impl SqliteStore {
    /// 连接数据库，失败时返回 `ConnectionError`
    pub async fn connect(config: &DatabaseConfig) -> TierCacheResult<Self> {
        let ConnectionConfig::Sqlite {
            path,
            create_if_missing,
        } = &config.connection;

        let (options, max_connections) = if config.connection.is_memory() {
            info!("连接SQLite内存数据库");
            let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
                TierCacheError::ConnectionError {
                    message: format!("SQLite内存数据库配置无效: {}", e),
                }
            })?;
            (options, 1)
        } else {
            let file_exists = Path::new(path).exists();
            if !file_exists && !create_if_missing {
                return Err(TierCacheError::ConnectionError {
                    message: format!("SQLite数据库文件不存在: {}", path),
                });
            }
            if !file_exists {
                if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        TierCacheError::ConnectionError {
                            message: format!("创建SQLite数据库目录失败: {}", e),
                        }
                    })?;
                }
            }

            info!("连接SQLite数据库文件: {}", path);
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(*create_if_missing)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "10000")
                .pragma("temp_store", "memory");
            (options, config.pool.max_connections.max(1))
        };

        let options = options.busy_timeout(config.pool.busy_timeout());

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(config.pool.acquire_timeout())
            // 内存数据库随连接关闭而消失，连接必须常驻
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| TierCacheError::ConnectionError {
                message: format!("SQLite连接失败: {}", e),
            })?;

        info!("SQLite连接池已建立: 最大连接数={}", max_connections);

        Ok(Self {
            pool,
            validator: IdentifierValidator::new(),
            schemas: Arc::new(DashMap::new()),
        })
    }

    /// 底层连接池
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
