//! 缓存管理器模块
//!
//! 串联快速缓存与持久化存储：
//! - 读穿透：缓存未命中时读取持久化存储并回填缓存
//! - 写穿透：先提交持久化存储，再写入缓存
//! - 批量写入：多条插入、一次提交
//!
//! 所有写操作在同一把管理器级互斥锁下串行执行，读操作不加锁

mod cache_ops;
mod maintenance;
mod read_ops;
mod telemetry;
mod write_ops;

pub use write_ops::{BatchFailure, BatchWriteReport, WrittenRecord};

use crate::adapter::{DurableStore, create_store};
use crate::cache::{FastCache, StatsTracker, create_cache};
use crate::config::TierCacheConfig;
use crate::error::{TierCacheError, TierCacheResult};
use crate::table::TableSchema;
use dashmap::DashMap;
use rat_logger::info;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// 双层缓存管理器
///
/// 克隆后的实例共享同一组存储、统计与写锁
#[derive(Clone)]
pub struct CacheManager {
    pub(crate) store: Arc<dyn DurableStore>,
    pub(crate) cache: Arc<dyn FastCache>,
    pub(crate) config: Arc<TierCacheConfig>,
    /// 表名到表结构的映射，用于唯一性预检查
    pub(crate) schemas: Arc<HashMap<String, TableSchema>>,
    pub(crate) stats: Arc<StatsTracker>,
    /// 写锁：串行化所有单条与批量写入
    pub(crate) write_lock: Arc<Mutex<()>>,
    /// 访问过的表，clear_cache 时按表前缀清理
    pub(crate) known_tables: Arc<DashMap<String, ()>>,
    /// 过期条目清理任务
    pub(crate) cleanup_handle: Arc<RwLock<Option<JoinHandle<()>>>>,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("cache_backend", &self.cache.backend_name())
            .field("ttl_secs", &self.config.cache.ttl_secs)
            .field("tables", &self.schemas.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CacheManager {
    /// 按配置连接缓存与持久化存储
    ///
    /// 任一层无法连接都会返回 `ConnectionError`，不做自动重试
    pub async fn connect(config: TierCacheConfig) -> TierCacheResult<Self> {
        config.validate()?;

        let cache = create_cache(&config.cache)
            .await
            .map_err(|e| TierCacheError::ConnectionError {
                message: format!("创建缓存失败: {}", e),
            })?;
        let store = create_store(&config.database).await?;

        Self::with_backends(config, store, cache).await
    }

    /// 使用外部提供的存储与缓存实例构建管理器
    pub async fn with_backends(
        config: TierCacheConfig,
        store: Arc<dyn DurableStore>,
        cache: Arc<dyn FastCache>,
    ) -> TierCacheResult<Self> {
        cache
            .ping()
            .await
            .map_err(|e| TierCacheError::ConnectionError {
                message: format!("缓存后端 {} 不可用: {}", cache.backend_name(), e),
            })?;
        store.health_check().await?;

        for schema in &config.tables {
            store.ensure_schema(schema).await?;
        }
        if config.performance_log_enabled {
            store.ensure_schema(&TableSchema::performance_log()).await?;
        }

        let schemas: HashMap<String, TableSchema> = config
            .tables
            .iter()
            .map(|schema| (schema.name.clone(), schema.clone()))
            .collect();
        let known_tables = DashMap::new();
        for name in schemas.keys() {
            known_tables.insert(name.clone(), ());
        }

        info!(
            "缓存管理器初始化成功 - 缓存后端: {}, TTL: {}秒, 表: {:?}",
            cache.backend_name(),
            config.cache.ttl_secs,
            schemas.keys().collect::<Vec<_>>()
        );

        let manager = Self {
            store,
            cache,
            config: Arc::new(config),
            schemas: Arc::new(schemas),
            stats: Arc::new(StatsTracker::new()),
            write_lock: Arc::new(Mutex::new(())),
            known_tables: Arc::new(known_tables),
            cleanup_handle: Arc::new(RwLock::new(None)),
        };

        if manager.config.cache.enabled && manager.config.cache.cleanup_interval_secs > 0 {
            manager.start_cleanup_task().await;
        }

        Ok(manager)
    }

    /// 当前配置
    pub fn config(&self) -> &TierCacheConfig {
        &self.config
    }

    pub(crate) fn remember_table(&self, table: &str) {
        if !self.known_tables.contains_key(table) {
            self.known_tables.insert(table.to_string(), ());
        }
    }
}
