//! 快速缓存接口

use super::{MemoryCache, RatMemCacheStore};
use crate::types::{CacheBackend, CacheConfig};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// 带过期时间的键值缓存
///
/// 以 TTL `t` 写入的键在 `t` 之后必须不可读；提前淘汰是允许的，
/// 由调用方按未命中处理
#[async_trait]
pub trait FastCache: Send + Sync {
    /// 读取键，不存在或已过期返回 `None`
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// 写入键并设置过期时间
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()>;

    /// 删除单个键，返回键是否存在
    async fn delete(&self, key: &str) -> Result<bool>;

    /// 删除所有以 `prefix` 开头的键，返回删除数量
    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize>;

    /// 连通性检查，启动阶段调用
    async fn ping(&self) -> Result<()>;

    /// 主动清理已过期条目，返回清理数量
    ///
    /// 自带过期回收的后端无需实现
    async fn purge_expired(&self) -> Result<usize> {
        Ok(0)
    }

    /// 后端名称，用于日志
    fn backend_name(&self) -> &'static str;
}

/// 按配置创建缓存后端
pub async fn create_cache(config: &CacheConfig) -> Result<Arc<dyn FastCache>> {
    let cache: Arc<dyn FastCache> = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new(config.max_capacity)),
        CacheBackend::RatMemCache => Arc::new(RatMemCacheStore::new(config).await?),
    };
    Ok(cache)
}
