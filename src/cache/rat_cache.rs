//! rat_memcache 缓存后端
//!
//! 只启用 L1 内存层。过期条目由 rat_memcache 自身的 TTL 管理器回收，
//! 按前缀删除基于 `keys()` 的快照，该快照不含已过期的键

use super::store::FastCache;
use crate::types::CacheConfig;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use rat_logger::{debug, info};
use rat_memcache::types::EvictionStrategy;
use rat_memcache::{CacheOptions, RatMemCache, RatMemCacheBuilder};
use std::sync::Arc;
use std::time::Duration;

/// rat_memcache L1 缓存
#[derive(Debug, Clone)]
pub struct RatMemCacheStore {
    cache: Arc<RatMemCache>,
}

impl RatMemCacheStore {
    /// 按缓存配置构建 rat_memcache 实例
    pub async fn new(config: &CacheConfig) -> Result<Self> {
        debug!("创建rat_memcache缓存，配置: {:?}", config);

        let builder = RatMemCacheBuilder::new()
            .l1_config(rat_memcache::config::L1Config {
                max_memory: config.max_memory_mb * 1024 * 1024,
                max_entries: config.max_capacity,
                eviction_strategy: EvictionStrategy::Lru,
            })
            .l2_config(rat_memcache::config::L2Config {
                enable_l2_cache: false,
                data_dir: None,
                max_disk_size: 0,
                write_buffer_size: 64 * 1024 * 1024,
                max_write_buffer_number: 3,
                block_cache_size: 16 * 1024 * 1024,
                enable_lz4: false,
                compression_threshold: 1024,
                compression_max_threshold: 10240,
                compression_level: 6,
                background_threads: 2,
                clear_on_startup: false,
                cache_size_mb: 0,
                max_file_size_mb: 0,
                smart_flush_enabled: false,
                smart_flush_base_interval_ms: 100,
                smart_flush_min_interval_ms: 20,
                smart_flush_max_interval_ms: 500,
                smart_flush_write_rate_threshold: 10000,
                smart_flush_accumulated_bytes_threshold: 4 * 1024 * 1024,
                cache_warmup_strategy: rat_memcache::config::CacheWarmupStrategy::Recent,
                zstd_compression_level: None,
                l2_write_strategy: "write_through".to_string(),
                l2_write_threshold: 1024,
                l2_write_ttl_threshold: 3600,
            })
            .ttl_config(rat_memcache::config::TtlConfig {
                expire_seconds: Some(config.ttl_secs),
                cleanup_interval: config.cleanup_interval_secs,
                max_cleanup_entries: 1000,
                lazy_expiration: true,
                active_expiration: true,
            })
            .performance_config(rat_memcache::config::PerformanceConfig {
                worker_threads: 4,
                enable_concurrency: true,
                read_write_separation: true,
                batch_size: 1000,
                enable_warmup: false,
                large_value_threshold: 10240,
            })
            .logging_config(rat_memcache::config::LoggingConfig {
                level: "WARN".to_string(),
                enable_colors: false,
                show_timestamp: true,
                enable_performance_logs: false,
                enable_audit_logs: false,
                enable_cache_logs: false,
                enable_logging: false,
                enable_async: false,
                batch_size: 2048,
                batch_interval_ms: 25,
                buffer_size: 16384,
            });

        let cache = builder
            .build()
            .await
            .map_err(|e| anyhow!("Failed to create cache: {}", e))?;

        info!(
            "rat_memcache缓存初始化成功 - 容量: {}, 内存: {}MB, TTL: {}秒",
            config.max_capacity, config.max_memory_mb, config.ttl_secs
        );

        Ok(Self {
            cache: Arc::new(cache),
        })
    }

    /// rat_memcache 的 TTL 以秒为单位，不足一秒向上取整
    fn ttl_seconds(ttl: Duration) -> u64 {
        let secs = ttl.as_secs();
        if ttl.subsec_nanos() > 0 { secs + 1 } else { secs.max(1) }
    }
}

#[async_trait]
impl FastCache for RatMemCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.cache
            .get(key)
            .await
            .map_err(|e| anyhow!("Failed to read cache: {}", e))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        let options = CacheOptions {
            ttl_seconds: Some(Self::ttl_seconds(ttl)),
            ..Default::default()
        };
        self.cache
            .set_with_options(key.to_string(), value, &options)
            .await
            .map_err(|e| anyhow!("Failed to write cache: {}", e))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        // contains_key 会顺带删除已过期的条目，过期键不计为删除
        let live = self
            .cache
            .contains_key(key)
            .await
            .map_err(|e| anyhow!("Failed to read cache: {}", e))?;
        if !live {
            return Ok(false);
        }
        self.cache
            .delete(key)
            .await
            .map_err(|e| anyhow!("Failed to delete cache key: {}", e))
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize> {
        let keys = self
            .cache
            .keys()
            .await
            .map_err(|e| anyhow!("Failed to list cache keys: {}", e))?;

        let mut deleted = 0;
        for key in keys.iter().filter(|k| k.starts_with(prefix)) {
            if self.delete(key).await? {
                deleted += 1;
            }
        }
        debug!("rat_memcache按前缀删除: prefix={}, count={}", prefix, deleted);
        Ok(deleted)
    }

    async fn ping(&self) -> Result<()> {
        self.cache
            .get("__tiercache_ping__")
            .await
            .map(|_| ())
            .map_err(|e| anyhow!("rat_memcache unavailable: {}", e))
    }

    fn backend_name(&self) -> &'static str {
        "rat_memcache"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store(ttl_secs: u64) -> RatMemCacheStore {
        let config = CacheConfig {
            backend: crate::types::CacheBackend::RatMemCache,
            ttl_secs,
            ..crate::config::default_cache_config()
        };
        RatMemCacheStore::new(&config).await.unwrap()
    }

    #[test]
    fn test_ttl_rounds_up_to_seconds() {
        assert_eq!(RatMemCacheStore::ttl_seconds(Duration::from_secs(600)), 600);
        assert_eq!(RatMemCacheStore::ttl_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(RatMemCacheStore::ttl_seconds(Duration::from_millis(10)), 1);
        assert_eq!(RatMemCacheStore::ttl_seconds(Duration::ZERO), 1);
    }

    #[tokio::test]
    async fn test_delete_reports_actual_removal() {
        let store = test_store(60).await;
        store
            .set("users:1", Bytes::from_static(b"a"), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(store.delete("users:1").await.unwrap());
        assert!(!store.delete("users:1").await.unwrap());
        assert!(!store.delete("users:2").await.unwrap());
        assert!(store.get("users:1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_prefix_counts_live_keys_only() {
        let store = test_store(60).await;
        for id in 1..=3 {
            store
                .set(&format!("users:{}", id), Bytes::from_static(b"u"), Duration::from_secs(60))
                .await
                .unwrap();
        }
        store
            .set("products:1", Bytes::from_static(b"p"), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.delete_by_prefix("users:").await.unwrap(), 3);
        assert_eq!(store.delete_by_prefix("users:").await.unwrap(), 0);
        assert!(store.get("products:1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_keys_are_not_counted() {
        let store = test_store(60).await;
        for id in 1..=20 {
            store
                .set(&format!("users:{}", id), Bytes::from_static(b"u"), Duration::from_secs(1))
                .await
                .unwrap();
        }
        store
            .set("users:live", Bytes::from_static(b"u"), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(2100)).await;

        assert!(store.get("users:1").await.unwrap().is_none());
        assert_eq!(store.delete_by_prefix("users:").await.unwrap(), 1);
    }
}
