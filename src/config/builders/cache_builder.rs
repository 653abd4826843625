//! # 缓存配置构建器模块

use crate::error::TierCacheError;
use crate::types::{CacheBackend, CacheConfig};

/// 缓存配置构建器
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    enabled: Option<bool>,
    backend: Option<CacheBackend>,
    ttl_secs: Option<u64>,
    max_capacity: Option<usize>,
    max_memory_mb: Option<usize>,
    cleanup_interval_secs: Option<u64>,
    key_prefixes: Vec<String>,
}

impl CacheConfig {
    /// 创建缓存配置构建器
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }
}

impl CacheConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置是否启用缓存
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// 设置缓存后端
    pub fn backend(mut self, backend: CacheBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// 设置条目存活时间（秒）
    pub fn ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = Some(ttl_secs);
        self
    }

    /// 设置最大条目数
    pub fn max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    /// 设置最大内存（MB）
    pub fn max_memory_mb(mut self, max_memory_mb: usize) -> Self {
        self.max_memory_mb = Some(max_memory_mb);
        self
    }

    /// 设置过期清理间隔（秒）
    pub fn cleanup_interval_secs(mut self, secs: u64) -> Self {
        self.cleanup_interval_secs = Some(secs);
        self
    }

    /// 追加 clear_cache 时清理的键前缀
    pub fn key_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.key_prefixes.push(prefix.into());
        self
    }

    /// 构建缓存配置
    pub fn build(self) -> Result<CacheConfig, TierCacheError> {
        let enabled = self
            .enabled
            .ok_or_else(|| crate::tier_error!(config, "缓存启用选项必须设置"))?;
        let backend = self
            .backend
            .ok_or_else(|| crate::tier_error!(config, "缓存后端必须设置"))?;
        let ttl_secs = self
            .ttl_secs
            .ok_or_else(|| crate::tier_error!(config, "缓存TTL必须设置"))?;
        let max_capacity = self
            .max_capacity
            .ok_or_else(|| crate::tier_error!(config, "缓存容量必须设置"))?;
        let max_memory_mb = self
            .max_memory_mb
            .ok_or_else(|| crate::tier_error!(config, "缓存内存上限必须设置"))?;
        let cleanup_interval_secs = self
            .cleanup_interval_secs
            .ok_or_else(|| crate::tier_error!(config, "过期清理间隔必须设置"))?;

        if ttl_secs == 0 {
            return Err(crate::tier_error!(config, "缓存TTL不能为零"));
        }
        if max_capacity == 0 {
            return Err(crate::tier_error!(config, "缓存容量不能为零"));
        }
        if self.key_prefixes.iter().any(|p| p.is_empty()) {
            return Err(crate::tier_error!(config, "缓存键前缀不能为空字符串"));
        }

        Ok(CacheConfig {
            enabled,
            backend,
            ttl_secs,
            max_capacity,
            max_memory_mb,
            cleanup_interval_secs,
            key_prefixes: self.key_prefixes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ttl_is_error() {
        let result = CacheConfig::builder()
            .enabled(true)
            .backend(CacheBackend::Memory)
            .max_capacity(100)
            .max_memory_mb(16)
            .cleanup_interval_secs(60)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_full_build() {
        let config = CacheConfig::builder()
            .enabled(true)
            .backend(CacheBackend::RatMemCache)
            .ttl_secs(600)
            .max_capacity(1000)
            .max_memory_mb(64)
            .cleanup_interval_secs(60)
            .key_prefix("demo:")
            .build()
            .unwrap();
        assert_eq!(config.ttl(), std::time::Duration::from_secs(600));
        assert_eq!(config.key_prefixes, vec!["demo:".to_string()]);
    }
}
