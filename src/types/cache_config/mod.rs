use serde::{Deserialize, Serialize};

/// 缓存后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// 进程内 DashMap 缓存，TTL 精确到毫秒
    Memory,
    /// rat_memcache L1 内存缓存，TTL 精确到秒
    RatMemCache,
}

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 是否启用缓存
    pub enabled: bool,
    /// 缓存后端
    pub backend: CacheBackend,
    /// 条目存活时间（秒），读写两条路径共用
    pub ttl_secs: u64,
    /// 最大条目数
    pub max_capacity: usize,
    /// 最大内存使用（MB）
    pub max_memory_mb: usize,
    /// 过期清理间隔（秒）
    pub cleanup_interval_secs: u64,
    /// clear_cache 时额外清理的键前缀（表名前缀会自动清理）
    #[serde(default)]
    pub key_prefixes: Vec<String>,
}

impl CacheConfig {
    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_secs)
    }
}
