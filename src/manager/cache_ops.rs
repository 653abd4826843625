//! 缓存统计与清理

use crate::cache::{CacheKey, CacheStats};
use crate::error::{TierCacheError, TierCacheResult};
use rat_logger::{debug, info, warn};

use super::CacheManager;

impl CacheManager {
    /// 获取统计快照
    pub fn get_cache_stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// 清空本管理器的缓存条目并重置统计
    ///
    /// 故障只记录日志
    pub async fn clear_cache(&self) {
        if let Err(e) = self.try_clear_cache().await {
            warn!("清理缓存失败: {}", e);
        }
    }

    /// 清空本管理器的缓存条目并重置统计，返回删除的条目数
    ///
    /// 清理范围为所有访问过的表前缀加上配置的额外前缀，
    /// 任一前缀清理失败时统计不会被重置
    pub async fn try_clear_cache(&self) -> TierCacheResult<usize> {
        let mut prefixes: Vec<String> = self
            .known_tables
            .iter()
            .map(|entry| CacheKey::table_prefix(entry.key()))
            .collect();
        prefixes.extend(self.config.cache.key_prefixes.iter().cloned());
        prefixes.sort();
        prefixes.dedup();

        let mut removed = 0;
        for prefix in &prefixes {
            removed += self
                .cache
                .delete_by_prefix(prefix)
                .await
                .map_err(|e| TierCacheError::CacheError {
                    message: format!("按前缀 {} 清理缓存失败: {}", prefix, e),
                })?;
        }

        self.stats.clear();
        info!("已清理缓存 {} 条，统计已重置", removed);
        Ok(removed)
    }

    /// 删除单条记录的缓存条目，返回条目是否存在
    ///
    /// 用于持久化存储被外部修改后的手动失效
    pub async fn invalidate(&self, table: &str, id: i64) -> bool {
        let key = CacheKey::new(table, id);
        match self.cache.delete(key.as_str()).await {
            Ok(existed) => {
                debug!("缓存条目已失效: key={}, 存在={}", key, existed);
                existed
            }
            Err(e) => {
                warn!("缓存失效失败: key={}, 错误: {}", key, e);
                false
            }
        }
    }
}
