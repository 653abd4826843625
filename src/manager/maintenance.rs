//! 维护操作：健康检查、过期清理任务与关闭

use crate::error::{TierCacheError, TierCacheResult};
use rat_logger::{debug, info, warn};
use tokio::time::{Duration, interval};

use super::CacheManager;

impl CacheManager {
    /// 检查缓存与持久化存储的连通性
    pub async fn health_check(&self) -> TierCacheResult<()> {
        self.cache
            .ping()
            .await
            .map_err(|e| TierCacheError::ConnectionError {
                message: format!("缓存后端 {} 不可用: {}", self.cache.backend_name(), e),
            })?;
        self.store.health_check().await
    }

    /// 启动过期条目清理任务
    pub(crate) async fn start_cleanup_task(&self) {
        let mut cleanup_handle = self.cleanup_handle.write().await;

        // 清理任务已经在运行
        if cleanup_handle.is_some() {
            return;
        }

        let cache = self.cache.clone();
        let period = Duration::from_secs(self.config.cache.cleanup_interval_secs);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            // 第一次 tick 立即返回
            ticker.tick().await;

            info!("启动缓存过期清理任务，间隔 {:?}", period);

            loop {
                ticker.tick().await;
                match cache.purge_expired().await {
                    Ok(0) => {}
                    Ok(purged) => debug!("清理过期缓存条目 {} 条", purged),
                    Err(e) => warn!("清理过期缓存条目失败: {}", e),
                }
            }
        });

        *cleanup_handle = Some(handle);
    }

    /// 停止过期条目清理任务
    pub async fn stop_cleanup_task(&self) {
        let mut cleanup_handle = self.cleanup_handle.write().await;

        if let Some(handle) = cleanup_handle.take() {
            handle.abort();
            info!("缓存过期清理任务已停止");
        }
    }

    /// 关闭管理器：停止后台任务并关闭持久化存储
    ///
    /// 等待进行中的写入完成后再关闭
    pub async fn close(&self) {
        self.stop_cleanup_task().await;
        let _guard = self.write_lock.lock().await;
        self.store.close().await;
        info!("缓存管理器已关闭");
    }
}
