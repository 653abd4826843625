//! 性能日志

use crate::error::TierCacheResult;
use crate::types::{OperationType, PerformanceLogEntry};
use rat_logger::warn;
use std::time::Duration;

use super::CacheManager;

impl CacheManager {
    /// 追加一条性能日志，失败只记录警告
    pub(crate) async fn record_performance(
        &self,
        operation_type: OperationType,
        elapsed: Duration,
        cache_used: bool,
    ) {
        if !self.config.performance_log_enabled {
            return;
        }

        let entry = PerformanceLogEntry::new(operation_type, elapsed, cache_used);
        if let Err(e) = self.store.append_performance_log(&entry).await {
            warn!("写入性能日志失败: 操作={}, 错误: {}", operation_type, e);
        }
    }

    /// 读取最近的性能日志，按时间倒序
    pub async fn recent_performance_logs(
        &self,
        limit: usize,
    ) -> TierCacheResult<Vec<PerformanceLogEntry>> {
        if !self.config.performance_log_enabled {
            return Ok(Vec::new());
        }
        self.store.recent_performance_logs(limit).await
    }
}
