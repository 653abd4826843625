//! 缓存统计模块
//!
//! 命中、未命中、读写次数的原子计数器，对外只暴露快照

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// 运行期计数器，由 CacheManager 独占持有
#[derive(Debug, Default)]
pub struct StatsTracker {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    total_writes: AtomicU64,
    batch_writes: AtomicU64,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_writes(&self, count: u64) {
        self.total_writes.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_batch(&self, successful: u64) {
        self.total_writes.fetch_add(successful, Ordering::Relaxed);
        self.batch_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// 获取当前计数的快照
    pub fn snapshot(&self) -> CacheStats {
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.cache_misses.load(Ordering::Relaxed);
        // 总读数由分量求和得到，快照内 total_reads == hits + misses 恒成立
        let total_reads = cache_hits + cache_misses;
        CacheStats {
            cache_hits,
            cache_misses,
            total_reads,
            total_writes: self.total_writes.load(Ordering::Relaxed),
            batch_writes: self.batch_writes.load(Ordering::Relaxed),
            hit_ratio: CacheStats::ratio(cache_hits, total_reads),
        }
    }

    /// 重置全部计数器
    pub fn clear(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.total_writes.store(0, Ordering::Relaxed);
        self.batch_writes.store(0, Ordering::Relaxed);
    }
}

/// 缓存统计信息快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// 缓存命中次数
    pub cache_hits: u64,
    /// 缓存未命中次数
    pub cache_misses: u64,
    /// 总读取次数
    pub total_reads: u64,
    /// 成功写入的记录数（含批量写入中的记录）
    pub total_writes: u64,
    /// 批量写入调用次数
    pub batch_writes: u64,
    /// 命中率 hits / total_reads，没有读取时为 0
    pub hit_ratio: f64,
}

impl CacheStats {
    fn ratio(hits: u64, total: u64) -> f64 {
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// 命中率百分比
    pub fn hit_ratio_percent(&self) -> f64 {
        self.hit_ratio * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = StatsTracker::new().snapshot();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_ratio, 0.0);
    }

    #[test]
    fn test_hit_ratio() {
        let tracker = StatsTracker::new();
        tracker.record_hit();
        tracker.record_hit();
        tracker.record_hit();
        tracker.record_miss();

        let stats = tracker.snapshot();
        assert_eq!(stats.total_reads, 4);
        assert_eq!(stats.total_reads, stats.cache_hits + stats.cache_misses);
        assert!((stats.hit_ratio - 0.75).abs() < f64::EPSILON);
        assert!((stats.hit_ratio_percent() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_resets_all_counters() {
        let tracker = StatsTracker::new();
        tracker.record_miss();
        tracker.record_writes(2);
        tracker.record_batch(3);

        let before = tracker.snapshot();
        assert_eq!(before.total_writes, 5);
        assert_eq!(before.batch_writes, 1);

        tracker.clear();
        assert_eq!(tracker.snapshot(), CacheStats::default());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let tracker = StatsTracker::new();
        let snapshot = tracker.snapshot();
        tracker.record_hit();
        assert_eq!(snapshot.cache_hits, 0);
        assert_eq!(tracker.snapshot().cache_hits, 1);
    }
}
