//! 故障注入测试：缓存层与持久化存储故障的吸收行为

use async_trait::async_trait;
use bytes::Bytes;
use rat_tiercache::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 所有读写都失败的缓存
struct BrokenCache {
    ping_ok: bool,
}

#[async_trait]
impl FastCache for BrokenCache {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<Bytes>> {
        anyhow::bail!("cache unavailable")
    }

    async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> anyhow::Result<()> {
        anyhow::bail!("cache unavailable")
    }

    async fn delete(&self, _key: &str) -> anyhow::Result<bool> {
        anyhow::bail!("cache unavailable")
    }

    async fn delete_by_prefix(&self, _prefix: &str) -> anyhow::Result<usize> {
        anyhow::bail!("cache unavailable")
    }

    async fn ping(&self) -> anyhow::Result<()> {
        if self.ping_ok {
            Ok(())
        } else {
            anyhow::bail!("connection refused")
        }
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

/// 包装真实存储，可按开关注入读取失败或提交失败
struct FlakyStore {
    inner: Arc<dyn DurableStore>,
    fail_reads: AtomicBool,
    fail_commits: AtomicBool,
}

impl FlakyStore {
    fn injected() -> TierCacheError {
        TierCacheError::QueryError {
            message: "database is locked".to_string(),
        }
    }
}

#[async_trait]
impl DurableStore for FlakyStore {
    async fn ensure_schema(&self, schema: &TableSchema) -> TierCacheResult<()> {
        self.inner.ensure_schema(schema).await
    }

    async fn insert(&self, table: &str, record: &Record) -> TierCacheResult<i64> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.insert(table, record).await
    }

    async fn insert_batch(
        &self,
        table: &str,
        records: &[Record],
    ) -> TierCacheResult<Vec<TierCacheResult<i64>>> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.insert_batch(table, records).await
    }

    async fn select_by_id(&self, table: &str, id: i64) -> TierCacheResult<Option<Record>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.select_by_id(table, id).await
    }

    async fn count_matching(
        &self,
        table: &str,
        column: &str,
        value: &DataValue,
    ) -> TierCacheResult<i64> {
        self.inner.count_matching(table, column, value).await
    }

    async fn append_performance_log(&self, entry: &PerformanceLogEntry) -> TierCacheResult<()> {
        self.inner.append_performance_log(entry).await
    }

    async fn recent_performance_logs(
        &self,
        limit: usize,
    ) -> TierCacheResult<Vec<PerformanceLogEntry>> {
        self.inner.recent_performance_logs(limit).await
    }

    async fn health_check(&self) -> TierCacheResult<()> {
        self.inner.health_check().await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

fn user(username: &str) -> Record {
    Record::new()
        .with("username", username)
        .with("email", format!("{}@example.com", username))
}

async fn flaky_manager() -> (CacheManager, Arc<FlakyStore>) {
    let config = TierCacheConfig::in_memory();
    let inner = create_store(&config.database).await.unwrap();
    let store = Arc::new(FlakyStore {
        inner,
        fail_reads: AtomicBool::new(false),
        fail_commits: AtomicBool::new(false),
    });
    let cache = create_cache(&config.cache).await.unwrap();
    let manager = CacheManager::with_backends(config, store.clone(), cache)
        .await
        .unwrap();
    (manager, store)
}

#[tokio::test]
async fn test_unreachable_cache_fails_startup() {
    let config = TierCacheConfig::in_memory();
    let store = create_store(&config.database).await.unwrap();
    let cache = Arc::new(BrokenCache { ping_ok: false });

    let err = CacheManager::with_backends(config, store, cache)
        .await
        .unwrap_err();
    assert!(matches!(err, TierCacheError::ConnectionError { .. }));
}

#[tokio::test]
async fn test_cache_faults_degrade_to_store() {
    let config = TierCacheConfig::in_memory();
    let store = create_store(&config.database).await.unwrap();
    let cache = Arc::new(BrokenCache { ping_ok: true });
    let manager = CacheManager::with_backends(config, store, cache).await.unwrap();

    // 已提交的写入不会因为缓存故障而失败
    let id = manager.try_set("users", &user("olga")).await.unwrap();

    let record = manager.get("users", id).await.expect("应从持久化存储读取");
    assert_eq!(record.get("username"), Some(&DataValue::from("olga")));

    let stats = manager.get_cache_stats();
    assert_eq!(stats.cache_hits, 0);
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.total_writes, 1);

    assert!(manager.try_clear_cache().await.is_err());
    // 清理失败时统计不被重置
    assert_eq!(manager.get_cache_stats().total_writes, 1);
}

#[tokio::test]
async fn test_store_read_fault_is_absorbed() {
    let (manager, store) = flaky_manager().await;
    store.fail_reads.store(true, Ordering::SeqCst);

    assert!(manager.get("users", 1).await.is_none());
    let err = manager.try_get("users", 1).await.unwrap_err();
    assert!(err.is_transient());

    let stats = manager.get_cache_stats();
    assert_eq!(stats.cache_misses, 2);
}

#[tokio::test]
async fn test_cached_entry_survives_store_read_fault() {
    let (manager, store) = flaky_manager().await;
    let id = manager.try_set("users", &user("pete")).await.unwrap();

    store.fail_reads.store(true, Ordering::SeqCst);
    assert!(manager.get("users", id).await.is_some());
    assert_eq!(manager.get_cache_stats().cache_hits, 1);
}

#[tokio::test]
async fn test_failed_commit_leaves_no_trace() {
    let (manager, store) = flaky_manager().await;
    store.fail_commits.store(true, Ordering::SeqCst);

    assert!(!manager.set("users", &user("quinn")).await);
    assert_eq!(manager.batch_write("users", &[user("rita"), user("sam")]).await, 0);

    let stats = manager.get_cache_stats();
    assert_eq!(stats.total_writes, 0);
    assert_eq!(stats.batch_writes, 0);

    store.fail_commits.store(false, Ordering::SeqCst);
    // 失败的写入没有污染缓存，也没有被持久化
    assert!(manager.get("users", 1).await.is_none());
    assert!(manager.set("users", &user("quinn")).await);

    let logs = manager.recent_performance_logs(10).await.unwrap();
    let writes = logs
        .iter()
        .filter(|e| e.operation_type != OperationType::Read)
        .count();
    assert_eq!(writes, 1);
}
