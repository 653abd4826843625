//! 持久化存储适配器模块
//!
//! 持久化存储是数据的唯一权威来源：负责分配自增ID、按ID读取记录、
//! 事务提交以及性能日志落库

use crate::error::TierCacheResult;
use crate::table::TableSchema;
use crate::types::*;
use async_trait::async_trait;
use std::sync::Arc;

mod sqlite;

pub use sqlite::SqliteStore;

/// 持久化存储接口
///
/// `insert` 返回时数据已经提交，并发的 `select_by_id` 能看到完整记录
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// 按表结构建表（已存在则跳过）
    async fn ensure_schema(&self, schema: &TableSchema) -> TierCacheResult<()>;

    /// 插入单条记录并提交，返回存储分配的ID
    async fn insert(&self, table: &str, record: &Record) -> TierCacheResult<i64>;

    /// 在同一个事务中插入多条记录，最后只提交一次
    ///
    /// 单条记录失败不影响其他记录，外层 `Err` 表示整个事务未能提交
    async fn insert_batch(
        &self,
        table: &str,
        records: &[Record],
    ) -> TierCacheResult<Vec<TierCacheResult<i64>>>;

    /// 按ID读取记录
    async fn select_by_id(&self, table: &str, id: i64) -> TierCacheResult<Option<Record>>;

    /// 统计某列等于给定值的行数（唯一性预检查）
    async fn count_matching(
        &self,
        table: &str,
        column: &str,
        value: &DataValue,
    ) -> TierCacheResult<i64>;

    /// 追加一条性能日志
    async fn append_performance_log(&self, entry: &PerformanceLogEntry) -> TierCacheResult<()>;

    /// 读取最近的性能日志，按时间倒序
    async fn recent_performance_logs(&self, limit: usize)
    -> TierCacheResult<Vec<PerformanceLogEntry>>;

    /// 连通性检查
    async fn health_check(&self) -> TierCacheResult<()>;

    /// 关闭连接
    async fn close(&self);
}

/// 按配置创建持久化存储
pub async fn create_store(config: &DatabaseConfig) -> TierCacheResult<Arc<dyn DurableStore>> {
    match &config.connection {
        ConnectionConfig::Sqlite { .. } => Ok(Arc::new(SqliteStore::connect(config).await?)),
    }
}
