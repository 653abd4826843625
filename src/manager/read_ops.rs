//! 读穿透

use crate::cache::CacheKey;
use crate::config::TierCacheConfig;
use crate::error::TierCacheResult;
use crate::types::{OperationType, Record};
use bytes::Bytes;
use rat_logger::{debug, warn};
use std::time::Instant;

use super::CacheManager;

impl CacheManager {
    /// 按ID读取记录
    ///
    /// 故障被记录日志后吸收，调用方只会看到"没有数据"
    pub async fn get(&self, table: &str, id: i64) -> Option<Record> {
        match self.try_get(table, id).await {
            Ok(record) => record,
            Err(e) => {
                warn!("读取失败，按无数据处理: table={}, id={}, 错误: {}", table, id, e);
                None
            }
        }
    }

    /// 按ID读取记录，持久化存储故障以错误返回
    ///
    /// 缓存层故障不会返回错误，只会退化为未命中。
    /// 每次调用都会追加一条性能日志，表名非法时也不例外，但不计入命中统计
    pub async fn try_get(&self, table: &str, id: i64) -> TierCacheResult<Option<Record>> {
        let start_time = Instant::now();
        if let Err(e) = TierCacheConfig::validate_table_name(table) {
            self.record_performance(OperationType::Read, start_time.elapsed(), false)
                .await;
            return Err(e);
        }
        self.remember_table(table);

        let key = CacheKey::new(table, id);

        if self.config.cache.enabled {
            if let Some(record) = self.read_cached(&key).await {
                self.stats.record_hit();
                debug!("缓存命中: key={}", key);
                self.record_performance(OperationType::Read, start_time.elapsed(), true)
                    .await;
                return Ok(Some(record));
            }
        }

        self.stats.record_miss();
        debug!("缓存未命中: key={}", key);

        let found = match self.store.select_by_id(table, id).await {
            Ok(found) => found,
            Err(e) => {
                self.record_performance(OperationType::Read, start_time.elapsed(), false)
                    .await;
                return Err(e);
            }
        };

        // 不存在的记录不缓存
        if let Some(record) = &found {
            if self.config.cache.enabled {
                self.populate_cache(&key, record).await;
            }
        }

        self.record_performance(OperationType::Read, start_time.elapsed(), false)
            .await;
        Ok(found)
    }

    /// 读取并反序列化缓存条目，任何故障都视为未命中
    pub(crate) async fn read_cached(&self, key: &CacheKey) -> Option<Record> {
        match self.cache.get(key.as_str()).await {
            Ok(Some(data)) => match serde_json::from_slice::<Record>(&data) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("缓存条目反序列化失败，按未命中处理: key={}, 错误: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("缓存读取失败，按未命中处理: key={}, 错误: {}", key, e);
                None
            }
        }
    }

    /// 写入缓存条目，返回是否成功
    ///
    /// 失败只记录日志：持久化存储已是权威数据，缓存缺失只会导致下次未命中
    pub(crate) async fn populate_cache(&self, key: &CacheKey, record: &Record) -> bool {
        let serialized = match serde_json::to_vec(record) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("记录序列化失败，跳过缓存: key={}, 错误: {}", key, e);
                return false;
            }
        };

        match self
            .cache
            .set(key.as_str(), Bytes::from(serialized), self.config.cache.ttl())
            .await
        {
            Ok(()) => {
                debug!("已缓存记录: key={}", key);
                true
            }
            Err(e) => {
                warn!("写入缓存失败: key={}, 错误: {}", key, e);
                false
            }
        }
    }
}
