//! 写穿透与批量写入
//!
//! 写入顺序固定为：清洗 -> 按列类型转换 -> 唯一性预检查 -> 持久化提交 -> 写缓存 -> 计数。
//! 整个过程持有管理器写锁，性能日志在释放写锁之后追加。
//! 写入缓存的记录经过与存储相同的类型转换，命中与回源读到的记录一致。

use crate::cache::CacheKey;
use crate::config::TierCacheConfig;
use crate::error::{TierCacheError, TierCacheResult};
use crate::types::{DataValue, ID_FIELD, OperationType, Record};
use rat_logger::{debug, error, info, warn};
use std::collections::HashSet;
use std::time::Instant;

use super::CacheManager;

/// 批量写入中成功落库的记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenRecord {
    /// 在输入序列中的下标
    pub index: usize,
    /// 存储分配的ID
    pub id: i64,
}

/// 批量写入中被拒绝或执行失败的记录
#[derive(Debug)]
pub struct BatchFailure {
    pub index: usize,
    pub error: TierCacheError,
}

/// 批量写入结果
#[derive(Debug, Default)]
pub struct BatchWriteReport {
    pub written: Vec<WrittenRecord>,
    pub failures: Vec<BatchFailure>,
}

impl BatchWriteReport {
    /// 成功写入的记录数
    pub fn successful_count(&self) -> usize {
        self.written.len()
    }

    /// 按输入顺序排列的已分配ID
    pub fn written_ids(&self) -> Vec<i64> {
        self.written.iter().map(|w| w.id).collect()
    }
}

/// 清洗单条写入的载荷
///
/// 主键字段为空时删除；主键字段不是 `id` 时同时删除 `id`，ID 只能由存储分配
pub(crate) fn sanitize_payload(record: &Record, key_field: &str) -> Record {
    let mut payload = record.clone();
    if payload.get(key_field).is_some_and(DataValue::is_blank) {
        payload.remove(key_field);
    }
    if key_field != ID_FIELD {
        payload.remove(ID_FIELD);
    }
    payload
}

/// 唯一性去重键：(列名, 值的JSON表示)
fn uniqueness_key(column: &str, value: &DataValue) -> (String, String) {
    (column.to_string(), value.to_json_value().to_string())
}

impl CacheManager {
    /// 写入单条记录，主键字段为 `id`
    ///
    /// 成功返回 `true`；约束冲突与存储故障均返回 `false`
    pub async fn set(&self, table: &str, record: &Record) -> bool {
        self.set_with_key(table, record, ID_FIELD).await
    }

    /// 写入单条记录并指定主键字段
    pub async fn set_with_key(&self, table: &str, record: &Record, key_field: &str) -> bool {
        match self.try_set_with_key(table, record, key_field).await {
            Ok(_) => true,
            Err(e) if e.is_constraint_violation() => {
                warn!("写入被拒绝: {}", e);
                false
            }
            Err(e) => {
                error!("写入失败: table={}, 错误: {}", table, e);
                false
            }
        }
    }

    /// 写入单条记录，返回存储分配的ID
    pub async fn try_set(&self, table: &str, record: &Record) -> TierCacheResult<i64> {
        self.try_set_with_key(table, record, ID_FIELD).await
    }

    /// 写入单条记录并指定主键字段，返回存储分配的ID
    pub async fn try_set_with_key(
        &self,
        table: &str,
        record: &Record,
        key_field: &str,
    ) -> TierCacheResult<i64> {
        let start_time = Instant::now();
        TierCacheConfig::validate_table_name(table)?;
        self.remember_table(table);

        let id = {
            let _guard = self.write_lock.lock().await;
            self.write_one_locked(table, record, key_field).await?
        };

        debug!("写入成功: table={}, id={}", table, id);
        self.record_performance(OperationType::Write, start_time.elapsed(), true)
            .await;
        Ok(id)
    }

    /// 调用方必须持有写锁
    async fn write_one_locked(
        &self,
        table: &str,
        record: &Record,
        key_field: &str,
    ) -> TierCacheResult<i64> {
        let mut payload = self.normalize_payload(table, sanitize_payload(record, key_field));
        self.check_unique(table, &payload, None).await?;

        let id = self.store.insert(table, &payload).await?;

        payload.insert(ID_FIELD, id);
        if self.config.cache.enabled {
            self.populate_cache(&CacheKey::new(table, id), &payload)
                .await;
        }
        self.stats.record_writes(1);
        Ok(id)
    }

    /// 批量写入，返回成功写入的记录数
    ///
    /// 单条记录失败不影响其他记录；事务提交失败时返回 0
    pub async fn batch_write(&self, table: &str, records: &[Record]) -> usize {
        match self.try_batch_write(table, records).await {
            Ok(report) => report.successful_count(),
            Err(e) => {
                error!("批量写入失败: table={}, 记录数={}, 错误: {}", table, records.len(), e);
                0
            }
        }
    }

    /// 批量写入，返回逐条结果
    ///
    /// 空输入直接返回空结果，不计入批量写入次数也不写性能日志
    pub async fn try_batch_write(
        &self,
        table: &str,
        records: &[Record],
    ) -> TierCacheResult<BatchWriteReport> {
        if records.is_empty() {
            debug!("批量写入输入为空: table={}", table);
            return Ok(BatchWriteReport::default());
        }

        let start_time = Instant::now();
        TierCacheConfig::validate_table_name(table)?;
        self.remember_table(table);

        let report = {
            let _guard = self.write_lock.lock().await;
            self.write_batch_locked(table, records).await?
        };

        info!(
            "批量写入完成: table={}, 成功={}, 失败={}",
            table,
            report.written.len(),
            report.failures.len()
        );
        self.record_performance(OperationType::BatchWrite, start_time.elapsed(), true)
            .await;
        Ok(report)
    }

    /// 按配置的 `write_batch_size` 分块批量写入，返回成功写入总数
    ///
    /// 每个分块是一次独立的批量写入
    pub async fn write_chunked(&self, table: &str, records: &[Record]) -> usize {
        let chunk_size = self.config.write_batch_size.max(1);
        let mut written = 0;
        for chunk in records.chunks(chunk_size) {
            written += self.batch_write(table, chunk).await;
        }
        written
    }

    /// 调用方必须持有写锁
    async fn write_batch_locked(
        &self,
        table: &str,
        records: &[Record],
    ) -> TierCacheResult<BatchWriteReport> {
        let mut report = BatchWriteReport::default();
        let mut seen = HashSet::new();
        let mut indices = Vec::with_capacity(records.len());
        let mut payloads = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            // 批量写入的ID一律由存储分配
            let mut payload = record.clone();
            payload.remove(ID_FIELD);
            let payload = self.normalize_payload(table, payload);

            match self.check_unique(table, &payload, Some(&mut seen)).await {
                Ok(()) => {
                    indices.push(index);
                    payloads.push(payload);
                }
                Err(e) => {
                    warn!("批量写入跳过第{}条记录: {}", index, e);
                    report.failures.push(BatchFailure { index, error: e });
                }
            }
        }

        if payloads.is_empty() {
            self.stats.record_batch(0);
            return Ok(report);
        }

        // 外层错误表示事务未提交，本批次整体失败
        let results = self.store.insert_batch(table, &payloads).await?;

        for ((index, mut payload), result) in indices.into_iter().zip(payloads).zip(results) {
            match result {
                Ok(id) => {
                    payload.insert(ID_FIELD, id);
                    if self.config.cache.enabled {
                        self.populate_cache(&CacheKey::new(table, id), &payload)
                            .await;
                    }
                    report.written.push(WrittenRecord { index, id });
                }
                Err(e) => report.failures.push(BatchFailure { index, error: e }),
            }
        }

        report.failures.sort_by_key(|f| f.index);
        self.stats.record_batch(report.written.len() as u64);
        Ok(report)
    }

    /// 按表结构转换字段类型；未配置结构的表原样写入
    fn normalize_payload(&self, table: &str, payload: Record) -> Record {
        match self.schemas.get(table) {
            Some(schema) => schema.normalize_record(&payload),
            None => payload,
        }
    }

    /// 唯一性预检查
    ///
    /// 对表结构中声明为 UNIQUE 的列查询已提交的数据；批量写入时还会
    /// 与同批次中已接受的记录比较。NULL 值不参与比较
    async fn check_unique(
        &self,
        table: &str,
        payload: &Record,
        seen: Option<&mut HashSet<(String, String)>>,
    ) -> TierCacheResult<()> {
        let Some(schema) = self.schemas.get(table) else {
            return Ok(());
        };

        let mut accepted_keys = Vec::new();
        for column in schema.unique_columns() {
            let Some(value) = payload.get(&column.name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let key = uniqueness_key(&column.name, value);
            let duplicated_in_batch = seen.as_ref().is_some_and(|s| s.contains(&key));
            if duplicated_in_batch
                || self
                    .store
                    .count_matching(table, &column.name, value)
                    .await?
                    > 0
            {
                return Err(TierCacheError::ConstraintViolation {
                    table: table.to_string(),
                    column: column.name.clone(),
                    value: value.to_string(),
                });
            }
            accepted_keys.push(key);
        }

        if let Some(seen) = seen {
            seen.extend(accepted_keys);
        }
        Ok(())
    }
}
