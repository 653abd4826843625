use crate::adapter::DurableStore;
use crate::error::{TierCacheError, TierCacheResult};
use crate::table::TableSchema;
use crate::types::*;
use async_trait::async_trait;
use rat_logger::{debug, info, warn};
use sqlx::Row;

use super::adapter::SqliteStore;
use super::schema::create_table_sql;
use super::utils::{bind_value, build_insert_sql, parse_timestamp, row_to_record};

#[async_trait]
impl DurableStore for SqliteStore {
    async fn ensure_schema(&self, schema: &TableSchema) -> TierCacheResult<()> {
        schema.validate()?;
        let sql = create_table_sql(&self.validator, schema)?;
        debug!("执行建表语句: {}", sql);

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| TierCacheError::QueryError {
                message: format!("创建表 '{}' 失败: {}", schema.name, e),
            })?;

        self.schemas.insert(schema.name.clone(), schema.clone());
        info!("表结构已就绪: {}", schema.name);
        Ok(())
    }

    async fn insert(&self, table: &str, record: &Record) -> TierCacheResult<i64> {
        let (sql, values) = build_insert_sql(&self.validator, table, record)?;

        // 单条写入也显式开启事务，提交成功后才返回ID
        let mut tx = self.pool.begin().await?;
        let mut query = sqlx::query(&sql);
        for value in &values {
            query = bind_value(query, value);
        }
        let result = query
            .execute(&mut *tx)
            .await
            .map_err(|e| TierCacheError::QueryError {
                message: format!("执行SQLite插入失败: {}", e),
            })?;
        tx.commit().await.map_err(|e| TierCacheError::QueryError {
            message: format!("提交SQLite事务失败: {}", e),
        })?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_batch(
        &self,
        table: &str,
        records: &[Record],
    ) -> TierCacheResult<Vec<TierCacheResult<i64>>> {
        let mut tx = self.pool.begin().await?;
        let mut results = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let (sql, values) = match build_insert_sql(&self.validator, table, record) {
                Ok(built) => built,
                Err(e) => {
                    warn!("批量写入第{}条记录无效: {}", index, e);
                    results.push(Err(e));
                    continue;
                }
            };

            let mut query = sqlx::query(&sql);
            for value in &values {
                query = bind_value(query, value);
            }
            // SQLite 中单条语句失败只回滚该语句本身，事务继续
            match query.execute(&mut *tx).await {
                Ok(result) => results.push(Ok(result.last_insert_rowid())),
                Err(e) => {
                    warn!("批量写入第{}条记录失败: {}", index, e);
                    results.push(Err(TierCacheError::QueryError {
                        message: format!("执行SQLite插入失败: {}", e),
                    }));
                }
            }
        }

        tx.commit().await.map_err(|e| TierCacheError::QueryError {
            message: format!("提交SQLite批量事务失败: {}", e),
        })?;

        Ok(results)
    }

    async fn select_by_id(&self, table: &str, id: i64) -> TierCacheResult<Option<Record>> {
        let sql = format!(
            "SELECT * FROM {} WHERE \"id\" = ? LIMIT 1",
            self.validator.safe_table_identifier(table)?
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TierCacheError::QueryError {
                message: format!("执行SQLite根据ID查询失败: {}", e),
            })?;

        let schema = self.schemas.get(table);
        row.as_ref()
            .map(|row| row_to_record(row, schema.as_deref()))
            .transpose()
    }

    async fn count_matching(
        &self,
        table: &str,
        column: &str,
        value: &DataValue,
    ) -> TierCacheResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            self.validator.safe_table_identifier(table)?,
            self.validator.safe_column_identifier(column)?
        );

        let query = bind_value(sqlx::query(&sql), value);
        let row = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TierCacheError::QueryError {
                message: format!("执行SQLite计数查询失败: {}", e),
            })?;

        row.try_get::<i64, _>(0).map_err(|e| TierCacheError::QueryError {
            message: format!("读取计数结果失败: {}", e),
        })
    }

    async fn append_performance_log(&self, entry: &PerformanceLogEntry) -> TierCacheResult<()> {
        let sql = format!(
            "INSERT INTO {} (\"operation_type\", \"execution_time\", \"cache_used\", \"timestamp\") VALUES (?, ?, ?, ?)",
            self.validator.safe_table_identifier(PERFORMANCE_LOG_TABLE)?
        );

        sqlx::query(&sql)
            .bind(entry.operation_type.as_str())
            .bind(entry.execution_time)
            .bind(entry.cache_used)
            .bind(entry.timestamp.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| TierCacheError::QueryError {
                message: format!("写入性能日志失败: {}", e),
            })?;
        Ok(())
    }

    async fn recent_performance_logs(
        &self,
        limit: usize,
    ) -> TierCacheResult<Vec<PerformanceLogEntry>> {
        let sql = format!(
            "SELECT \"operation_type\", \"execution_time\", \"cache_used\", \"timestamp\" FROM {} ORDER BY \"id\" DESC LIMIT ?",
            self.validator.safe_table_identifier(PERFORMANCE_LOG_TABLE)?
        );

        let rows = sqlx::query(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TierCacheError::QueryError {
                message: format!("读取性能日志失败: {}", e),
            })?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let record = row_to_record(row, None)?;
            let operation_type = match record.get("operation_type") {
                Some(DataValue::String(s)) => OperationType::parse(s),
                _ => None,
            };
            let Some(operation_type) = operation_type else {
                warn!("跳过无法识别的性能日志: {:?}", record);
                continue;
            };
            let execution_time = match record.get("execution_time") {
                Some(DataValue::Float(f)) => *f,
                Some(DataValue::Int(i)) => *i as f64,
                _ => 0.0,
            };
            let cache_used = matches!(
                record.get("cache_used"),
                Some(DataValue::Bool(true)) | Some(DataValue::Int(1))
            );
            let timestamp = match record.get("timestamp") {
                Some(DataValue::String(s)) => parse_timestamp(s),
                _ => None,
            };
            entries.push(PerformanceLogEntry {
                operation_type,
                execution_time,
                cache_used,
                timestamp: timestamp.unwrap_or_default(),
            });
        }
        Ok(entries)
    }

    async fn health_check(&self) -> TierCacheResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| TierCacheError::ConnectionError {
                message: format!("SQLite健康检查失败: {}", e),
            })?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("SQLite连接池已关闭");
    }
}
