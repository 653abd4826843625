use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 性能日志表名
pub const PERFORMANCE_LOG_TABLE: &str = "performance_log";

/// 被记录的操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Read,
    Write,
    BatchWrite,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Read => "read",
            OperationType::Write => "write",
            OperationType::BatchWrite => "batch_write",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(OperationType::Read),
            "write" => Some(OperationType::Write),
            "batch_write" => Some(OperationType::BatchWrite),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 性能日志条目，只追加写入持久化存储
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceLogEntry {
    pub operation_type: OperationType,
    /// 执行耗时（秒）
    pub execution_time: f64,
    /// 本次操作是否由缓存参与完成
    pub cache_used: bool,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceLogEntry {
    pub fn new(operation_type: OperationType, elapsed: Duration, cache_used: bool) -> Self {
        Self {
            operation_type,
            execution_time: elapsed.as_secs_f64(),
            cache_used,
            timestamp: Utc::now(),
        }
    }
}
