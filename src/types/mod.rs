//! 通用类型定义
//!
//! 定义记录、数据值、性能日志以及缓存/存储配置类型

pub mod database_config;
pub mod data_value;
pub mod record;
pub mod cache_config;
pub mod performance_log;

pub use database_config::{DatabaseConfig, ConnectionConfig, PoolConfig};
pub use data_value::{DataValue, json_value_to_data_value, parse_json_string_to_data_value};
pub use record::{ID_FIELD, Record};
pub use cache_config::{CacheConfig, CacheBackend};
pub use performance_log::{OperationType, PERFORMANCE_LOG_TABLE, PerformanceLogEntry};
