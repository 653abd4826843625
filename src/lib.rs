//! rat_tiercache - 双层写穿透缓存
//!
//! 快速缓存（带TTL的内存缓存）位于持久化存储（SQLite）之前：
//! 读操作优先命中缓存，未命中时读穿透并回填；写操作先提交持久化存储，
//! 再写入缓存。持久化存储始终是数据的权威来源

// 导出所有公共模块
pub mod error;
pub mod types;
pub mod table;
pub mod security;
pub mod cache;
pub mod adapter;
pub mod manager;
pub mod config;

// 重新导出常用类型和函数
pub use error::{TierCacheError, TierCacheResult};
pub use types::*;
pub use table::{ColumnDefinition, ColumnType, TableSchema};
pub use cache::{CacheKey, CacheStats, FastCache, MemoryCache, RatMemCacheStore, create_cache};
pub use adapter::{DurableStore, SqliteStore, create_store};
pub use manager::{BatchFailure, BatchWriteReport, CacheManager, WrittenRecord};
pub use config::{
    CacheConfigBuilder, DatabaseConfigBuilder, LogLevel, LoggingConfig, LoggingConfigBuilder,
    PoolConfigBuilder, TierCacheConfig, TierCacheConfigBuilder, init_logging, sqlite_config,
};

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
