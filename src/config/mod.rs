//! # 配置管理模块
//!
//! 提供统一的配置管理系统，支持构建器模式、TOML/JSON 文件加载和链式配置。
//! 构建器要求所有配置项显式设置，便利函数提供常用默认值

pub mod builders;
pub mod convenience;
pub mod core;

pub use builders::{
    CacheConfigBuilder, DatabaseConfigBuilder, LoggingConfigBuilder, PoolConfigBuilder,
    TierCacheConfigBuilder,
};
pub use convenience::{
    default_cache_config, default_pool_config, default_tables, sqlite_config,
    sqlite_memory_database, DEFAULT_CACHE_TTL_SECS, DEFAULT_WRITE_BATCH_SIZE,
};
pub use self::core::{init_logging, LogLevel, LoggingConfig, TierCacheConfig};
