//! # 配置构建器模块
//!
//! 所有构建器都要求必需项显式设置，`build()` 时统一校验

pub mod cache_builder;
pub mod database_builder;
pub mod global_builder;
pub mod logging_builder;
pub mod pool_builder;

pub use cache_builder::CacheConfigBuilder;
pub use database_builder::DatabaseConfigBuilder;
pub use global_builder::TierCacheConfigBuilder;
pub use logging_builder::LoggingConfigBuilder;
pub use pool_builder::PoolConfigBuilder;
