//! 快速缓存层
//!
//! 提供带 TTL 的键值缓存抽象以及两种实现：进程内 DashMap 缓存和基于
//! rat_memcache 的 L1 内存缓存。缓存条目随时可能因过期或淘汰而消失，
//! 调用方必须把"不存在"当作普通的未命中处理。

pub mod store;
pub mod memory_cache;
pub mod rat_cache;
pub mod key_generator;
pub mod stats;

pub use store::{FastCache, create_cache};
pub use memory_cache::MemoryCache;
pub use rat_cache::RatMemCacheStore;
pub use key_generator::CacheKey;
pub use stats::{CacheStats, StatsTracker};
