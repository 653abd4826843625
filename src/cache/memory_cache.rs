//! 进程内缓存后端
//!
//! 基于 DashMap 的分片哈希表，读取时惰性清理过期条目

use super::store::FastCache;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use rat_logger::debug;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// DashMap 内存缓存
#[derive(Debug)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    max_capacity: usize,
}

impl MemoryCache {
    pub fn new(max_capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_capacity: max_capacity.max(1),
        }
    }

    /// 当前条目数（含尚未清理的过期条目）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清理所有过期条目，返回清理数量
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// 容量已满时先清理过期条目，仍然不足则淘汰最早过期的条目
    fn make_room(&self) {
        if self.entries.len() < self.max_capacity {
            return;
        }
        let purged = self.purge_expired();
        if purged > 0 {
            debug!("内存缓存清理过期条目: {}", purged);
        }
        while self.entries.len() >= self.max_capacity {
            let victim = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().expires_at)
                .map(|entry| entry.key().clone());
            match victim {
                Some(key) => {
                    self.entries.remove(&key);
                    debug!("内存缓存容量已满，淘汰键: {}", key);
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl FastCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        if !self.entries.contains_key(key) {
            self.make_room();
        }
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired(now)))
    }

    /// 过期条目一并移除，但只统计仍然有效的条目
    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize> {
        let now = Instant::now();
        let mut deleted = 0;
        self.entries.retain(|key, entry| {
            if !key.starts_with(prefix) {
                return true;
            }
            if !entry.is_expired(now) {
                deleted += 1;
            }
            false
        });
        Ok(deleted)
    }

    async fn purge_expired(&self) -> Result<usize> {
        Ok(MemoryCache::purge_expired(self))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new(16);
        cache
            .set("users:1", Bytes::from_static(b"alice"), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            cache.get("users:1").await.unwrap(),
            Some(Bytes::from_static(b"alice"))
        );
        assert!(cache.delete("users:1").await.unwrap());
        assert!(!cache.delete("users:1").await.unwrap());
        assert_eq!(cache.get("users:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new(16);
        cache
            .set("users:1", Bytes::from_static(b"alice"), Duration::from_millis(50))
            .await
            .unwrap();
        assert!(cache.get("users:1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get("users:1").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_prefix() {
        let cache = MemoryCache::new(16);
        let ttl = Duration::from_secs(60);
        cache.set("users:1", Bytes::from_static(b"a"), ttl).await.unwrap();
        cache.set("users:2", Bytes::from_static(b"b"), ttl).await.unwrap();
        cache.set("products:1", Bytes::from_static(b"c"), ttl).await.unwrap();

        assert_eq!(cache.delete_by_prefix("users:").await.unwrap(), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("products:1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_entries_are_not_counted_as_deleted() {
        let cache = MemoryCache::new(64);
        for id in 0..10 {
            cache
                .set(&format!("users:{}", id), Bytes::from_static(b"u"), Duration::from_millis(20))
                .await
                .unwrap();
        }
        cache
            .set("users:live", Bytes::from_static(b"u"), Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!cache.delete("users:0").await.unwrap());
        assert_eq!(cache.delete_by_prefix("users:").await.unwrap(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_evicts_earliest_expiry() {
        let cache = MemoryCache::new(2);
        cache.set("a", Bytes::from_static(b"1"), Duration::from_secs(10)).await.unwrap();
        cache.set("b", Bytes::from_static(b"2"), Duration::from_secs(60)).await.unwrap();
        cache.set("c", Bytes::from_static(b"3"), Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert!(cache.get("b").await.unwrap().is_some());
        assert!(cache.get("c").await.unwrap().is_some());
    }
}
