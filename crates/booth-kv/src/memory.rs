//! In-process KV store for local runs and tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::KvResult;
use crate::store::KvStore;

#[derive(Default)]
struct Inner {
    hashes: HashMap<String, HashMap<String, String>>,
    counters: HashMap<String, u64>,
    // Exact sets stand in for HyperLogLogs; zero error is within any bound.
    sets: HashMap<String, HashSet<String>>,
}

/// KV store backed by maps behind one mutex.
#[derive(Default)]
pub struct MemoryKv {
    inner: Mutex<Inner>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn hgetall(&self, key: &str) -> KvResult<HashMap<String, String>> {
        let inner = self.inner.lock().await;
        Ok(inner.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn incr(&self, key: &str) -> KvResult<u64> {
        let mut inner = self.inner.lock().await;
        let counter = inner.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn advance(&self, key: &str, at_least: u64) -> KvResult<u64> {
        let mut inner = self.inner.lock().await;
        let counter = inner.counters.entry(key.to_string()).or_insert(0);
        *counter = at_least.max(counter.saturating_add(1));
        Ok(*counter)
    }

    async fn hset_if_newer(
        &self,
        key: &str,
        guard_field: &str,
        guard: u64,
        fields: &[(&str, String)],
    ) -> KvResult<bool> {
        let mut inner = self.inner.lock().await;
        let hash = inner.hashes.entry(key.to_string()).or_default();
        let current = hash.get(guard_field).and_then(|v| v.trim().parse::<u64>().ok());
        if current.is_some_and(|current| guard <= current) {
            return Ok(false);
        }
        for (field, value) in fields {
            hash.insert(field.to_string(), value.clone());
        }
        Ok(true)
    }

    async fn get_u64(&self, key: &str) -> KvResult<Option<u64>> {
        let inner = self.inner.lock().await;
        Ok(inner.counters.get(key).copied())
    }

    async fn pfadd(&self, key: &str, member: &str) -> KvResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn pfcount(&self, key: &str) -> KvResult<u64> {
        let inner = self.inner.lock().await;
        Ok(inner.sets.get(key).map_or(0, |s| s.len() as u64))
    }

    async fn ping(&self) -> KvResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_advance_never_repeats() {
        let kv = MemoryKv::new();
        assert_eq!(kv.advance("v", 1_000).await.unwrap(), 1_000);
        // Same floor twice still moves forward
        assert_eq!(kv.advance("v", 1_000).await.unwrap(), 1_001);
        // A lower floor cannot pull the counter back
        assert_eq!(kv.advance("v", 10).await.unwrap(), 1_002);
        assert_eq!(kv.advance("v", 5_000).await.unwrap(), 5_000);
        assert_eq!(kv.get_u64("v").await.unwrap(), Some(5_000));
    }

    #[tokio::test]
    async fn test_advance_under_contention() {
        let kv = std::sync::Arc::new(MemoryKv::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let kv = std::sync::Arc::clone(&kv);
                tokio::spawn(async move { kv.advance("v", 1_000).await.unwrap() })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            assert!(seen.insert(handle.await.unwrap()));
        }
        assert_eq!(seen.len(), 16);
    }

    #[tokio::test]
    async fn test_hset_if_newer_rejects_stale_writes() {
        let kv = MemoryKv::new();
        let write = |v: u64| vec![("version", v.to_string()), ("url", format!("u{}", v))];

        assert!(kv.hset_if_newer("h", "version", 5, &write(5)).await.unwrap());
        assert!(!kv.hset_if_newer("h", "version", 3, &write(3)).await.unwrap());
        assert!(!kv.hset_if_newer("h", "version", 5, &write(5)).await.unwrap());
        assert!(kv.hset_if_newer("h", "version", 9, &write(9)).await.unwrap());

        let hash = kv.hgetall("h").await.unwrap();
        assert_eq!(hash.get("version").map(String::as_str), Some("9"));
        assert_eq!(hash.get("url").map(String::as_str), Some("u9"));
    }

    #[tokio::test]
    async fn test_hset_if_newer_overwrites_garbled_guard() {
        let kv = MemoryKv::new();
        kv.inner
            .lock()
            .await
            .hashes
            .entry("h".to_string())
            .or_default()
            .insert("version".to_string(), "nope".to_string());
        assert!(kv.hset_if_newer("h", "version", 1, &[("version", "1".to_string())]).await.unwrap());
    }
}
