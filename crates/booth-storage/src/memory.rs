//! In-process object store for local runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::store::{join_public_url, validate_key, ObjectData, ObjectStore, PutOptions, StoredObject};

/// Base URL when the store is not told where it is served from.
pub const MEMORY_BASE_URL: &str = "http://localhost:8000/objects";

/// An object held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    pub data: Vec<u8>,
    pub options: PutOptions,
}

/// Object store backed by a map.
pub struct MemoryStore {
    objects: RwLock<HashMap<String, MemoryObject>>,
    public_base_url: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_base_url(MEMORY_BASE_URL)
    }

    /// Store whose public URLs start with `base`, usually the API's own
    /// object route.
    pub fn with_base_url(base: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            public_base_url: base.into(),
        }
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Keys with the given prefix, sorted.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let objects = self.objects.read().await;
        let mut keys: Vec<String> = objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Full object, including put options.
    pub async fn object(&self, key: &str) -> Option<MemoryObject> {
        self.objects.read().await.get(key).cloned()
    }

    /// Map a public URL produced by this store back to its key.
    pub fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let base = self.public_base_url.trim_end_matches('/');
        url.strip_prefix(base)?.strip_prefix('/')
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, data: Vec<u8>, options: PutOptions) -> StorageResult<StoredObject> {
        validate_key(key)?;
        self.objects
            .write()
            .await
            .insert(key.to_string(), MemoryObject { data, options });

        Ok(StoredObject {
            url: self.public_url(key),
            pathname: key.to_string(),
        })
    }

    async fn get(&self, key: &str) -> StorageResult<ObjectData> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| ObjectData {
                data: o.data.clone(),
                content_type: Some(o.options.content_type.clone()),
                cache_control: o.options.cache_control.clone(),
            })
            .ok_or_else(|| StorageError::not_found(key))
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(&self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let store = MemoryStore::new();
        store
            .put("backups/videos/s/0.webm", vec![1], PutOptions::immutable("video/webm"))
            .await
            .unwrap();
        let stored = store
            .put("backups/videos/s/0.webm", vec![2, 3], PutOptions::immutable("video/webm"))
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        let object = store.get("backups/videos/s/0.webm").await.unwrap();
        assert_eq!(object.data, vec![2, 3]);
        assert_eq!(object.content_type.as_deref(), Some("video/webm"));
        assert_eq!(store.key_for_url(&stored.url), Some("backups/videos/s/0.webm"));
    }

    #[tokio::test]
    async fn test_base_url_prefixes_public_urls() {
        let store = MemoryStore::with_base_url("http://booth.local:3000/objects/");
        let stored = store
            .put("bg/current/1.jpg", vec![1], PutOptions::immutable("image/jpeg"))
            .await
            .unwrap();
        assert_eq!(stored.url, "http://booth.local:3000/objects/bg/current/1.jpg");
        assert_eq!(store.key_for_url(&stored.url), Some("bg/current/1.jpg"));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.get("nope.jpg").await, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_key_is_rejected() {
        let store = MemoryStore::new();
        let result = store.put("../x", vec![], PutOptions::immutable("image/jpeg")).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
        assert!(store.is_empty().await);
    }
}
