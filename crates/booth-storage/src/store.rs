//! Object store abstraction.

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};

/// Cache-Control for objects whose key never changes content.
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Options for a single put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: String,
    pub cache_control: Option<String>,
}

impl PutOptions {
    /// Write-once object, cacheable for a year.
    pub fn immutable(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            cache_control: Some(IMMUTABLE_CACHE_CONTROL.to_string()),
        }
    }
}

/// A durably written object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Public URL of the object
    pub url: String,
    /// Object key
    pub pathname: String,
}

/// An object read back with the metadata it was stored with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectData {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
}

/// Write-mostly blob storage keyed by path.
///
/// Puts are whole-object overwrites, so writing the same key twice leaves
/// one object.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Vec<u8>, options: PutOptions) -> StorageResult<StoredObject>;

    /// Read an object back.
    async fn get(&self, key: &str) -> StorageResult<ObjectData>;

    /// Cheap reachability check for readiness probes.
    async fn check_connectivity(&self) -> StorageResult<()>;

    /// Public URL an object is served from.
    fn public_url(&self, key: &str) -> String;
}

/// Reject keys that would escape their prefix or address nothing.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|s| s.is_empty() || s == "..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Join a public base URL and an object key.
pub fn join_public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("bg/current/1.jpg").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/bg/current/1.jpg").is_err());
        assert!(validate_key("backups//x.jpg").is_err());
        assert!(validate_key("backups/../bg/current/1.jpg").is_err());
    }

    #[test]
    fn test_join_public_url() {
        assert_eq!(
            join_public_url("https://cdn.example.com/", "bg/current/1.jpg"),
            "https://cdn.example.com/bg/current/1.jpg"
        );
        assert_eq!(join_public_url("https://cdn.example.com", "a.jpg"), "https://cdn.example.com/a.jpg");
    }
}
