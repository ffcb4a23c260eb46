//! Application state.

use std::sync::Arc;

use booth_kv::{KvStore, MemoryKv, PointerRepository, RedisKv, VisitCounter};
use booth_storage::{MemoryStore, ObjectStore, R2Client};
use tracing::{info, warn};

use crate::config::{ApiConfig, KvBackend, StorageBackend};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<dyn ObjectStore>,
    pub kv: Arc<dyn KvStore>,
    pub pointers: PointerRepository,
    pub visits: VisitCounter,
}

impl AppState {
    /// Create new application state, connecting the configured backends.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let storage: Arc<dyn ObjectStore> = match config.storage_backend {
            StorageBackend::R2 => Arc::new(R2Client::from_env().await?),
            StorageBackend::Memory => {
                let base_url = config.memory_objects_url();
                warn!(base_url = %base_url, "Using in-memory object store; uploads are lost on restart");
                Arc::new(MemoryStore::with_base_url(base_url))
            }
        };

        let kv: Arc<dyn KvStore> = match config.kv_backend {
            KvBackend::Redis => Arc::new(RedisKv::from_env()?),
            KvBackend::Memory => {
                warn!("Using in-memory KV store; counters are lost on restart");
                Arc::new(MemoryKv::new())
            }
        };

        let memory_backed =
            config.storage_backend == StorageBackend::Memory || config.kv_backend == KvBackend::Memory;
        if config.is_production() && memory_backed {
            warn!("In-memory backend selected in production; data will not survive a restart");
        }

        info!(
            storage = ?config.storage_backend,
            kv = ?config.kv_backend,
            "Backends configured"
        );

        Ok(Self::with_backends(config, storage, kv))
    }

    /// Assemble state around already-built backends.
    pub fn with_backends(config: ApiConfig, storage: Arc<dyn ObjectStore>, kv: Arc<dyn KvStore>) -> Self {
        Self {
            config,
            pointers: PointerRepository::new(Arc::clone(&kv)),
            visits: VisitCounter::new(Arc::clone(&kv)),
            storage,
            kv,
        }
    }
}
