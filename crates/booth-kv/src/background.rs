//! Current background pointer record.

use std::sync::Arc;

use booth_models::{BackgroundPointer, Version, BG_CURRENT_KEY, BG_VERSION_KEY, POINTER_VERSION_FIELD};
use tracing::{debug, info};

use crate::error::KvResult;
use crate::store::KvStore;

/// Reads and publishes the `bg:current` hash and hands out versions.
#[derive(Clone)]
pub struct PointerRepository {
    kv: Arc<dyn KvStore>,
}

impl PointerRepository {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Current pointer, `None` when no background was ever set.
    pub async fn current(&self) -> KvResult<Option<BackgroundPointer>> {
        let fields = self.kv.hgetall(BG_CURRENT_KEY).await?;
        Ok(BackgroundPointer::from_fields(&fields))
    }

    /// Reserve the version for a new upload.
    ///
    /// Concurrent callers always get distinct versions, each greater than
    /// the published pointer and every earlier allocation.
    pub async fn allocate_version(&self, now_ms: u64) -> KvResult<Version> {
        let previous = self.current().await?.map(|p| p.version);
        let candidate = Version::next_after(previous, now_ms);
        let allocated = self.kv.advance(BG_VERSION_KEY, candidate.as_u64()).await?;
        Ok(Version(allocated))
    }

    /// Replace the pointer unless a newer one is already published.
    ///
    /// Returns `false` when a later upload won the race.
    pub async fn publish(&self, pointer: &BackgroundPointer) -> KvResult<bool> {
        let written = self
            .kv
            .hset_if_newer(
                BG_CURRENT_KEY,
                POINTER_VERSION_FIELD,
                pointer.version.as_u64(),
                &pointer.to_fields(),
            )
            .await?;
        if written {
            info!(version = %pointer.version, url = %pointer.url, "Published background pointer");
        } else {
            debug!(version = %pointer.version, "Skipped stale background pointer");
        }
        Ok(written)
    }
}
