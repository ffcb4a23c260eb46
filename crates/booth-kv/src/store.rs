//! Key-value store abstraction.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::KvResult;

/// The handful of Redis primitives the site relies on.
///
/// Each call is atomic on the server side; callers never lock.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// All fields of a hash; empty when the key does not exist.
    async fn hgetall(&self, key: &str) -> KvResult<HashMap<String, String>>;

    /// Increment a counter by one and return the new value.
    async fn incr(&self, key: &str) -> KvResult<u64>;

    /// Raise a counter to `max(at_least, current + 1)` and return it.
    ///
    /// Two callers never get the same value back.
    async fn advance(&self, key: &str, at_least: u64) -> KvResult<u64>;

    /// Write `fields` into a hash only if `guard` is greater than the number
    /// stored under `guard_field`. A missing or unparsable guard field
    /// always loses. Returns whether the write happened.
    async fn hset_if_newer(
        &self,
        key: &str,
        guard_field: &str,
        guard: u64,
        fields: &[(&str, String)],
    ) -> KvResult<bool>;

    /// Read a counter, `None` when unset.
    async fn get_u64(&self, key: &str) -> KvResult<Option<u64>>;

    /// Add a member to a HyperLogLog; `true` if the estimate changed.
    async fn pfadd(&self, key: &str, member: &str) -> KvResult<bool>;

    /// Approximate cardinality of a HyperLogLog.
    async fn pfcount(&self, key: &str) -> KvResult<u64>;

    /// Round-trip for readiness probes.
    async fn ping(&self) -> KvResult<()>;
}
