//! Redis-backed KV store.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{KvError, KvResult};
use crate::store::KvStore;

// Lua numbers are doubles; `%.0f` keeps SET from storing `1.7e+12`.
const ADVANCE_SCRIPT: &str = r#"
local current = tonumber(redis.call('GET', KEYS[1]) or '0') or 0
local next = math.max(tonumber(ARGV[1]), current + 1)
redis.call('SET', KEYS[1], string.format('%.0f', next))
return next
"#;

const HSET_IF_NEWER_SCRIPT: &str = r#"
local current = tonumber(redis.call('HGET', KEYS[1], ARGV[1]) or '')
if current and tonumber(ARGV[2]) <= current then
    return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV, 3))
return 1
"#;

/// Redis configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (`redis://` or `rediss://`)
    pub redis_url: String,
}

impl RedisConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        }
    }
}

/// KV store on a shared multiplexed Redis connection.
pub struct RedisKv {
    client: redis::Client,
    conn: OnceCell<MultiplexedConnection>,
}

impl RedisKv {
    /// Create a new store. The connection is opened lazily on first use.
    pub fn new(config: RedisConfig) -> KvResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())
            .map_err(|e| KvError::connection_failed(e.to_string()))?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> KvResult<Self> {
        Self::new(RedisConfig::from_env())
    }

    async fn connection(&self) -> KvResult<MultiplexedConnection> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let conn = self.client.get_multiplexed_async_connection().await?;
                info!("Connected to Redis");
                Ok::<_, KvError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl KvStore for RedisKv {
    async fn hgetall(&self, key: &str) -> KvResult<HashMap<String, String>> {
        let mut conn = self.connection().await?;
        Ok(conn.hgetall(key).await?)
    }

    async fn incr(&self, key: &str) -> KvResult<u64> {
        let mut conn = self.connection().await?;
        Ok(conn.incr(key, 1u64).await?)
    }

    async fn advance(&self, key: &str, at_least: u64) -> KvResult<u64> {
        let mut conn = self.connection().await?;
        let script = Script::new(ADVANCE_SCRIPT);
        let value: u64 = script
            .key(key)
            .arg(at_least)
            .invoke_async(&mut conn)
            .await?;
        debug!("Advanced {} to {}", key, value);
        Ok(value)
    }

    async fn hset_if_newer(
        &self,
        key: &str,
        guard_field: &str,
        guard: u64,
        fields: &[(&str, String)],
    ) -> KvResult<bool> {
        let mut conn = self.connection().await?;
        debug!("HSET {} if {} > {} ({} fields)", key, guard_field, guard, fields.len());
        let script = Script::new(HSET_IF_NEWER_SCRIPT);
        let mut invocation = script.key(key);
        invocation.arg(guard_field).arg(guard);
        for (field, value) in fields {
            invocation.arg(*field).arg(value.as_str());
        }
        let written: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(written == 1)
    }

    async fn get_u64(&self, key: &str) -> KvResult<Option<u64>> {
        let mut conn = self.connection().await?;
        Ok(conn.get(key).await?)
    }

    async fn pfadd(&self, key: &str, member: &str) -> KvResult<bool> {
        let mut conn = self.connection().await?;
        Ok(conn.pfadd(key, member).await?)
    }

    async fn pfcount(&self, key: &str) -> KvResult<u64> {
        let mut conn = self.connection().await?;
        Ok(conn.pfcount(key).await?)
    }

    async fn ping(&self) -> KvResult<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
