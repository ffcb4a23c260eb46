//! API configuration.

use std::str::FromStr;
use std::time::Duration;

use booth_media::StillConfig;

/// Which object store backs uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    R2,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "r2" | "s3" => Ok(Self::R2),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

/// Which KV store holds the pointer and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvBackend {
    Redis,
    Memory,
}

impl FromStr for KvBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown kv backend: {}", other)),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second, per client IP
    pub rate_limit_rps: u32,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// Max size of one video chunk
    pub chunk_max_bytes: usize,
    /// Still-image output settings
    pub still: StillConfig,
    /// Object store backend
    pub storage_backend: StorageBackend,
    /// KV backend
    pub kv_backend: KvBackend,
    /// Externally reachable origin of this server, e.g.
    /// `https://booth.example.com`. Derived from host and port when unset.
    pub public_base_url: Option<String>,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            request_timeout: Duration::from_secs(30),
            max_body_size: 32 * 1024 * 1024, // 32MB
            chunk_max_bytes: 15 * 1024 * 1024, // 15MB, ~4s of 4K at 18 Mbps plus headroom
            still: StillConfig::default(),
            storage_backend: StorageBackend::Memory,
            kv_backend: KvBackend::Memory,
            public_base_url: None,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_parse("API_PORT").unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: env_parse("RATE_LIMIT_RPS").unwrap_or(defaults.rate_limit_rps),
            request_timeout: env_parse("REQUEST_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_body_size: env_parse("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
            chunk_max_bytes: env_parse("CHUNK_MAX_BYTES").unwrap_or(defaults.chunk_max_bytes),
            still: StillConfig {
                max_width: env_parse("BG_MAX_WIDTH").unwrap_or(defaults.still.max_width),
                ..defaults.still
            },
            storage_backend: env_parse("STORAGE_BACKEND").unwrap_or(StorageBackend::R2),
            kv_backend: env_parse("KV_BACKEND").unwrap_or(KvBackend::Redis),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Origin this server is reachable at, without a trailing slash.
    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim().trim_end_matches('/').to_string(),
            None => {
                let host = match self.host.as_str() {
                    "0.0.0.0" | "::" | "[::]" => "localhost",
                    host => host,
                };
                format!("http://{}:{}", host, self.port)
            }
        }
    }

    /// Base URL the in-memory store hands out, served by the object route.
    pub fn memory_objects_url(&self) -> String {
        format!("{}/objects", self.public_base_url())
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("R2".parse::<StorageBackend>(), Ok(StorageBackend::R2));
        assert_eq!(" memory ".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert!("ftp".parse::<StorageBackend>().is_err());
        assert_eq!("redis".parse::<KvBackend>(), Ok(KvBackend::Redis));
    }

    #[test]
    fn test_public_base_url() {
        let mut config = ApiConfig {
            port: 3000,
            ..ApiConfig::default()
        };
        assert_eq!(config.public_base_url(), "http://localhost:3000");
        assert_eq!(config.memory_objects_url(), "http://localhost:3000/objects");

        config.host = "127.0.0.1".to_string();
        assert_eq!(config.public_base_url(), "http://127.0.0.1:3000");

        config.public_base_url = Some("https://booth.example.com/".to_string());
        assert_eq!(config.memory_objects_url(), "https://booth.example.com/objects");
    }

    #[test]
    fn test_production_flag() {
        let mut config = ApiConfig::default();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
    }

    #[test]
    fn test_chunk_ceiling_fits_in_body_limit() {
        let config = ApiConfig::default();
        assert!(config.chunk_max_bytes < config.max_body_size);
    }
}
