//! Key-value records for the photobooth site.
//!
//! This crate provides:
//! - The `KvStore` trait over the Redis primitives in use
//! - A Redis backend and an in-memory backend
//! - The background pointer repository and visit counters

pub mod background;
pub mod client;
pub mod error;
pub mod memory;
pub mod store;
pub mod visits;

pub use background::PointerRepository;
pub use client::{RedisConfig, RedisKv};
pub use error::{KvError, KvResult};
pub use memory::MemoryKv;
pub use store::KvStore;
pub use visits::VisitCounter;
