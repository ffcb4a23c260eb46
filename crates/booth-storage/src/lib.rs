//! Object storage for the photobooth.
//!
//! This crate provides:
//! - The `ObjectStore` trait used by the API handlers
//! - A Cloudflare R2 backend (S3 API)
//! - An in-memory backend for local runs and tests

pub mod client;
pub mod error;
pub mod memory;
pub mod store;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
pub use memory::{MemoryObject, MemoryStore};
pub use store::{ObjectData, ObjectStore, PutOptions, StoredObject, IMMUTABLE_CACHE_CONTROL};
