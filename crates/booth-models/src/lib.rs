//! Shared data models for the photobooth backend.
//!
//! This crate provides Serde-serializable types for:
//! - The current background pointer and its version
//! - Object-store key layout for images and video chunks
//! - Recording session identifiers and chunk media types
//! - JSON response bodies shared by the API and the capture client

pub mod api;
pub mod background;
pub mod keys;
pub mod media_type;
pub mod session;
pub mod version;

pub use api::{ChunkUploadResponse, UploadResponse, VisitStats};
pub use background::{BackgroundPointer, BG_CURRENT_KEY, BG_VERSION_KEY, POINTER_VERSION_FIELD};
pub use keys::{backup_image_key, current_image_key, video_chunk_key, DatePath};
pub use media_type::VideoMediaType;
pub use session::{ChunkIndex, SessionId, SessionIdError};
pub use version::Version;

/// KV key for the total pageview counter.
pub const STATS_PV_KEY: &str = "stats:pv";

/// KV key for the approximate unique-visitor set.
pub const STATS_UV_KEY: &str = "stats:uv";
