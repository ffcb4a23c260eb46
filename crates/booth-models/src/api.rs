//! JSON bodies exchanged between the capture client and the API.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Response of `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UploadResponse {
    pub ok: bool,
    pub version: Version,
}

/// Response of `POST /api/upload-video-chunk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChunkUploadResponse {
    pub ok: bool,
    pub url: String,
    pub pathname: String,
}

/// Pageview and unique-visitor readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VisitStats {
    pub pv: u64,
    pub uv: u64,
}
