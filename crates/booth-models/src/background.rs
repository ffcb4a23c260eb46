//! Current background pointer.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::version::Version;

/// KV hash holding the current background pointer.
pub const BG_CURRENT_KEY: &str = "bg:current";

/// KV counter holding the last version handed to an upload.
pub const BG_VERSION_KEY: &str = "bg:version";

/// Pointer hash field holding the version; publishes compare against it.
pub const POINTER_VERSION_FIELD: &str = "version";

const FIELD_URL: &str = "url";
const FIELD_VERSION: &str = POINTER_VERSION_FIELD;
const FIELD_UPDATED_AT: &str = "updatedAt";

/// Pointer from "the current background" to a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundPointer {
    /// Public URL of the stored image
    pub url: String,
    /// Version embedded in the object path
    pub version: Version,
    /// Update time in milliseconds since the Unix epoch
    pub updated_at: u64,
}

impl BackgroundPointer {
    pub fn new(url: impl Into<String>, version: Version) -> Self {
        Self {
            url: url.into(),
            version,
            updated_at: version.as_u64(),
        }
    }

    /// Hash fields as written to the KV store.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (FIELD_URL, self.url.clone()),
            (FIELD_VERSION, self.version.to_string()),
            (FIELD_UPDATED_AT, self.updated_at.to_string()),
        ]
    }

    /// Rebuild from hash fields.
    ///
    /// Returns `None` when the hash is empty or has no usable `url`, which
    /// readers treat as "no background set". A missing or garbled version
    /// falls back to 0 so the pointer still resolves.
    pub fn from_fields(fields: &HashMap<String, String>) -> Option<Self> {
        let url = fields.get(FIELD_URL).filter(|u| !u.trim().is_empty())?;
        let version = fields
            .get(FIELD_VERSION)
            .and_then(|v| v.parse::<Version>().ok())
            .unwrap_or(Version(0));
        let updated_at = fields
            .get(FIELD_UPDATED_AT)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(version.as_u64());

        Some(Self {
            url: url.clone(),
            version,
            updated_at,
        })
    }
}
