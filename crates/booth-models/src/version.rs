//! Background version numbers.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Monotonic background version, in milliseconds since the Unix epoch.
///
/// Used both as the filename of the current image and as a cache-busting
/// token on the background redirect.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    /// Current wall-clock time as a version.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis().max(0) as u64)
    }

    /// Next version after `previous`, given the current time in milliseconds.
    ///
    /// Always strictly greater than `previous`, even when the clock stalls
    /// or steps backwards. Saturates at `u64::MAX`.
    pub fn next_after(previous: Option<Version>, now_ms: u64) -> Self {
        match previous {
            Some(prev) if prev.0 >= now_ms => Self(prev.0.saturating_add(1)),
            _ => Self(now_ms),
        }
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Version {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
