//! Backup recorder negotiation.

use std::time::Duration;

/// Container and codec combinations to try, most preferred first.
pub const MIME_PREFERENCES: [&str; 7] = [
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm;codecs=vp9",
    "video/webm;codecs=vp8",
    "video/webm",
    "video/mp4;codecs=avc1",
    "video/mp4",
];

/// Pixel size of the negotiated camera stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn long_edge(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// First preferred type the device can record, if any.
pub fn negotiate_mime(is_supported: impl Fn(&str) -> bool) -> Option<&'static str> {
    MIME_PREFERENCES.iter().copied().find(|mime| is_supported(mime))
}

/// Encoder settings for one recording session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderSettings {
    pub mime_type: &'static str,
    pub bits_per_second: u32,
    /// How often the recorder hands over a chunk
    pub timeslice: Duration,
}

impl RecorderSettings {
    /// Pick bitrate and chunk interval from the stream's long edge.
    ///
    /// Higher bitrates get shorter chunks so each stays well under the
    /// server's per-chunk ceiling.
    pub fn for_resolution(resolution: Resolution, mime_type: &'static str) -> Self {
        let (bits_per_second, secs) = match resolution.long_edge() {
            e if e >= 3840 => (18_000_000, 4),
            e if e >= 2560 => (12_000_000, 5),
            e if e >= 1920 => (8_000_000, 6),
            e if e >= 1280 => (5_000_000, 8),
            _ => (2_500_000, 10),
        };

        Self {
            mime_type,
            bits_per_second,
            timeslice: Duration::from_secs(secs),
        }
    }
}
