//! Media types of recorded video chunks.

/// Media type declared for a video chunk, e.g. `video/webm;codecs=vp9`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMediaType {
    essence: String,
}

impl VideoMediaType {
    /// Fallback when a client declares nothing.
    pub const DEFAULT: &'static str = "video/webm";

    /// Parse a declared media type, dropping codec parameters.
    pub fn parse(declared: &str) -> Self {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence.is_empty() {
            Self::default()
        } else {
            Self { essence }
        }
    }

    /// Base type without parameters, used as the stored content type.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// File extension for the stored object.
    pub fn extension(&self) -> &'static str {
        match self.essence.as_str() {
            "video/webm" | "audio/webm" => "webm",
            "video/mp4" | "audio/mp4" => "mp4",
            "video/quicktime" => "mov",
            "video/x-matroska" => "mkv",
            _ => "bin",
        }
    }
}

impl Default for VideoMediaType {
    fn default() -> Self {
        Self {
            essence: Self::DEFAULT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_ignores_codecs() {
        let t = VideoMediaType::parse("video/webm;codecs=vp9,opus");
        assert_eq!(t.essence(), "video/webm");
        assert_eq!(t.extension(), "webm");

        assert_eq!(VideoMediaType::parse("Video/MP4; codecs=avc1").extension(), "mp4");
        assert_eq!(VideoMediaType::parse("video/quicktime").extension(), "mov");
        assert_eq!(VideoMediaType::parse("application/octet-stream").extension(), "bin");
    }

    #[test]
    fn test_empty_declaration_defaults_to_webm() {
        assert_eq!(VideoMediaType::parse("  "), VideoMediaType::default());
        assert_eq!(VideoMediaType::parse("").extension(), "webm");
    }
}
