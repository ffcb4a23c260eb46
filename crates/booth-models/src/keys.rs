//! Object-store key layout.
//!
//! ```text
//! bg/current/<version>.jpg
//! backups/<yyyy>/<mm>/<dd>/<id>.jpg
//! backups/videos/<yyyy>/<mm>/<dd>/<session>/<index>.<ext>
//! ```

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use crate::session::{ChunkIndex, SessionId};
use crate::version::Version;

/// UTC date rendered as `yyyy/mm/dd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePath {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DatePath {
    pub fn today() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
            day: at.day(),
        }
    }
}

impl std::fmt::Display for DatePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

/// Key of the web-sized current background.
pub fn current_image_key(version: Version) -> String {
    format!("bg/current/{}.jpg", version)
}

/// Key of a full-quality image backup.
pub fn backup_image_key(date: DatePath, id: Uuid) -> String {
    format!("backups/{}/{}.jpg", date, id)
}

/// Key of one recorded video chunk.
pub fn video_chunk_key(date: DatePath, session: &SessionId, index: ChunkIndex, ext: &str) -> String {
    format!("backups/videos/{}/{}/{}.{}", date, session, index, ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jan_5() -> DatePath {
        DatePath::from_datetime(Utc.with_ymd_and_hms(2024, 1, 5, 23, 59, 0).unwrap())
    }

    #[test]
    fn test_date_path_is_zero_padded() {
        assert_eq!(jan_5().to_string(), "2024/01/05");
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(current_image_key(Version(1700000000123)), "bg/current/1700000000123.jpg");

        let id = Uuid::nil();
        assert_eq!(
            backup_image_key(jan_5(), id),
            "backups/2024/01/05/00000000-0000-0000-0000-000000000000.jpg"
        );

        let session = SessionId::parse("abc123").unwrap();
        assert_eq!(
            video_chunk_key(jan_5(), &session, ChunkIndex(7), "webm"),
            "backups/videos/2024/01/05/abc123/7.webm"
        );
    }
}
