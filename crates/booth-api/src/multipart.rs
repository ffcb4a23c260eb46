//! Multipart form collection for upload handlers.

use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Form field carrying the uploaded bytes.
pub const FILE_FIELD: &str = "file";

/// Text fields longer than this are ignored.
const MAX_TEXT_FIELD_BYTES: usize = 1024;

/// The uploaded file part.
#[derive(Debug, Default)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    /// Total size seen, including bytes dropped past the size cap
    pub size: usize,
    /// The part exceeded the cap and `bytes` was discarded
    pub oversized: bool,
}

impl FilePart {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
            .unwrap_or(false)
    }
}

/// A collected multipart form.
#[derive(Debug, Default)]
pub struct FormData {
    pub file: Option<FilePart>,
    fields: HashMap<String, String>,
}

impl FormData {
    /// Move the file part out of the form.
    pub fn take_file(&mut self) -> Option<FilePart> {
        self.file.take()
    }

    /// Trimmed text field, `None` if absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Read every part of `multipart`.
///
/// The first part carrying a filename is the file; a `file` part with
/// only a content type also counts. Later file parts are drained. When
/// `max_file_bytes` is set, a larger file is drained without being
/// buffered and flagged `oversized`.
pub async fn read_form(mut multipart: Multipart, max_file_bytes: Option<usize>) -> ApiResult<FormData> {
    let mut form = FormData::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some() || (name == FILE_FIELD && field.content_type().is_some());

        if is_file && form.file.is_some() {
            while field.chunk().await.map_err(multipart_error)?.is_some() {}
            continue;
        }

        if is_file {
            let mut part = FilePart {
                file_name: field.file_name().map(str::to_string),
                content_type: field.content_type().map(str::to_string),
                ..FilePart::default()
            };

            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                part.size += chunk.len();
                if part.oversized {
                    continue;
                }
                if max_file_bytes.is_some_and(|max| part.size > max) {
                    part.oversized = true;
                    part.bytes = Vec::new();
                    continue;
                }
                part.bytes.extend_from_slice(&chunk);
            }

            debug!(size = part.size, oversized = part.oversized, "Read file part");
            form.file = Some(part);
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            if value.len() <= MAX_TEXT_FIELD_BYTES {
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}
