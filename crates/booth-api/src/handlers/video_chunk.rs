//! Video backup chunk handler.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use booth_models::{video_chunk_key, ChunkIndex, ChunkUploadResponse, DatePath, SessionId, VideoMediaType};
use booth_storage::PutOptions;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::multipart::read_form;
use crate::state::AppState;

/// Store one chunk of a continuous recording.
///
/// Chunks are keyed by date, session and index; replaying the same pair
/// overwrites the earlier object.
pub async fn upload_video_chunk(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ChunkUploadResponse>> {
    let multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let mut form = read_form(multipart, Some(state.config.chunk_max_bytes)).await?;

    let Some(file) = form.take_file() else {
        metrics::record_upload_rejected("video_chunk", "missing_file");
        return Err(ApiError::bad_request("missing file"));
    };

    let (Some(session), Some(idx)) = (form.text("session"), form.text("idx")) else {
        metrics::record_upload_rejected("video_chunk", "missing_ids");
        return Err(ApiError::bad_request("missing session/idx"));
    };

    if file.oversized {
        metrics::record_upload_rejected("video_chunk", "too_large");
        return Err(ApiError::payload_too_large("chunk too large"));
    }

    let (Ok(session), Ok(index)) = (SessionId::parse(session), idx.parse::<ChunkIndex>()) else {
        metrics::record_upload_rejected("video_chunk", "invalid_ids");
        return Err(ApiError::bad_request("invalid session/idx"));
    };

    let declared = form
        .text("type")
        .or(file.content_type.as_deref())
        .unwrap_or(VideoMediaType::DEFAULT);
    let media_type = VideoMediaType::parse(declared);

    let key = video_chunk_key(DatePath::today(), &session, index, media_type.extension());
    let size = file.size;

    let stored = state
        .storage
        .put(&key, file.bytes, PutOptions::immutable(media_type.essence()))
        .await?;

    metrics::record_chunk_stored(media_type.extension(), size);
    debug!(session = %session, index = %index, bytes = size, "Stored video chunk");

    Ok(Json(ChunkUploadResponse {
        ok: true,
        url: stored.url,
        pathname: stored.pathname,
    }))
}
