//! Object serving for the in-memory store.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use booth_storage::store::validate_key;
use booth_storage::StorageError;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Serve a stored object with the content type it was written with.
///
/// Public URLs handed out by the memory store point here. With R2 the
/// objects live behind the bucket's own domain and this route only
/// proxies reads.
pub async fn serve_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Response> {
    let key = key.trim_start_matches('/');
    if validate_key(key).is_err() {
        return Err(ApiError::not_found("Object not found"));
    }

    let object = state.storage.get(key).await.map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found("Object not found"),
        other => ApiError::Storage(other),
    })?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            object.content_type.as_deref().unwrap_or(FALLBACK_CONTENT_TYPE),
        )
        .header(header::CONTENT_LENGTH, object.data.len());
    if let Some(cache_control) = &object.cache_control {
        builder = builder.header(header::CACHE_CONTROL, cache_control);
    }

    builder
        .body(Body::from(object.data))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
}
