//! Still-image upload handler.

use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use booth_media::process_still;
use booth_models::{backup_image_key, current_image_key, BackgroundPointer, DatePath, UploadResponse, Version};
use booth_storage::PutOptions;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::multipart::read_form;
use crate::state::AppState;

const JPEG: &str = "image/jpeg";

/// Replace the site background with an uploaded photo.
///
/// Both variants are stored before the pointer moves, so a reader never
/// sees a pointer to a missing object.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let form = read_form(multipart, None).await?;

    let Some(file) = form.file else {
        metrics::record_upload_rejected("upload", "missing_file");
        return Err(ApiError::bad_request("Missing file"));
    };
    if !file.is_image() {
        metrics::record_upload_rejected("upload", "not_image");
        return Err(ApiError::bad_request("Only images are allowed"));
    }

    let input_bytes = file.bytes.len();
    let file_name = file.file_name.unwrap_or_default();
    let still_config = state.config.still;
    let started = Instant::now();
    let processed = tokio::task::spawn_blocking(move || process_still(&file.bytes, &still_config))
        .await
        .map_err(|e| ApiError::internal(format!("Image processing task failed: {}", e)))??;
    let processing_secs = started.elapsed().as_secs_f64();

    let version = state.pointers.allocate_version(Version::now().as_u64()).await?;

    let current_key = current_image_key(version);
    let backup_key = backup_image_key(DatePath::today(), Uuid::new_v4());

    let (current, _backup) = tokio::try_join!(
        state
            .storage
            .put(&current_key, processed.current, PutOptions::immutable(JPEG)),
        state
            .storage
            .put(&backup_key, processed.backup, PutOptions::immutable(JPEG)),
    )?;

    let published = state
        .pointers
        .publish(&BackgroundPointer::new(current.url, version))
        .await?;
    if !published {
        // A later upload already moved the pointer; ours stays in storage
        debug!(version = %version, "Background superseded before publish");
    }

    metrics::record_image_uploaded(input_bytes, processing_secs);
    info!(
        version = %version,
        file_name = %file_name,
        width = processed.current_dimensions.0,
        height = processed.current_dimensions.1,
        backup = %backup_key,
        "Background replaced"
    );

    Ok(Json(UploadResponse { ok: true, version }))
}
