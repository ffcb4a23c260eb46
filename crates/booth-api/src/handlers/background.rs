//! Background redirect handler.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use booth_models::Version;
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Cache-Control on the redirect itself; the target is immutable.
const REDIRECT_CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate, max-age=0";

/// Redirect to the current background image.
///
/// The target carries `?v=<version>` and the redirect is never cached, so
/// a new upload shows up on the next page load.
pub async fn current_background(State(state): State<AppState>) -> ApiResult<Response> {
    let pointer = state
        .pointers
        .current()
        .await?
        .ok_or_else(|| ApiError::not_found("No background yet"))?;

    let target = versioned_url(&pointer.url, pointer.version)?;

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, target),
            (header::CACHE_CONTROL, REDIRECT_CACHE_CONTROL.to_string()),
            (header::PRAGMA, "no-cache".to_string()),
            (header::EXPIRES, "0".to_string()),
        ],
    )
        .into_response())
}

/// `url` with its `v` query parameter set to `version`.
pub fn versioned_url(url: &str, version: Version) -> ApiResult<String> {
    let mut parsed = Url::parse(url)
        .map_err(|e| ApiError::internal(format!("Stored background URL is invalid: {}", e)))?;

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != "v")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("v", &version.to_string());

    Ok(parsed.into())
}
