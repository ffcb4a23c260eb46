//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "booth_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "booth_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "booth_http_requests_in_flight";

    // Upload metrics
    pub const IMAGES_UPLOADED_TOTAL: &str = "booth_images_uploaded_total";
    pub const IMAGE_UPLOAD_BYTES: &str = "booth_image_upload_bytes";
    pub const IMAGE_PROCESSING_SECONDS: &str = "booth_image_processing_seconds";
    pub const CHUNKS_STORED_TOTAL: &str = "booth_video_chunks_stored_total";
    pub const CHUNK_BYTES: &str = "booth_video_chunk_bytes";
    pub const UPLOADS_REJECTED_TOTAL: &str = "booth_uploads_rejected_total";

    // Visit metrics
    pub const VISITS_TOTAL: &str = "booth_visits_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "booth_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a processed and stored still.
pub fn record_image_uploaded(input_bytes: usize, processing_secs: f64) {
    counter!(names::IMAGES_UPLOADED_TOTAL).increment(1);
    histogram!(names::IMAGE_UPLOAD_BYTES).record(input_bytes as f64);
    histogram!(names::IMAGE_PROCESSING_SECONDS).record(processing_secs);
}

/// Record a stored video chunk.
pub fn record_chunk_stored(extension: &str, bytes: usize) {
    let labels = [("ext", extension.to_string())];
    counter!(names::CHUNKS_STORED_TOTAL, &labels).increment(1);
    histogram!(names::CHUNK_BYTES).record(bytes as f64);
}

/// Record an upload rejected before storage.
pub fn record_upload_rejected(endpoint: &str, reason: &str) {
    let labels = [
        ("endpoint", endpoint.to_string()),
        ("reason", reason.to_string()),
    ];
    counter!(names::UPLOADS_REJECTED_TOTAL, &labels).increment(1);
}

/// Record a visit, split by whether it was counted.
pub fn record_visit(bot: bool) {
    let labels = [("kind", if bot { "bot" } else { "visitor" }.to_string())];
    counter!(names::VISITS_TOTAL, &labels).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Collapse unknown paths so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    match path {
        "/bg" | "/api/bg" | "/api/pv" | "/api/upload" | "/api/upload-video-chunk" | "/health"
        | "/healthz" | "/ready" | "/metrics" => path.to_string(),
        _ => "other".to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/api/upload"), "/api/upload");
        assert_eq!(sanitize_path("/bg"), "/bg");
        assert_eq!(sanitize_path("/wp-admin/setup.php"), "other");
    }
}
