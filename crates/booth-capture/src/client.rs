//! HTTP client for the photobooth API.

use std::time::Duration;

use booth_models::{ChunkIndex, ChunkUploadResponse, SessionId, UploadResponse, VideoMediaType, Version};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

use crate::error::{CaptureError, CaptureResult};

/// Shown when a failed upload has no body to explain it.
const UPLOAD_FAILED: &str = "Upload failed";

/// Filename sent with captured stills.
const PHOTO_FILE_NAME: &str = "capture.jpg";

/// API client used by the booth.
#[derive(Clone)]
pub struct BoothClient {
    http: Client,
    base_url: Url,
}

impl BoothClient {
    /// Create a client for the API served at `base_url`.
    pub fn new(base_url: &str) -> CaptureResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| CaptureError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("booth-capture/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> CaptureResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CaptureError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Upload a captured JPEG as the new background.
    pub async fn upload_photo(&self, jpeg: Vec<u8>) -> CaptureResult<Version> {
        let part = Part::bytes(jpeg)
            .file_name(PHOTO_FILE_NAME)
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.endpoint("api/upload")?)
            .multipart(form)
            .send()
            .await?;

        let body: UploadResponse = check_status(response).await?.json().await?;
        Ok(body.version)
    }

    /// Upload one chunk of a backup recording.
    pub async fn upload_chunk(
        &self,
        session: &SessionId,
        index: ChunkIndex,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> CaptureResult<ChunkUploadResponse> {
        let media_type = VideoMediaType::parse(mime_type);
        let part = Part::bytes(bytes)
            .file_name(format!("{}.{}", index, media_type.extension()))
            .mime_str(media_type.essence())?;
        let form = Form::new()
            .text("session", session.to_string())
            .text("idx", index.to_string())
            .text("type", mime_type.to_string())
            .part("file", part);

        let response = self
            .http
            .post(self.endpoint("api/upload-video-chunk")?)
            .multipart(form)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// Upload a chunk in the background. The outcome is only logged.
    pub fn dispatch_chunk(
        &self,
        session: SessionId,
        index: ChunkIndex,
        mime_type: &'static str,
        bytes: Vec<u8>,
    ) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            let size = bytes.len();
            match client.upload_chunk(&session, index, mime_type, bytes).await {
                Ok(stored) => debug!(session = %session, index = %index, bytes = size, path = %stored.pathname, "Chunk uploaded"),
                Err(e) => debug!(session = %session, index = %index, error = %e, "Chunk upload failed"),
            }
        })
    }
}

/// Turn a non-success response into `UploadRejected` carrying its body.
async fn check_status(response: Response) -> CaptureResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match text.trim() {
        "" => UPLOAD_FAILED.to_string(),
        body => body.to_string(),
    };
    Err(CaptureError::UploadRejected {
        status: status.as_u16(),
        message,
    })
}
