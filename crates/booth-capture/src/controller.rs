//! The photobooth capture workflow.

use std::time::Duration;

use booth_media::{encode_frame, FrameEncoding};
use booth_models::Version;
use tracing::{debug, info, warn};

use crate::client::BoothClient;
use crate::device::MediaDevice;
use crate::error::{CaptureError, CaptureResult};
use crate::recorder::{negotiate_mime, RecorderSettings, Resolution};
use crate::session::RecordingSession;
use crate::state::{CaptureEvent, CaptureState};

/// Booth behaviour settings.
#[derive(Debug, Clone, Copy)]
pub struct PhotoboothConfig {
    pub frame: FrameEncoding,
    /// Record a continuous backup video while the camera is open
    pub record_backup: bool,
    /// Delay before returning to the home page after a successful upload
    pub navigate_home_after: Duration,
}

impl Default for PhotoboothConfig {
    fn default() -> Self {
        Self {
            frame: FrameEncoding::default(),
            record_backup: true,
            navigate_home_after: Duration::from_millis(1500),
        }
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOutcome {
    pub version: Version,
    pub navigate_home_after: Duration,
}

/// Drives one camera through take, review and upload.
///
/// Every action takes `&mut self`, so at most one is in flight.
pub struct Photobooth<D: MediaDevice> {
    device: D,
    client: BoothClient,
    config: PhotoboothConfig,
    state: CaptureState,
    recording: Option<RecordingSession>,
    /// Set while the camera is open
    resolution: Option<Resolution>,
}

impl<D: MediaDevice> Photobooth<D> {
    pub fn new(device: D, client: BoothClient, config: PhotoboothConfig) -> Self {
        Self {
            device,
            client,
            config,
            state: CaptureState::Idle,
            recording: None,
            resolution: None,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Message to show, if the last action failed.
    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    pub fn recording(&self) -> Option<&RecordingSession> {
        self.recording.as_ref()
    }

    /// Open the camera and, if enabled, start the backup recording.
    pub async fn start_camera(&mut self) -> CaptureResult<()> {
        self.state.apply(CaptureEvent::StartCamera)?;

        match self.device.open().await {
            Ok(resolution) => {
                self.resolution = Some(resolution);
                self.state.apply(CaptureEvent::CameraOpened)?;
                info!(width = resolution.width, height = resolution.height, "Camera ready");
                if self.config.record_backup {
                    self.start_recording(resolution);
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Camera failed to open");
                self.state.apply(CaptureEvent::CameraFailed(e.user_message()))?;
                Err(e)
            }
        }
    }

    fn start_recording(&mut self, resolution: Resolution) {
        // A running session keeps its format until it is released
        if self.recording.is_some() {
            return;
        }

        let Some(mime_type) = negotiate_mime(|m| self.device.is_type_supported(m)) else {
            info!("No supported recording format, skipping backup recording");
            return;
        };

        let mut session = RecordingSession::open(RecorderSettings::for_resolution(resolution, mime_type));
        match self.device.start_recording(session.settings()) {
            Ok(chunks) => {
                session.activate(chunks, self.client.clone());
                self.recording = Some(session);
            }
            Err(e) => warn!(error = %e, "Backup recording unavailable"),
        }
    }

    /// Freeze the current frame for review.
    pub async fn take_photo(&mut self) -> CaptureResult<()> {
        if self.state != CaptureState::CameraReady {
            return Err(CaptureError::InvalidTransition {
                event: "take photo",
                state: self.state.name(),
            });
        }

        match self.capture_frame().await {
            Ok(frame) => {
                debug!(width = frame.width, height = frame.height, bytes = frame.jpeg.len(), "Photo taken");
                self.state.apply(CaptureEvent::PhotoTaken(frame))
            }
            Err(e) => {
                self.state.apply(CaptureEvent::PhotoFailed(e.user_message()))?;
                Err(e)
            }
        }
    }

    async fn capture_frame(&mut self) -> CaptureResult<booth_media::EncodedFrame> {
        let raw = self.device.grab_frame().await?;
        let encoding = self.config.frame;
        tokio::task::spawn_blocking(move || encode_frame(raw, &encoding))
            .await
            .map_err(|e| CaptureError::frame_capture(e.to_string()))?
            .map_err(CaptureError::from)
    }

    /// Discard the frozen frame and return to the live preview.
    pub fn cancel(&mut self) -> CaptureResult<()> {
        self.state.apply(CaptureEvent::Cancel)
    }

    /// Upload the frozen frame as the new background.
    ///
    /// On success the backup recording is stopped and flushed. On failure
    /// the frame is kept so the upload can be retried.
    pub async fn upload(&mut self) -> CaptureResult<UploadOutcome> {
        let jpeg = match &self.state {
            CaptureState::PhotoTaken { frame, .. } => frame.jpeg.clone(),
            other => {
                return Err(CaptureError::InvalidTransition {
                    event: CaptureEvent::UploadStarted.name(),
                    state: other.name(),
                })
            }
        };
        self.state.apply(CaptureEvent::UploadStarted)?;

        match self.client.upload_photo(jpeg).await {
            Ok(version) => {
                self.state.apply(CaptureEvent::UploadSucceeded(version))?;
                info!(version = %version, "Photo uploaded");
                self.stop_recording().await;
                Ok(UploadOutcome {
                    version,
                    navigate_home_after: self.config.navigate_home_after,
                })
            }
            Err(e) => {
                warn!(error = %e, "Photo upload failed");
                self.state.apply(CaptureEvent::UploadFailed(e.user_message()))?;
                Err(e)
            }
        }
    }

    /// The page is going away; give the recorder its last flush.
    ///
    /// The camera stays open. Recording resumes in a new session on
    /// [`Photobooth::on_page_visible`].
    pub async fn on_page_hidden(&mut self) {
        self.stop_recording().await;
    }

    /// The page is showing again; restart the backup recording if the
    /// camera is live and nothing is recording.
    pub fn on_page_visible(&mut self) {
        if !self.config.record_backup || self.recording.is_some() {
            return;
        }
        if let Some(resolution) = self.resolution {
            debug!("Page visible again, resuming backup recording");
            self.start_recording(resolution);
        }
    }

    /// Stop recording, release the camera and return to idle.
    pub async fn teardown(&mut self) {
        self.stop_recording().await;
        if self.resolution.take().is_some() {
            self.device.close();
        }
        // Teardown is accepted in every state
        let _ = self.state.apply(CaptureEvent::Teardown);
    }

    async fn stop_recording(&mut self) -> Option<u32> {
        let mut session = self.recording.take()?;
        self.device.stop_recording();
        Some(session.release().await)
    }
}

impl<D: MediaDevice> Drop for Photobooth<D> {
    fn drop(&mut self) {
        if let Some(mut session) = self.recording.take() {
            self.device.stop_recording();
            session.detach();
        }
        if self.resolution.is_some() {
            self.device.close();
        }
    }
}
