//! Capture client error types.

use thiserror::Error;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors surfaced by the capture workflow.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Frame capture failed: {0}")]
    FrameCapture(String),

    #[error("Recorder error: {0}")]
    Recorder(String),

    #[error(transparent)]
    Media(#[from] booth_media::MediaError),

    /// The server answered with a non-success status.
    #[error("{message}")]
    UploadRejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Cannot {event} while {state}")]
    InvalidTransition {
        event: &'static str,
        state: &'static str,
    },
}

impl CaptureError {
    pub fn camera_unavailable(msg: impl Into<String>) -> Self {
        Self::CameraUnavailable(msg.into())
    }

    pub fn frame_capture(msg: impl Into<String>) -> Self {
        Self::FrameCapture(msg.into())
    }

    pub fn recorder(msg: impl Into<String>) -> Self {
        Self::Recorder(msg.into())
    }

    /// Message shown to the person in front of the booth.
    pub fn user_message(&self) -> String {
        match self {
            Self::UploadRejected { message, .. } => message.clone(),
            Self::Network(_) => "Upload failed".to_string(),
            other => other.to_string(),
        }
    }
}
