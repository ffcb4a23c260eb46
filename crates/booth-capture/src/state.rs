//! Capture workflow state machine.

use booth_media::EncodedFrame;
use booth_models::Version;

use crate::error::{CaptureError, CaptureResult};

/// Where the booth is in its take-and-upload cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CaptureState {
    #[default]
    Idle,
    CameraStarting,
    CameraReady,
    /// A frozen frame awaiting confirmation. `error` holds the message of
    /// a failed upload attempt.
    PhotoTaken {
        frame: EncodedFrame,
        error: Option<String>,
    },
    Uploading {
        frame: EncodedFrame,
    },
    Done {
        version: Version,
    },
    Error {
        message: String,
    },
}

/// Inputs that move the state machine.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    StartCamera,
    CameraOpened,
    CameraFailed(String),
    PhotoTaken(EncodedFrame),
    PhotoFailed(String),
    Cancel,
    UploadStarted,
    UploadSucceeded(Version),
    UploadFailed(String),
    Teardown,
}

impl CaptureEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartCamera => "start camera",
            Self::CameraOpened => "open camera",
            Self::CameraFailed(_) => "fail camera",
            Self::PhotoTaken(_) => "take photo",
            Self::PhotoFailed(_) => "fail photo",
            Self::Cancel => "cancel",
            Self::UploadStarted => "upload",
            Self::UploadSucceeded(_) => "finish upload",
            Self::UploadFailed(_) => "fail upload",
            Self::Teardown => "tear down",
        }
    }
}

impl CaptureState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CameraStarting => "camera starting",
            Self::CameraReady => "camera ready",
            Self::PhotoTaken { .. } => "photo taken",
            Self::Uploading { .. } => "uploading",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    /// Apply `event`. An event that is not valid here is rejected and the
    /// state is left as it was.
    pub fn apply(&mut self, event: CaptureEvent) -> CaptureResult<()> {
        let current = std::mem::take(self);
        match current.on(event) {
            Ok(next) => {
                *self = next;
                Ok(())
            }
            Err((previous, err)) => {
                *self = previous;
                Err(err)
            }
        }
    }

    fn on(self, event: CaptureEvent) -> Result<Self, (Self, CaptureError)> {
        use CaptureEvent as E;
        use CaptureState as S;

        match (self, event) {
            (_, E::Teardown) => Ok(S::Idle),
            (S::Idle | S::Error { .. }, E::StartCamera) => Ok(S::CameraStarting),
            (S::CameraStarting, E::CameraOpened) => Ok(S::CameraReady),
            (S::CameraStarting, E::CameraFailed(message)) => Ok(S::Error { message }),
            (S::CameraReady, E::PhotoTaken(frame)) => Ok(S::PhotoTaken { frame, error: None }),
            (S::CameraReady, E::PhotoFailed(message)) => Ok(S::Error { message }),
            (S::PhotoTaken { .. }, E::Cancel) => Ok(S::CameraReady),
            (S::PhotoTaken { frame, .. }, E::UploadStarted) => Ok(S::Uploading { frame }),
            (S::Uploading { .. }, E::UploadSucceeded(version)) => Ok(S::Done { version }),
            (S::Uploading { frame }, E::UploadFailed(message)) => Ok(S::PhotoTaken {
                frame,
                error: Some(message),
            }),
            (state, event) => {
                let err = CaptureError::InvalidTransition {
                    event: event.name(),
                    state: state.name(),
                };
                Err((state, err))
            }
        }
    }

    /// The frozen frame, while one exists.
    pub fn frame(&self) -> Option<&EncodedFrame> {
        match self {
            Self::PhotoTaken { frame, .. } | Self::Uploading { frame } => Some(frame),
            _ => None,
        }
    }

    /// Visible error message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            Self::PhotoTaken { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// A live preview is showing.
    pub fn is_camera_live(&self) -> bool {
        matches!(
            self,
            Self::CameraReady | Self::PhotoTaken { .. } | Self::Uploading { .. }
        )
    }
}
