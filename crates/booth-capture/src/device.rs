//! Camera and recorder seam.

use async_trait::async_trait;
use image::RgbaImage;
use tokio::sync::mpsc;

use crate::error::CaptureResult;
use crate::recorder::{RecorderSettings, Resolution};

/// A camera with an attached recorder.
///
/// Implementations wrap whatever capture stack the host provides. The
/// recorder hands chunks over a channel; `stop_recording` must deliver any
/// buffered data as a final chunk and then close the channel.
#[async_trait]
pub trait MediaDevice: Send {
    /// Open the camera and report the negotiated resolution.
    async fn open(&mut self) -> CaptureResult<Resolution>;

    /// Current preview frame.
    async fn grab_frame(&mut self) -> CaptureResult<RgbaImage>;

    /// Whether the recorder can produce `mime_type`.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    fn start_recording(&mut self, settings: &RecorderSettings) -> CaptureResult<mpsc::Receiver<Vec<u8>>>;

    /// Flush the final chunk and close the chunk channel. No-op when idle.
    fn stop_recording(&mut self);

    /// Release the camera. No-op when closed.
    fn close(&mut self);
}
