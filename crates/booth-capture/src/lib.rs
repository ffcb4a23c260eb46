//! Capture-side workflow for the photobooth.
//!
//! This crate provides:
//! - The capture state machine and the `Photobooth` controller
//! - Backup recorder negotiation and chunked session upload
//! - An HTTP client for the photobooth API
//!
//! Camera access sits behind the `MediaDevice` trait so hosts plug in
//! their own capture stack.

pub mod client;
pub mod controller;
pub mod device;
pub mod error;
pub mod recorder;
pub mod session;
pub mod state;

pub use client::BoothClient;
pub use controller::{Photobooth, PhotoboothConfig, UploadOutcome};
pub use device::MediaDevice;
pub use error::{CaptureError, CaptureResult};
pub use recorder::{negotiate_mime, RecorderSettings, Resolution, MIME_PREFERENCES};
pub use session::{RecordingSession, SessionPhase};
pub use state::{CaptureEvent, CaptureState};
