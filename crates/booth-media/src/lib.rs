//! Image processing for photobooth captures.
//!
//! This crate provides:
//! - Upload processing: EXIF orientation, metadata stripping, current and
//!   backup JPEG variants
//! - Capture-side frame encoding: width-bounded scaling, mirroring

pub mod error;
pub mod frame;
pub mod resize;
pub mod still;

pub use error::{MediaError, MediaResult};
pub use frame::{encode_frame, EncodedFrame, FrameEncoding};
pub use resize::fit_width;
pub use still::{process_still, ProcessedStill, StillConfig};
