//! Client-side encoding of a captured camera frame.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::error::{MediaError, MediaResult};
use crate::resize::{downscale_to_width, encode_jpeg};

/// How a frozen frame is turned into upload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEncoding {
    pub max_width: u32,
    pub quality: u8,
    /// Flip horizontally, matching a mirrored selfie preview
    pub mirror: bool,
}

impl Default for FrameEncoding {
    fn default() -> Self {
        Self {
            max_width: 1920,
            quality: 85,
            mirror: false,
        }
    }
}

/// A captured still ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Scale, optionally mirror, and JPEG-encode one raw frame.
pub fn encode_frame(frame: RgbaImage, encoding: &FrameEncoding) -> MediaResult<EncodedFrame> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(MediaError::EmptyFrame);
    }

    // Triangle is close to what a canvas draw does and much cheaper than Lanczos.
    let mut img = downscale_to_width(&DynamicImage::ImageRgba8(frame), encoding.max_width, FilterType::Triangle);
    if encoding.mirror {
        img = img.fliph();
    }

    let jpeg = encode_jpeg(&img, encoding.quality)?;
    Ok(EncodedFrame {
        jpeg,
        width: img.width(),
        height: img.height(),
    })
}
