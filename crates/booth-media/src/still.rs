//! Server-side processing of an uploaded still.
//!
//! One upload yields two JPEGs, both oriented upright and stripped of
//! metadata:
//! - *current*: width-capped and compressed for web delivery
//! - *backup*: original resolution at maximum quality

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::resize::{downscale_to_width, encode_jpeg};

/// Output settings for processed stills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StillConfig {
    /// Width cap of the current variant
    pub max_width: u32,
    /// JPEG quality of the current variant
    pub current_quality: u8,
    /// JPEG quality of the backup variant
    pub backup_quality: u8,
}

impl Default for StillConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            current_quality: 82,
            backup_quality: 100,
        }
    }
}

/// Both encoded variants of one upload.
#[derive(Debug, Clone)]
pub struct ProcessedStill {
    pub current: Vec<u8>,
    pub current_dimensions: (u32, u32),
    pub backup: Vec<u8>,
    pub backup_dimensions: (u32, u32),
}

/// Decode `bytes`, apply EXIF orientation, and return the upright image.
pub fn decode_upright(bytes: &[u8]) -> MediaResult<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()
        .map_err(MediaError::decode)?;

    // Missing or unreadable orientation means the pixels are already upright.
    let orientation = decoder.orientation().ok();

    let mut img = DynamicImage::from_decoder(decoder).map_err(MediaError::decode)?;
    if let Some(orientation) = orientation {
        img.apply_orientation(orientation);
    }
    Ok(img)
}

/// Produce the current and backup variants. CPU-bound; run off the reactor.
pub fn process_still(bytes: &[u8], config: &StillConfig) -> MediaResult<ProcessedStill> {
    let img = decode_upright(bytes)?;
    debug!(width = img.width(), height = img.height(), "Decoded upload");

    let current_img = downscale_to_width(&img, config.max_width, FilterType::Lanczos3);
    let current = encode_jpeg(&current_img, config.current_quality)?;
    let backup = encode_jpeg(&img, config.backup_quality)?;

    Ok(ProcessedStill {
        current,
        current_dimensions: (current_img.width(), current_img.height()),
        backup,
        backup_dimensions: (img.width(), img.height()),
    })
}
