//! Width-bounded scaling and JPEG encoding shared by server and client.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::{MediaError, MediaResult};

/// Dimensions after fitting `width` into `max_width`, keeping aspect ratio.
///
/// Never scales up. Height is rounded and kept at least 1.
pub fn fit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scale = max_width as f64 / width as f64;
    let scaled_height = ((height as f64) * scale).round().max(1.0) as u32;
    (max_width, scaled_height)
}

/// Downscale `img` to at most `max_width` pixels wide.
pub fn downscale_to_width(img: &DynamicImage, max_width: u32, filter: FilterType) -> DynamicImage {
    let (w, h) = fit_width(img.width(), img.height(), max_width);
    if (w, h) == (img.width(), img.height()) {
        img.clone()
    } else {
        img.resize_exact(w, h, filter)
    }
}

/// Encode as baseline JPEG. Re-encoding drops every metadata segment.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> MediaResult<Vec<u8>> {
    let rgb = img.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(MediaError::EmptyFrame);
    }

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(MediaError::encode)?;
    Ok(out)
}
