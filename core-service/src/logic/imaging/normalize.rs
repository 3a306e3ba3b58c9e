//! Image Normalizer - bytes → `[1, h, w, 3]` float32

use image::{DynamicImage, RgbImage};

use super::resize::resize_area;
use super::{ImageTensor, ImagingError};

/// Decode `bytes`, force RGB, area-resize to `target_height` x `target_width`.
///
/// Gray input is replicated across channels, alpha is dropped.
/// Pure: no state is read or written.
pub fn normalize(bytes: &[u8], target_height: u32, target_width: u32) -> Result<ImageTensor, ImagingError> {
    if target_height == 0 || target_width == 0 {
        return Err(ImagingError::InvalidTarget {
            height: target_height,
            width: target_width,
        });
    }
    if bytes.is_empty() {
        return Err(ImagingError::Decode("empty input".to_string()));
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ImagingError::Decode(e.to_string()))?;

    log::debug!(
        "Decoded {}x{} image ({:?}), resizing to {}x{}",
        decoded.width(),
        decoded.height(),
        decoded.color(),
        target_width,
        target_height
    );

    let rgb = to_rgb(decoded);
    let resized = resize_area(&rgb, target_width, target_height);

    ImageTensor::from_rgb(&resized)
}

fn to_rgb(image: DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}
