//! Canonical image tensor `[1, height, width, 3]` (NHWC, float32)

use image::RgbImage;
use ndarray::{Array4, ArrayView4};

use super::ImagingError;

/// Channel count of every tensor the normalizer produces
pub const CHANNELS: usize = 3;

/// Batch-of-one RGB tensor in source value range (0..=255).
///
/// Model-specific scaling is applied by the adapter, never here.
#[derive(Debug, Clone)]
pub struct ImageTensor {
    data: Array4<f32>,
}

impl ImageTensor {
    /// Wrap an existing array, enforcing `[1, h, w, 3]`
    pub fn new(data: Array4<f32>) -> Result<Self, ImagingError> {
        let shape = data.shape();
        if shape[0] != 1 || shape[3] != CHANNELS || shape[1] == 0 || shape[2] == 0 {
            return Err(ImagingError::InvalidTensor(format!(
                "expected [1, h, w, {}], got {:?}",
                CHANNELS, shape
            )));
        }
        Ok(Self { data })
    }

    /// Build from an 8-bit RGB buffer (row-major HWC, same layout as the tensor)
    pub fn from_rgb(image: &RgbImage) -> Result<Self, ImagingError> {
        let (width, height) = image.dimensions();
        let values: Vec<f32> = image.as_raw().iter().map(|&v| v as f32).collect();

        let data = Array4::from_shape_vec((1, height as usize, width as usize, CHANNELS), values)
            .map_err(|e| ImagingError::InvalidTensor(format!("Array error: {}", e)))?;

        Self::new(data)
    }

    pub fn height(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn width(&self) -> usize {
        self.data.shape()[2]
    }

    pub fn shape(&self) -> [usize; 4] {
        let s = self.data.shape();
        [s[0], s[1], s[2], s[3]]
    }

    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }

    pub fn to_array(&self) -> Array4<f32> {
        self.data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_from_rgb_keeps_hwc_layout() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([1, 2, 3]));
        img.put_pixel(1, 0, Rgb([4, 5, 6]));

        let tensor = ImageTensor::from_rgb(&img).unwrap();
        assert_eq!(tensor.shape(), [1, 1, 2, 3]);

        let view = tensor.view();
        assert_eq!(view[[0, 0, 0, 2]], 3.0);
        assert_eq!(view[[0, 0, 1, 0]], 4.0);
    }

    #[test]
    fn test_rejects_non_rgb_shape() {
        let gray = Array4::<f32>::zeros((1, 4, 4, 1));
        assert!(ImageTensor::new(gray).is_err());

        let batch = Array4::<f32>::zeros((2, 4, 4, 3));
        assert!(ImageTensor::new(batch).is_err());
    }
}
