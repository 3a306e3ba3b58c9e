//! Adapter-specific input preprocessing
//!
//! Applied right before the engine call; must match how each network
//! was trained.

use ndarray::Array4;
use serde::{Deserialize, Serialize};

use crate::logic::imaging::ImageTensor;

/// ImageNet channel means in BGR order (ResNet "caffe" regime)
pub const CAFFE_BGR_MEAN: [f32; 3] = [103.939, 116.779, 123.68];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preprocessing {
    /// Raw 0..=255 values (model rescales internally)
    #[default]
    None,
    /// RGB → BGR, then subtract `CAFFE_BGR_MEAN` per channel
    CaffeMeanSubtraction,
}

impl Preprocessing {
    pub fn apply(&self, tensor: &ImageTensor) -> Array4<f32> {
        match self {
            Preprocessing::None => tensor.to_array(),
            Preprocessing::CaffeMeanSubtraction => {
                let view = tensor.view();
                Array4::from_shape_fn(view.dim(), |(b, y, x, c)| {
                    view[[b, y, x, 2 - c]] - CAFFE_BGR_MEAN[c]
                })
            }
        }
    }
}
