//! Imaging Module - raw upload bytes → canonical `ImageTensor`
//!
//! Decode (any format the `image` crate sniffs), force 3 channels,
//! area-resample to the task's input size, add the batch axis.

pub mod normalize;
pub mod resize;
pub mod tensor;

pub use normalize::normalize;
pub use resize::resize_area;
pub use tensor::{ImageTensor, CHANNELS};

#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Invalid target size {height}x{width}")]
    InvalidTarget { height: u32, width: u32 },

    #[error("Invalid tensor: {0}")]
    InvalidTensor(String),
}
