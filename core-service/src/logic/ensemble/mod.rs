//! Ensemble Module - weighted fusion of per-model probability vectors
//!
//! Only models that actually answered take part; their static weights
//! are renormalized over that subset.

pub mod fusion;
pub mod weights;

pub use fusion::{fuse, FusionResult, ModelOutput};
pub use weights::EnsembleWeights;

#[derive(Debug, thiserror::Error)]
pub enum EnsembleError {
    #[error("No model available")]
    NoModelAvailable,

    #[error("Probability length mismatch: {model} returned {got}, expected {expected}")]
    LengthMismatch {
        model: String,
        expected: usize,
        got: usize,
    },

    #[error("No finite score in {0} output")]
    NoFiniteScore(String),

    #[error("Invalid ensemble weights: {0}")]
    InvalidWeights(String),
}
