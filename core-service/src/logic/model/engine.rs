//! Inference Engine - model-provider seam
//!
//! An engine executes one forward pass of a loaded model. Adapters own the
//! slot names and pre/post-processing; engines only move tensors.

use chrono::{DateTime, Utc};
use ndarray::Array4;
use serde::{Deserialize, Serialize};

use super::adapter::AdapterSpec;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Input shape mismatch for {adapter}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        adapter: String,
        expected: [usize; 4],
        actual: [usize; 4],
    },

    #[error("Inference failed: {0}")]
    Run(String),

    #[error("No output '{0}'")]
    MissingOutput(String),

    #[error("Extract error: {0}")]
    Extract(String),
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Which model output holds the class scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputSlot {
    /// First output declared by the model
    #[default]
    First,
    Named(String),
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub checksum: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// TRAITS
// ============================================================================

/// Trait cho inference engines (ONNX, TensorRT, test doubles, ...)
///
/// Implementations must be callable from several threads at once; engines
/// that need exclusive access serialize internally.
pub trait InferenceEngine: Send + Sync {
    /// Feed `input` into `input_slot` and return the first batch row of `output`
    fn run(&self, input_slot: &str, output: &OutputSlot, input: Array4<f32>) -> Result<Vec<f32>, InferenceError>;

    fn metadata(&self) -> Option<ModelMetadata> {
        None
    }
}

/// Opens an engine for an adapter spec (model file loading lives behind this)
pub trait ModelProvider {
    fn open(&self, spec: &AdapterSpec) -> Result<Box<dyn InferenceEngine>, InferenceError>;
}
