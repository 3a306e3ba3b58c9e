//! ONNX Runtime engine
//!
//! Load và chạy ONNX model. `Session::run` needs `&mut`, so each engine
//! keeps its session behind a mutex: one in-flight run per model.

use std::path::Path;

use ndarray::Array4;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use super::adapter::AdapterSpec;
use super::engine::{InferenceEngine, InferenceError, ModelMetadata, ModelProvider, OutputSlot};

pub struct OnnxEngine {
    session: Mutex<Session>,
    metadata: ModelMetadata,
}

impl OnnxEngine {
    /// Load ONNX model từ file
    pub fn from_file(model_path: &Path) -> Result<Self, InferenceError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(InferenceError::ModelNotFound(model_path.display().to_string()));
        }

        let bytes = std::fs::read(model_path)
            .map_err(|e| InferenceError::Session(format!("Failed to read model: {}", e)))?;

        let session = Session::builder()
            .map_err(|e| InferenceError::Session(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Session(format!("Failed to set optimization: {}", e)))?
            .commit_from_memory(&bytes)
            .map_err(|e| InferenceError::Session(format!("Failed to load model: {}", e)))?;

        Ok(Self::with_session(session, model_path.display().to_string(), &bytes))
    }

    /// Load ONNX model từ bytes
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, InferenceError> {
        log::info!("Loading ONNX model from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| InferenceError::Session(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Session(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| InferenceError::Session(format!("Load from memory error: {}", e)))?;

        Ok(Self::with_session(session, "<memory>".to_string(), model_bytes))
    }

    fn with_session(session: Session, model_path: String, bytes: &[u8]) -> Self {
        let metadata = ModelMetadata {
            model_path,
            checksum: hex::encode(Sha256::digest(bytes)),
            inputs: session.inputs.iter().map(|i| i.name.clone()).collect(),
            outputs: session.outputs.iter().map(|o| o.name.clone()).collect(),
            loaded_at: chrono::Utc::now(),
        };

        log::info!(
            "ONNX model loaded: inputs={:?} outputs={:?} sha256={}",
            metadata.inputs,
            metadata.outputs,
            &metadata.checksum[..12]
        );

        Self {
            session: Mutex::new(session),
            metadata,
        }
    }
}

impl InferenceEngine for OnnxEngine {
    fn run(&self, input_slot: &str, output: &OutputSlot, input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let mut session = self.session.lock();

        let output_name = match output {
            OutputSlot::First => session.outputs.first()
                .map(|o| o.name.clone())
                .ok_or_else(|| InferenceError::MissingOutput("<first>".to_string()))?,
            OutputSlot::Named(name) => name.clone(),
        };

        let input_tensor = Value::from_array(input)
            .map_err(|e| InferenceError::Session(format!("Tensor error: {}", e)))?;

        let outputs = session.run(ort::inputs![input_slot => input_tensor])
            .map_err(|e| InferenceError::Run(e.to_string()))?;

        let value = outputs.get(output_name.as_str())
            .ok_or_else(|| InferenceError::MissingOutput(output_name.clone()))?;

        let (shape, data) = value.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Extract(e.to_string()))?;

        // [1, classes] → first batch row
        let classes = shape.last()
            .copied()
            .filter(|&c| c > 0)
            .map(|c| c as usize)
            .unwrap_or(data.len());

        Ok(data.iter().take(classes).copied().collect())
    }

    fn metadata(&self) -> Option<ModelMetadata> {
        Some(self.metadata.clone())
    }
}

/// Opens one ONNX session per adapter from `spec.model_path`
#[derive(Debug, Clone, Copy, Default)]
pub struct OnnxProvider;

impl ModelProvider for OnnxProvider {
    fn open(&self, spec: &AdapterSpec) -> Result<Box<dyn InferenceEngine>, InferenceError> {
        let engine = OnnxEngine::from_file(&spec.model_path)?;
        Ok(Box::new(engine))
    }
}
