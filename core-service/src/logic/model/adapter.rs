//! Model Adapter - uniform `predict(tensor) -> ProbabilityVector`
//!
//! Each adapter is bound at startup to one model, one input slot and one
//! expected input shape. A model that failed to load leaves the adapter
//! permanently unavailable (no retry).

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::imaging::{ImageTensor, CHANNELS};
use super::engine::{InferenceEngine, InferenceError, ModelProvider, OutputSlot};
use super::preprocess::Preprocessing;
use super::probability::ProbabilityVector;
use super::status::{EngineStatus, InferenceStats};

// ============================================================================
// ADAPTER TRAIT
// ============================================================================

pub trait ModelAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the underlying model loaded at startup
    fn is_available(&self) -> bool;

    /// Expected `(height, width)` of the canonical tensor
    fn input_size(&self) -> (u32, u32);

    fn predict(&self, tensor: &ImageTensor) -> Result<ProbabilityVector, InferenceError>;

    fn status(&self) -> EngineStatus;
}

// ============================================================================
// ADAPTER SPEC
// ============================================================================

/// Adapter-local binding to a model's slots and input regime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterSpec {
    pub name: String,
    pub model_path: PathBuf,
    pub input_slot: String,
    pub output_slot: OutputSlot,
    pub input_height: u32,
    pub input_width: u32,
    pub preprocessing: Preprocessing,
}

impl AdapterSpec {
    pub fn new(
        name: impl Into<String>,
        model_path: impl Into<PathBuf>,
        input_slot: impl Into<String>,
        input_height: u32,
        input_width: u32,
    ) -> Self {
        Self {
            name: name.into(),
            model_path: model_path.into(),
            input_slot: input_slot.into(),
            output_slot: OutputSlot::First,
            input_height,
            input_width,
            preprocessing: Preprocessing::None,
        }
    }

    pub fn with_output(mut self, output_slot: OutputSlot) -> Self {
        self.output_slot = output_slot;
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: Preprocessing) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    /// EfficientNet fingerprint classifier (rescaling is inside the graph)
    pub fn efficientnet(models_dir: &Path) -> Self {
        let (h, w) = constants::FINGERPRINT_INPUT;
        Self::new(
            constants::EFFICIENTNET,
            models_dir.join(constants::DEFAULT_EFFICIENTNET_FILE),
            constants::DEFAULT_EFFICIENTNET_INPUT,
            h,
            w,
        )
    }

    /// InceptionV3 fingerprint classifier
    pub fn inception(models_dir: &Path) -> Self {
        let (h, w) = constants::FINGERPRINT_INPUT;
        Self::new(
            constants::INCEPTION,
            models_dir.join(constants::DEFAULT_INCEPTION_FILE),
            constants::DEFAULT_INCEPTION_INPUT,
            h,
            w,
        )
    }

    /// ResNet50-based blood group classifier (caffe preprocessing)
    pub fn blood(models_dir: &Path) -> Self {
        let (h, w) = constants::BLOOD_INPUT;
        Self::new(
            constants::BLOOD,
            models_dir.join(constants::DEFAULT_BLOOD_FILE),
            constants::DEFAULT_BLOOD_INPUT,
            h,
            w,
        )
        .with_preprocessing(Preprocessing::CaffeMeanSubtraction)
    }

    fn expected_shape(&self) -> [usize; 4] {
        [1, self.input_height as usize, self.input_width as usize, CHANNELS]
    }
}

// ============================================================================
// CLASSIFIER ADAPTER
// ============================================================================

pub struct ClassifierAdapter {
    spec: AdapterSpec,
    engine: Option<Box<dyn InferenceEngine>>,
    stats: InferenceStats,
}

impl ClassifierAdapter {
    /// `engine = None` means the model is unavailable for the process lifetime
    pub fn new(spec: AdapterSpec, engine: Option<Box<dyn InferenceEngine>>) -> Self {
        Self {
            spec,
            engine,
            stats: InferenceStats::default(),
        }
    }

    /// Open the model through `provider`; a load failure is logged, not returned
    pub fn load(spec: AdapterSpec, provider: &dyn ModelProvider) -> Self {
        match provider.open(&spec) {
            Ok(engine) => {
                log::info!("{} loaded successfully", spec.name);
                Self::new(spec, Some(engine))
            }
            Err(e) => {
                log::warn!("Failed loading {}: {}", spec.name, e);
                Self::new(spec, None)
            }
        }
    }
}

impl ModelAdapter for ClassifierAdapter {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    fn input_size(&self) -> (u32, u32) {
        (self.spec.input_height, self.spec.input_width)
    }

    fn predict(&self, tensor: &ImageTensor) -> Result<ProbabilityVector, InferenceError> {
        let engine = self.engine.as_ref()
            .ok_or_else(|| InferenceError::ModelNotLoaded(self.spec.name.clone()))?;

        let expected = self.spec.expected_shape();
        if tensor.shape() != expected {
            return Err(InferenceError::ShapeMismatch {
                adapter: self.spec.name.clone(),
                expected,
                actual: tensor.shape(),
            });
        }

        let start_time = Instant::now();
        let input = self.spec.preprocessing.apply(tensor);
        let result = engine
            .run(&self.spec.input_slot, &self.spec.output_slot, input)
            .map(ProbabilityVector::new);

        self.stats.record(start_time.elapsed(), result.is_ok());
        result
    }

    fn status(&self) -> EngineStatus {
        let metadata = self.engine.as_ref().and_then(|e| e.metadata());
        EngineStatus {
            name: self.spec.name.clone(),
            model_loaded: self.is_available(),
            model_path: self.spec.model_path.display().to_string(),
            checksum: metadata.map(|m| m.checksum),
            inference_device: "ONNX Runtime (CPU)".to_string(),
            avg_latency_ms: self.stats.avg_latency_ms(),
            inference_count: self.stats.inference_count(),
            failure_count: self.stats.failure_count(),
        }
    }
}
