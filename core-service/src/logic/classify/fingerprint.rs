//! Fingerprint pattern pipeline (weighted ensemble)

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::cancel::CancelToken;
use crate::logic::ensemble::{fuse, EnsembleError, EnsembleWeights, ModelOutput};
use crate::logic::imaging::normalize;
use crate::logic::model::ModelAdapter;
use super::{label_probabilities, ClassifyError};

/// Fingerprint response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintPrediction {
    pub pattern: String,
    #[serde(rename = "class")]
    pub class_index: usize,
    pub confidence: f32,
    pub model_used: String,
    pub probabilities: BTreeMap<String, f32>,
    pub per_model_confidence: BTreeMap<String, f32>,
}

pub struct FingerprintClassifier {
    adapters: Vec<Arc<dyn ModelAdapter>>,
    weights: EnsembleWeights,
    labels: Vec<String>,
    input_size: (u32, u32),
}

impl FingerprintClassifier {
    /// Every adapter needs a weight entry
    pub fn new(adapters: Vec<Arc<dyn ModelAdapter>>, weights: EnsembleWeights) -> Result<Self, EnsembleError> {
        if let Some(missing) = adapters.iter().find(|a| !weights.contains(a.name())) {
            return Err(EnsembleError::InvalidWeights(format!("no weight for {}", missing.name())));
        }

        Ok(Self {
            adapters,
            weights,
            labels: constants::PATTERN_TYPES.iter().map(|s| s.to_string()).collect(),
            input_size: constants::FINGERPRINT_INPUT,
        })
    }

    pub fn adapters(&self) -> &[Arc<dyn ModelAdapter>] {
        &self.adapters
    }

    pub fn has_available_model(&self) -> bool {
        self.adapters.iter().any(|a| a.is_available())
    }

    pub fn classify(&self, image_bytes: &[u8], cancel: &CancelToken) -> Result<FingerprintPrediction, ClassifyError> {
        if !self.has_available_model() {
            return Err(ClassifyError::NoModelLoaded("fingerprint"));
        }
        cancel.check()?;

        let (height, width) = self.input_size;
        let tensor = normalize(image_bytes, height, width)?;

        let mut outputs = Vec::with_capacity(self.adapters.len());
        for adapter in self.adapters.iter().filter(|a| a.is_available()) {
            cancel.check()?;

            log::debug!("Running {} prediction...", adapter.name());
            match adapter.predict(&tensor) {
                Ok(probabilities) => {
                    // weight presence is checked in new()
                    let weight = self.weights.get(adapter.name()).unwrap_or(0.0);
                    outputs.push(ModelOutput::new(adapter.name(), probabilities, weight));
                }
                Err(e) => log::warn!("{} prediction failed: {}", adapter.name(), e),
            }
        }

        let fused = fuse(&outputs).map_err(|e| match e {
            EnsembleError::NoModelAvailable => ClassifyError::AllPredictionsFailed,
            other => ClassifyError::Ensemble(other),
        })?;

        let probabilities = label_probabilities(&self.labels, &fused.probabilities)?;
        let pattern = self.labels[fused.label_index].clone();

        log::info!(
            "Final prediction: {} (confidence: {:.4}, model: {})",
            pattern,
            fused.confidence,
            fused.strategy
        );

        Ok(FingerprintPrediction {
            pattern,
            class_index: fused.label_index,
            confidence: fused.confidence,
            model_used: fused.strategy,
            probabilities,
            per_model_confidence: fused.per_model_confidence,
        })
    }
}
