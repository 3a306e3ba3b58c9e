//! Blood group pipeline (single model)

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::cancel::CancelToken;
use crate::logic::ensemble::{fuse, ModelOutput};
use crate::logic::imaging::normalize;
use crate::logic::model::ModelAdapter;
use super::{label_probabilities, ClassifyError};

/// Blood response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodPrediction {
    pub blood_type: String,
    pub confidence: f32,
    pub probabilities: BTreeMap<String, f32>,
}

pub struct BloodClassifier {
    adapter: Arc<dyn ModelAdapter>,
    labels: Vec<String>,
}

impl BloodClassifier {
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
        Self {
            adapter,
            labels: constants::BLOOD_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn adapter(&self) -> &Arc<dyn ModelAdapter> {
        &self.adapter
    }

    pub fn is_available(&self) -> bool {
        self.adapter.is_available()
    }

    pub fn classify(&self, image_bytes: &[u8], cancel: &CancelToken) -> Result<BloodPrediction, ClassifyError> {
        if !self.adapter.is_available() {
            return Err(ClassifyError::NoModelLoaded("blood"));
        }
        cancel.check()?;

        let (height, width) = self.adapter.input_size();
        let tensor = normalize(image_bytes, height, width)?;

        cancel.check()?;
        let probabilities = self.adapter.predict(&tensor)?;

        // single output: fusion only picks the label
        let fused = fuse(&[ModelOutput::new(self.adapter.name(), probabilities, 1.0)])?;
        let labeled = label_probabilities(&self.labels, &fused.probabilities)?;

        Ok(BloodPrediction {
            blood_type: self.labels[fused.label_index].clone(),
            confidence: fused.confidence,
            probabilities: labeled,
        })
    }
}
