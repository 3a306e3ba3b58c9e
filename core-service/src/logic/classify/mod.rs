//! Classification pipelines
//!
//! bytes → normalize → every available adapter → fuse → labeled answer.
//! One failing adapter never aborts the request; the remaining ones answer.

pub mod fingerprint;
pub mod blood;


use std::collections::BTreeMap;
use std::sync::Arc;

use crate::logic::cancel::Cancelled;
use crate::logic::ensemble::{EnsembleError, EnsembleWeights};
use crate::logic::imaging::ImagingError;
use crate::logic::model::{AdapterSpec, ClassifierAdapter, EngineStatus, InferenceError, ModelAdapter, ModelProvider, ProbabilityVector};

pub use blood::{BloodClassifier, BloodPrediction};
pub use fingerprint::{FingerprintClassifier, FingerprintPrediction};

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("No {0} models available")]
    NoModelLoaded(&'static str),

    #[error(transparent)]
    Imaging(#[from] ImagingError),

    #[error("All predictions failed")]
    AllPredictionsFailed,

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Ensemble(#[from] EnsembleError),

    #[error("Model returned {got} scores for {expected} labels")]
    LabelMismatch { expected: usize, got: usize },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Map a fused vector onto its label list
fn label_probabilities(labels: &[String], probs: &ProbabilityVector) -> Result<BTreeMap<String, f32>, ClassifyError> {
    if probs.len() != labels.len() {
        return Err(ClassifyError::LabelMismatch {
            expected: labels.len(),
            got: probs.len(),
        });
    }

    Ok(labels.iter().cloned().zip(probs.as_slice().iter().copied()).collect())
}

// ============================================================================
// CLASSIFIER SET (process-wide, read-only after startup)
// ============================================================================

pub struct ClassifierSet {
    pub fingerprint: FingerprintClassifier,
    pub blood: BloodClassifier,
}

impl ClassifierSet {
    /// Load every model through `provider`. Missing models leave their
    /// adapter unavailable; only a bad weight table is an error.
    pub fn load(
        fingerprint_specs: Vec<AdapterSpec>,
        blood_spec: AdapterSpec,
        weights: EnsembleWeights,
        provider: &dyn ModelProvider,
    ) -> Result<Self, EnsembleError> {
        log::info!("Starting model loading...");

        let adapters: Vec<Arc<dyn ModelAdapter>> = fingerprint_specs
            .into_iter()
            .map(|spec| Arc::new(ClassifierAdapter::load(spec, provider)) as Arc<dyn ModelAdapter>)
            .collect();

        let fingerprint = FingerprintClassifier::new(adapters, weights)?;
        if !fingerprint.has_available_model() {
            log::warn!("No fingerprint models were loaded successfully");
        }

        let blood = BloodClassifier::new(Arc::new(ClassifierAdapter::load(blood_spec, provider)));

        Ok(Self { fingerprint, blood })
    }

    pub fn models_loaded(&self) -> BTreeMap<String, bool> {
        self.adapters()
            .map(|a| (a.name().to_string(), a.is_available()))
            .collect()
    }

    pub fn engine_statuses(&self) -> Vec<EngineStatus> {
        self.adapters().map(|a| a.status()).collect()
    }

    fn adapters(&self) -> impl Iterator<Item = &Arc<dyn ModelAdapter>> {
        self.fingerprint.adapters().iter().chain(std::iter::once(self.blood.adapter()))
    }
}
