//! Confidence-weighted fusion

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::WEIGHTED_ENSEMBLE;
use crate::logic::model::ProbabilityVector;
use super::EnsembleError;

/// One adapter's successful answer plus its static weight
#[derive(Debug, Clone)]
pub struct ModelOutput {
    pub name: String,
    pub probabilities: ProbabilityVector,
    pub weight: f32,
}

impl ModelOutput {
    pub fn new(name: impl Into<String>, probabilities: ProbabilityVector, weight: f32) -> Self {
        Self {
            name: name.into(),
            probabilities,
            weight,
        }
    }
}

/// Fusion output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionResult {
    pub probabilities: ProbabilityVector,
    pub label_index: usize,
    pub confidence: f32,
    /// Max of each model's own vector (observability only)
    pub per_model_confidence: BTreeMap<String, f32>,
    /// Single model name, or `weighted_ensemble`
    pub strategy: String,
}

/// Fuse successful model outputs.
///
/// A single output passes through untouched. Several outputs are combined as
/// `Σ (w_i / Σ w) · p_i` over the present models only.
pub fn fuse(outputs: &[ModelOutput]) -> Result<FusionResult, EnsembleError> {
    let first = outputs.first().ok_or(EnsembleError::NoModelAvailable)?;
    let classes = first.probabilities.len();

    for output in outputs {
        if output.probabilities.len() != classes {
            return Err(EnsembleError::LengthMismatch {
                model: output.name.clone(),
                expected: classes,
                got: output.probabilities.len(),
            });
        }
    }

    let per_model_confidence: BTreeMap<String, f32> = outputs
        .iter()
        .map(|o| (o.name.clone(), o.probabilities.max().unwrap_or(0.0)))
        .collect();

    let (probabilities, strategy) = if outputs.len() == 1 {
        (first.probabilities.clone(), first.name.clone())
    } else {
        (weighted_sum(outputs, classes)?, WEIGHTED_ENSEMBLE.to_string())
    };

    let label_index = probabilities
        .argmax()
        .ok_or_else(|| EnsembleError::NoFiniteScore(strategy.clone()))?;
    let confidence = probabilities.as_slice()[label_index];

    Ok(FusionResult {
        probabilities,
        label_index,
        confidence,
        per_model_confidence,
        strategy,
    })
}

fn weighted_sum(outputs: &[ModelOutput], classes: usize) -> Result<ProbabilityVector, EnsembleError> {
    let total: f64 = outputs.iter().map(|o| o.weight as f64).sum();
    if !(total > 0.0) {
        return Err(EnsembleError::InvalidWeights(format!(
            "present weights sum to {}",
            total
        )));
    }

    let mut fused = vec![0.0f64; classes];
    for output in outputs {
        let w = output.weight as f64 / total;
        for (acc, &p) in fused.iter_mut().zip(output.probabilities.as_slice()) {
            *acc += w * p as f64;
        }
    }

    Ok(ProbabilityVector::new(fused.into_iter().map(|v| v as f32).collect()))
}
