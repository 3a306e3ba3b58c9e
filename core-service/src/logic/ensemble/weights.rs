//! Static ensemble weights (process-wide configuration)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants;
use super::EnsembleError;

/// Adapter name → weight. Weights are finite and non-negative, with a
/// positive total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeights(BTreeMap<String, f32>);

impl EnsembleWeights {
    pub fn new<I, S>(entries: I) -> Result<Self, EnsembleError>
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let mut weights = BTreeMap::new();
        for (name, weight) in entries {
            let name = name.into();
            if !weight.is_finite() || weight < 0.0 {
                return Err(EnsembleError::InvalidWeights(format!("{} = {}", name, weight)));
            }
            weights.insert(name, weight);
        }

        let total: f32 = weights.values().sum();
        if !(total > 0.0) {
            return Err(EnsembleError::InvalidWeights(format!("weights sum to {}", total)));
        }
        Ok(Self(weights))
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(constants::EFFICIENTNET.to_string(), constants::DEFAULT_EFFICIENTNET_WEIGHT);
        weights.insert(constants::INCEPTION.to_string(), constants::DEFAULT_INCEPTION_WEIGHT);
        Self(weights)
    }
}
