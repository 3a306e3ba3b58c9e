//! Probability vector - one score per class, model output order

use serde::{Deserialize, Serialize};

/// Per-class scores. Entries are expected in [0, 1] but need not sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ProbabilityVector(Vec<f32>);

impl ProbabilityVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Index of the maximum; ties resolve to the lowest index
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &v) in self.0.iter().enumerate() {
            match best {
                Some((_, b)) if !(v > b) => {}
                _ if v.is_nan() => {}
                _ => best = Some((i, v)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Largest entry (NaN entries ignored)
    pub fn max(&self) -> Option<f32> {
        self.argmax().map(|i| self.0[i])
    }
}

impl From<Vec<f32>> for ProbabilityVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}
