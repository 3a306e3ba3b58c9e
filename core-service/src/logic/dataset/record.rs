use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LabeledRecord {
    pub fingerprint_type: String,
    pub blood_group: String,

    // Metadata (kept, unused by the statistics)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// class name → model probability (from `prob_<class>` columns)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub probabilities: BTreeMap<String, f64>,
}

impl LabeledRecord {
    pub fn new(fingerprint_type: impl Into<String>, blood_group: impl Into<String>) -> Self {
        Self {
            fingerprint_type: fingerprint_type.into(),
            blood_group: blood_group.into(),
            file_path: None,
            file_name: None,
            probabilities: BTreeMap::new(),
        }
    }
}

/// Parsed dataset, immutable once loaded
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<LabeledRecord>,
    /// Class names of the `prob_` columns, in header order
    pub probability_columns: Vec<String>,
    /// Rows dropped for a blank category
    pub skipped_rows: usize,
}

impl Dataset {
    pub fn from_records(records: Vec<LabeledRecord>) -> Self {
        Self {
            records,
            probability_columns: Vec::new(),
            skipped_rows: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
