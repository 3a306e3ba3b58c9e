//! Pearson correlation over integer-coded categories
//!
//! Categories are nominal, so the coefficient only hints at an association;
//! it depends on the arbitrary (sorted) code order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::logic::dataset::loader::PROBABILITY_PREFIX;
use crate::logic::dataset::LabeledRecord;
use super::contingency::ContingencyTable;
use super::matrix::LabeledMatrix;

pub const FINGERPRINT_VARIABLE: &str = "FingerprintType";
pub const BLOOD_VARIABLE: &str = "BloodGroup";

/// Category → code, codes are indices in sorted category order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCodes {
    pub fingerprint: BTreeMap<String, usize>,
    pub blood: BTreeMap<String, usize>,
}

impl CategoryCodes {
    /// Codes follow the table axes, which are already sorted
    pub fn from_table(table: &ContingencyTable) -> Self {
        let index = |labels: &[String]| -> BTreeMap<String, usize> {
            labels.iter().cloned().enumerate().map(|(i, l)| (l, i)).collect()
        };
        Self {
            fingerprint: index(table.counts().rows()),
            blood: index(table.counts().cols()),
        }
    }
}

/// One numeric variable, `None` where a record has no value
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// The two coded category columns, in record order
pub fn encoded_columns(records: &[LabeledRecord], codes: &CategoryCodes) -> Vec<NumericColumn> {
    let column = |name: &str, code: &dyn Fn(&LabeledRecord) -> Option<usize>| NumericColumn {
        name: name.to_string(),
        values: records.iter().map(|r| code(r).map(|c| c as f64)).collect(),
    };

    vec![
        column(FINGERPRINT_VARIABLE, &|r: &LabeledRecord| codes.fingerprint.get(&r.fingerprint_type).copied()),
        column(BLOOD_VARIABLE, &|r: &LabeledRecord| codes.blood.get(&r.blood_group).copied()),
    ]
}

/// `prob_<class>` columns, classes sorted
pub fn probability_columns(records: &[LabeledRecord]) -> Vec<NumericColumn> {
    let classes: BTreeSet<&String> = records.iter().flat_map(|r| r.probabilities.keys()).collect();

    classes
        .into_iter()
        .map(|class| NumericColumn {
            name: format!("{}{}", PROBABILITY_PREFIX, class),
            values: records.iter().map(|r| r.probabilities.get(class).copied()).collect(),
        })
        .collect()
}

/// Pairwise-complete Pearson matrix. The diagonal is 1.0; an off-diagonal
/// cell is undefined when fewer than two records carry both values or either
/// side has zero variance.
pub fn correlation_matrix(columns: &[NumericColumn]) -> LabeledMatrix<Option<f64>> {
    let labels: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();

    LabeledMatrix::from_fn(labels.clone(), labels, |i, j| {
        if i == j {
            return Some(1.0);
        }
        let pairs: Vec<(f64, f64)> = columns[i]
            .values
            .iter()
            .zip(&columns[j].values)
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .collect();
        pearson(&pairs)
    })
}

/// 2×2 matrix over `[FingerprintType, BloodGroup]`
pub fn encoded_correlation(records: &[LabeledRecord], codes: &CategoryCodes) -> LabeledMatrix<Option<f64>> {
    correlation_matrix(&encoded_columns(records, codes))
}

/// Coded categories plus every probability column
pub fn numeric_correlation(records: &[LabeledRecord], codes: &CategoryCodes) -> LabeledMatrix<Option<f64>> {
    let mut columns = encoded_columns(records, codes);
    columns.extend(probability_columns(records));
    correlation_matrix(&columns)
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0f64, 0.0f64, 0.0f64);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x * var_y).sqrt())
}
