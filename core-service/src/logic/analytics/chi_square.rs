//! Chi-square test of independence

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use super::contingency::ContingencyTable;
use super::matrix::LabeledMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareSummary {
    pub chi2: f64,
    pub p: f64,
    pub dof: usize,
}

/// `row_total · col_total / grand_total` per cell
pub fn expected_counts(table: &ContingencyTable) -> LabeledMatrix<f64> {
    let total = table.grand_total() as f64;
    let rows = table.row_totals();
    let cols = table.col_totals();

    table.counts().map(|r, c, _| {
        if total > 0.0 {
            rows[r] as f64 * cols[c] as f64 / total
        } else {
            0.0
        }
    })
}

/// Pearson statistic over cells with a positive expected count.
///
/// With `yates` and a single degree of freedom, each `|o - e|` is reduced by
/// `min(0.5, |o - e|)` before squaring.
pub fn chi_square(table: &ContingencyTable, expected: &LabeledMatrix<f64>, yates: bool) -> ChiSquareSummary {
    let (n_rows, n_cols) = table.shape();
    let dof = n_rows.saturating_sub(1) * n_cols.saturating_sub(1);

    if dof == 0 {
        return ChiSquareSummary { chi2: 0.0, p: 1.0, dof };
    }

    let correct = yates && dof == 1;
    let mut chi2 = 0.0f64;
    for r in 0..n_rows {
        for c in 0..n_cols {
            let e = *expected.get(r, c);
            if e <= 0.0 {
                continue;
            }
            let mut diff = (*table.counts().get(r, c) as f64 - e).abs();
            if correct {
                diff -= diff.min(0.5);
            }
            chi2 += diff * diff / e;
        }
    }

    ChiSquareSummary {
        chi2,
        p: p_value(chi2, dof),
        dof,
    }
}

fn p_value(chi2: f64, dof: usize) -> f64 {
    match ChiSquared::new(dof as f64) {
        Ok(dist) => dist.sf(chi2),
        Err(e) => {
            log::warn!("Chi-square distribution with {} dof unavailable: {}", dof, e);
            f64::NAN
        }
    }
}
