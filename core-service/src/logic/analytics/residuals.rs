//! Standardized residuals and column percentages

use super::contingency::ContingencyTable;
use super::matrix::LabeledMatrix;

/// `(o - e) / sqrt(e)`, undefined where `e == 0`
pub fn standardized_residuals(table: &ContingencyTable, expected: &LabeledMatrix<f64>) -> LabeledMatrix<Option<f64>> {
    table.counts().map(|r, c, &observed| {
        let e = *expected.get(r, c);
        (e > 0.0).then(|| (observed as f64 - e) / e.sqrt())
    })
}

/// `count / col_total · 100`, undefined for an empty column
pub fn column_percentages(table: &ContingencyTable) -> LabeledMatrix<Option<f64>> {
    let totals = table.col_totals();
    table.counts().map(|_, c, &count| {
        (totals[c] > 0).then(|| count as f64 / totals[c] as f64 * 100.0)
    })
}
