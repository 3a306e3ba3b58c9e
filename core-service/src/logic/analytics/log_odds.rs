//! Log-odds of each cell against the rest of the table

use super::contingency::ContingencyTable;
use super::matrix::LabeledMatrix;

/// `ln(o / (N - o))` for `o > 0` and `N - o != 0`, undefined otherwise.
///
/// This is not a 2×2 odds ratio: the complement is the whole remaining table.
pub fn log_odds(table: &ContingencyTable) -> LabeledMatrix<Option<f64>> {
    let total = table.grand_total();
    table.counts().map(|_, _, &observed| {
        let rest = total - observed;
        (observed > 0 && rest != 0).then(|| (observed as f64 / rest as f64).ln())
    })
}
