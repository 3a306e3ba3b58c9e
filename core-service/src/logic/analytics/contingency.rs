//! Cross-tabulation of (fingerprint type, blood group)

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::logic::dataset::LabeledRecord;
use super::matrix::LabeledMatrix;

/// Counts over the full category cross product, with margins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyTable {
    counts: LabeledMatrix<u64>,
    row_totals: Vec<u64>,
    col_totals: Vec<u64>,
    grand_total: u64,
}

impl ContingencyTable {
    /// Rows are fingerprint types, columns blood groups. Both axes are the
    /// sorted union of observed and declared categories.
    pub fn from_records(records: &[LabeledRecord], declared_rows: &[String], declared_cols: &[String]) -> Self {
        let rows: Vec<String> = records
            .iter()
            .map(|r| r.fingerprint_type.clone())
            .chain(declared_rows.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let cols: Vec<String> = records
            .iter()
            .map(|r| r.blood_group.clone())
            .chain(declared_cols.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut values = vec![0u64; rows.len() * cols.len()];
        for record in records {
            // both labels are in the axes by construction
            if let (Ok(r), Ok(c)) = (
                rows.binary_search(&record.fingerprint_type),
                cols.binary_search(&record.blood_group),
            ) {
                values[r * cols.len() + c] += 1;
            }
        }

        let width = cols.len();
        Self::from_matrix(LabeledMatrix::from_fn(rows, cols, |r, c| values[r * width + c]))
    }

    pub fn from_matrix(counts: LabeledMatrix<u64>) -> Self {
        let (n_rows, n_cols) = counts.shape();
        let row_totals: Vec<u64> = (0..n_rows).map(|r| counts.row(r).iter().sum()).collect();
        let col_totals: Vec<u64> = (0..n_cols)
            .map(|c| (0..n_rows).map(|r| *counts.get(r, c)).sum())
            .collect();
        let grand_total = row_totals.iter().sum();

        Self {
            counts,
            row_totals,
            col_totals,
            grand_total,
        }
    }

    pub fn counts(&self) -> &LabeledMatrix<u64> {
        &self.counts
    }

    pub fn row_totals(&self) -> &[u64] {
        &self.row_totals
    }

    pub fn col_totals(&self) -> &[u64] {
        &self.col_totals
    }

    pub fn grand_total(&self) -> u64 {
        self.grand_total
    }

    pub fn shape(&self) -> (usize, usize) {
        self.counts.shape()
    }

    /// Labels of rows and columns whose total is zero
    pub fn zero_margins(&self) -> Vec<String> {
        let rows = self.counts.rows().iter().zip(&self.row_totals);
        let cols = self.counts.cols().iter().zip(&self.col_totals);
        rows.chain(cols)
            .filter(|(_, total)| **total == 0)
            .map(|(label, _)| label.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(pairs: &[(&str, &str)]) -> Vec<LabeledRecord> {
        pairs.iter().map(|(f, b)| LabeledRecord::new(*f, *b)).collect()
    }

    #[test]
    fn test_counts_and_margins() {
        let table = ContingencyTable::from_records(
            &records(&[("whorl", "B+"), ("arc", "A+"), ("arc", "A+"), ("whorl", "A+")]),
            &[],
            &[],
        );

        assert_eq!(table.counts().rows(), &["arc", "whorl"]);
        assert_eq!(table.counts().cols(), &["A+", "B+"]);
        assert_eq!(table.counts().get_by_label("arc", "A+"), Some(&2));
        assert_eq!(table.counts().get_by_label("arc", "B+"), Some(&0));
        assert_eq!(table.row_totals(), &[2, 2]);
        assert_eq!(table.col_totals(), &[3, 1]);
        assert_eq!(table.grand_total(), 4);
        assert!(table.zero_margins().is_empty());
    }

    #[test]
    fn test_declared_categories_appear_with_zero() {
        let declared = vec!["AB-".to_string(), "A+".to_string()];
        let table = ContingencyTable::from_records(&records(&[("loop", "A+")]), &[], &declared);

        assert_eq!(table.counts().cols(), &["A+", "AB-"]);
        assert_eq!(table.col_totals(), &[1, 0]);
        assert_eq!(table.zero_margins(), vec!["AB-".to_string()]);
    }
}
