//! Labeled 2-D table shared by every derived statistic

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Row-major matrix with one label per row and per column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledMatrix<T> {
    rows: Vec<String>,
    cols: Vec<String>,
    values: Vec<T>,
}

impl<T> LabeledMatrix<T> {
    /// `None` if `values` does not hold exactly `rows × cols` entries
    pub fn new(rows: Vec<String>, cols: Vec<String>, values: Vec<T>) -> Option<Self> {
        if values.len() != rows.len() * cols.len() {
            return None;
        }
        Some(Self { rows, cols, values })
    }

    pub fn from_fn(rows: Vec<String>, cols: Vec<String>, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut values = Vec::with_capacity(rows.len() * cols.len());
        for r in 0..rows.len() {
            for c in 0..cols.len() {
                values.push(f(r, c));
            }
        }
        Self { rows, cols, values }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn cols(&self) -> &[String] {
        &self.cols
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }

    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.values[row * self.cols.len() + col]
    }

    pub fn get_by_label(&self, row: &str, col: &str) -> Option<&T> {
        let r = self.rows.iter().position(|l| l == row)?;
        let c = self.cols.iter().position(|l| l == col)?;
        Some(self.get(r, c))
    }

    pub fn row(&self, row: usize) -> &[T] {
        let width = self.cols.len();
        &self.values[row * width..(row + 1) * width]
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Same labels, cell-wise transform
    pub fn map<U>(&self, mut f: impl FnMut(usize, usize, &T) -> U) -> LabeledMatrix<U> {
        LabeledMatrix::from_fn(self.rows.clone(), self.cols.clone(), |r, c| f(r, c, self.get(r, c)))
    }
}

impl<T: Clone> LabeledMatrix<T> {
    /// `{column: {row: value}}`
    pub fn to_column_major(&self) -> BTreeMap<String, BTreeMap<String, T>> {
        self.cols
            .iter()
            .enumerate()
            .map(|(c, col)| {
                let column = self.rows
                    .iter()
                    .enumerate()
                    .map(|(r, row)| (row.clone(), self.get(r, c).clone()))
                    .collect();
                (col.clone(), column)
            })
            .collect()
    }
}
