//! Analytics Module - categorical association between fingerprint pattern
//! and blood group
//!
//! Kiểm định độc lập chi-square trên bảng tần suất, kèm residual chuẩn hóa,
//! log-odds và tương quan trên mã số của category.
//!
//! Every derived table keeps the row/column order of the contingency table.

pub mod matrix;
pub mod contingency;
pub mod chi_square;
pub mod residuals;
pub mod log_odds;
pub mod correlation;
pub mod engine;

#[cfg(test)]
mod tests;

pub use chi_square::ChiSquareSummary;
pub use contingency::ContingencyTable;
pub use correlation::CategoryCodes;
pub use engine::{analyze, AnalysisOptions, AssociationReport, CategoryCount, ProbabilitySeries, ZeroMarginPolicy};
pub use matrix::LabeledMatrix;

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}
