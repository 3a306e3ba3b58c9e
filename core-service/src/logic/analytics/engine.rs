//! Association analysis over the labeled records

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::logic::dataset::LabeledRecord;
use super::chi_square::{chi_square, expected_counts, ChiSquareSummary};
use super::contingency::ContingencyTable;
use super::correlation::{encoded_correlation, numeric_correlation, CategoryCodes};
use super::log_odds::log_odds;
use super::matrix::LabeledMatrix;
use super::residuals::{column_percentages, standardized_residuals};
use super::AnalyticsError;

/// What to do with a row or column whose total is zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroMarginPolicy {
    /// Fail with `InsufficientData`
    #[default]
    Reject,
    /// Compute what is defined, flag the report
    MarkUndefined,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub zero_margin_policy: ZeroMarginPolicy,
    /// Continuity correction, 1 dof only
    pub yates_correction: bool,
    pub declared_fingerprint_types: Vec<String>,
    pub declared_blood_groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
}

/// Values of one `prob_<class>` column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilitySeries {
    pub class: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationReport {
    pub contingency: ContingencyTable,
    pub expected: LabeledMatrix<f64>,
    pub chi_square: ChiSquareSummary,
    pub residuals: LabeledMatrix<Option<f64>>,
    pub log_odds: LabeledMatrix<Option<f64>>,
    pub column_percentages: LabeledMatrix<Option<f64>>,
    pub correlation: LabeledMatrix<Option<f64>>,
    /// `correlation` extended with the `prob_` columns
    pub numeric_correlation: LabeledMatrix<Option<f64>>,
    pub codes: CategoryCodes,
    /// Most frequent first, ties by label
    pub pattern_distribution: Vec<CategoryCount>,
    pub probability_series: Vec<ProbabilitySeries>,
    /// Some cells have zero expected count (only under `MarkUndefined`)
    pub undefined_cells: bool,
}

pub fn analyze(records: &[LabeledRecord], options: &AnalysisOptions) -> Result<AssociationReport, AnalyticsError> {
    if records.is_empty() {
        return Err(AnalyticsError::InsufficientData("no records".to_string()));
    }

    let table = ContingencyTable::from_records(
        records,
        &options.declared_fingerprint_types,
        &options.declared_blood_groups,
    );

    let zero_margins = table.zero_margins();
    let undefined_cells = !zero_margins.is_empty();
    if undefined_cells {
        match options.zero_margin_policy {
            ZeroMarginPolicy::Reject => {
                return Err(AnalyticsError::InsufficientData(format!(
                    "zero totals for {}",
                    zero_margins.join(", ")
                )));
            }
            ZeroMarginPolicy::MarkUndefined => {
                log::warn!("Zero totals for {}, affected cells left undefined", zero_margins.join(", "));
            }
        }
    }

    let expected = expected_counts(&table);
    let chi_square = chi_square(&table, &expected, options.yates_correction);
    let residuals = standardized_residuals(&table, &expected);
    let codes = CategoryCodes::from_table(&table);
    let correlation = encoded_correlation(records, &codes);
    let numeric_correlation = numeric_correlation(records, &codes);

    log::info!(
        "Association analysis: {} records, {}x{} table, chi2={:.4}, p={:.4e}, dof={}",
        table.grand_total(),
        table.shape().0,
        table.shape().1,
        chi_square.chi2,
        chi_square.p,
        chi_square.dof
    );

    Ok(AssociationReport {
        log_odds: log_odds(&table),
        column_percentages: column_percentages(&table),
        pattern_distribution: pattern_distribution(&table),
        probability_series: probability_series(records),
        contingency: table,
        expected,
        chi_square,
        residuals,
        correlation,
        numeric_correlation,
        codes,
        undefined_cells,
    })
}

fn pattern_distribution(table: &ContingencyTable) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = table
        .counts()
        .rows()
        .iter()
        .zip(table.row_totals())
        .map(|(label, &count)| CategoryCount {
            label: label.clone(),
            count,
        })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts
}

fn probability_series(records: &[LabeledRecord]) -> Vec<ProbabilitySeries> {
    let classes: BTreeSet<&String> = records.iter().flat_map(|r| r.probabilities.keys()).collect();

    let mut series: BTreeMap<&String, Vec<f64>> = classes.into_iter().map(|c| (c, Vec::new())).collect();
    for record in records {
        for (class, &value) in &record.probabilities {
            if let Some(values) = series.get_mut(class) {
                values.push(value);
            }
        }
    }

    series
        .into_iter()
        .map(|(class, values)| ProbabilitySeries {
            class: class.clone(),
            values,
        })
        .collect()
}
