//! Association report → named tables + rendered plots

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logic::analytics::{AssociationReport, ChiSquareSummary, LabeledMatrix};
use crate::logic::cancel::{CancelToken, Cancelled};
use super::renderer::{ColorScale, PlotKind, PlotRequest, Renderer};

/// Every plot name the payload carries, rendered or not
pub const PLOT_NAMES: [&str; 9] = [
    "heatmap",
    "percent_heatmap",
    "pattern_distribution",
    "log_odds",
    "correlation_encoded",
    "barplot",
    "residuals",
    "probability_distribution",
    "mosaic",
];

pub const HISTOGRAM_BINS: usize = 20;

type Nested<T> = BTreeMap<String, BTreeMap<String, T>>;

/// Column-major nested tables (`{column: {row: value}}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsTables {
    pub frequency: Nested<u64>,
    pub expected: Nested<f64>,
    pub chi_square: ChiSquareSummary,
    pub residuals: Nested<Option<f64>>,
    pub correlation: Nested<Option<f64>>,
    pub log_odds: Nested<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsPayload {
    pub tables: AnalyticsTables,
    /// name → artifact reference, `None` when absent or failed
    pub plots: BTreeMap<String, Option<String>>,
}

pub fn tables(report: &AssociationReport) -> AnalyticsTables {
    AnalyticsTables {
        frequency: report.contingency.counts().to_column_major(),
        expected: report.expected.to_column_major(),
        chi_square: report.chi_square,
        residuals: report.residuals.to_column_major(),
        correlation: report.correlation.to_column_major(),
        log_odds: report.log_odds.to_column_major(),
    }
}

/// One request per plot name; `None` when the report lacks the input
pub fn plot_requests(report: &AssociationReport) -> Vec<(&'static str, Option<PlotRequest>)> {
    let counts = report.contingency.counts();
    let counts_f64: LabeledMatrix<f64> = counts.map(|_, _, &v| v as f64);
    let counts_opt: LabeledMatrix<Option<f64>> = counts.map(|_, _, &v| Some(v as f64));

    const BLOOD: &str = "Blood Group";
    const PATTERN: &str = "Fingerprint Type";

    PLOT_NAMES
        .iter()
        .map(|&name| {
            let request = match name {
                "heatmap" => Some(PlotRequest::new(
                    name,
                    "Fingerprint vs Blood Group Frequency",
                    BLOOD,
                    PATTERN,
                    PlotKind::Heatmap { matrix: counts_opt.clone(), scale: ColorScale::Viridis, center: None },
                )),
                "percent_heatmap" => Some(PlotRequest::new(
                    name,
                    "% Fingerprint Distribution by Blood Group",
                    BLOOD,
                    PATTERN,
                    PlotKind::Heatmap {
                        matrix: report.column_percentages.clone(),
                        scale: ColorScale::Coolwarm,
                        center: None,
                    },
                )),
                "pattern_distribution" => Some(PlotRequest::new(
                    name,
                    "Fingerprint Pattern Distribution",
                    PATTERN,
                    "Count",
                    PlotKind::Bar {
                        labels: report.pattern_distribution.iter().map(|c| c.label.clone()).collect(),
                        values: report.pattern_distribution.iter().map(|c| c.count as f64).collect(),
                    },
                )),
                "log_odds" => Some(PlotRequest::new(
                    name,
                    "Log-Odds (cell vs rest of table)",
                    BLOOD,
                    PATTERN,
                    PlotKind::Heatmap { matrix: report.log_odds.clone(), scale: ColorScale::Coolwarm, center: Some(0.0) },
                )),
                "correlation_encoded" => Some(PlotRequest::new(
                    name,
                    "Correlation Matrix (Encoded Labels)",
                    "Variable",
                    "Variable",
                    PlotKind::Heatmap {
                        matrix: report.numeric_correlation.clone(),
                        scale: ColorScale::Viridis,
                        center: Some(0.0),
                    },
                )),
                "barplot" => Some(PlotRequest::new(
                    name,
                    "Blood Group Counts per Fingerprint Type",
                    PATTERN,
                    "Count",
                    PlotKind::GroupedBar { matrix: counts_f64.clone() },
                )),
                "residuals" => Some(PlotRequest::new(
                    name,
                    "Standardized Residuals",
                    BLOOD,
                    PATTERN,
                    PlotKind::Heatmap { matrix: report.residuals.clone(), scale: ColorScale::Coolwarm, center: Some(0.0) },
                )),
                "probability_distribution" => (!report.probability_series.is_empty()).then(|| {
                    PlotRequest::new(
                        name,
                        "Model Probability Distribution",
                        "Probability",
                        "Count",
                        PlotKind::Histogram { series: report.probability_series.clone(), bins: HISTOGRAM_BINS },
                    )
                }),
                "mosaic" => Some(PlotRequest::new(
                    name,
                    "Mosaic Plot: Blood Group vs Fingerprint Type",
                    BLOOD,
                    PATTERN,
                    PlotKind::Mosaic { matrix: counts_f64.clone() },
                )),
                _ => None,
            };
            (name, request)
        })
        .collect()
}

/// Build the payload. A plot that fails to render is logged and left `None`;
/// tables are always complete.
pub fn assemble(
    report: &AssociationReport,
    renderer: &dyn Renderer,
    cancel: &CancelToken,
) -> Result<AnalyticsPayload, Cancelled> {
    let mut plots = BTreeMap::new();

    for (name, request) in plot_requests(report) {
        cancel.check()?;

        let reference = match request {
            Some(request) => match renderer.render(&request) {
                Ok(reference) => Some(reference),
                Err(e) => {
                    log::error!("Failed to render plot {}: {}", name, e);
                    None
                }
            },
            None => {
                log::debug!("Skipping plot {}: no input", name);
                None
            }
        };
        plots.insert(name.to_string(), reference);
    }

    Ok(AnalyticsPayload {
        tables: tables(report),
        plots,
    })
}
