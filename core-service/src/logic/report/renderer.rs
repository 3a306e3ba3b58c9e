//! Plot requests and the renderer seam

use serde::{Deserialize, Serialize};

use crate::logic::analytics::{LabeledMatrix, ProbabilitySeries};
use super::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScale {
    /// Sequential
    Viridis,
    /// Diverging
    Coolwarm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlotKind {
    /// Cell grid, undefined cells drawn as missing
    Heatmap {
        matrix: LabeledMatrix<Option<f64>>,
        scale: ColorScale,
        /// Value mapped to the middle of the scale
        center: Option<f64>,
    },
    Bar {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    /// One group per row, one bar per column
    GroupedBar { matrix: LabeledMatrix<f64> },
    /// One panel per series, `bins` equal bins over [0, 1]
    Histogram {
        series: Vec<ProbabilitySeries>,
        bins: usize,
    },
    /// Column widths ∝ column totals, tile heights ∝ share within column
    Mosaic { matrix: LabeledMatrix<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRequest {
    /// Artifact name (file stem)
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: PlotKind,
}

impl PlotRequest {
    pub fn new(name: &str, title: &str, x_label: &str, y_label: &str, kind: PlotKind) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            kind,
        }
    }
}

/// Turns a plot request into an artifact reference (URL path)
pub trait Renderer: Send + Sync {
    fn render(&self, request: &PlotRequest) -> Result<String, RenderError>;
}
