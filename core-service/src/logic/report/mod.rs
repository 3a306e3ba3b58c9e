//! Report Module - analytics payload for the API
//!
//! Tables are serialized straight from the `AssociationReport`; plots go
//! through a `Renderer` and only their artifact reference is kept.

pub mod renderer;
pub mod colormap;
pub mod png;
pub mod assembler;

pub use assembler::{assemble, AnalyticsPayload, AnalyticsTables, PLOT_NAMES};
pub use png::PngRenderer;
pub use renderer::{ColorScale, PlotKind, PlotRequest, Renderer};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Render IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Plot drawing error: {0}")]
    Plot(String),

    #[error("Nothing to render: {0}")]
    EmptyInput(String),
}
