//! PNG renderer on `plotters`
//!
//! Charts are drawn into an in-memory RGB buffer with the bitmap backend,
//! encoded with `image`, then moved into place under `output_dir`.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tempfile::NamedTempFile;

use crate::logic::analytics::{LabeledMatrix, ProbabilitySeries};
use super::colormap::{categorical, sample};
use super::renderer::{ColorScale, PlotKind, PlotRequest, Renderer};
use super::RenderError;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const FONT: &str = "sans-serif";

const MISSING: RGBColor = RGBColor(160, 160, 160);
const BAR: RGBColor = RGBColor(0, 128, 128);

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Writes `<name>.png` into `output_dir`, returns `<public_prefix>/<name>.png`
#[derive(Debug, Clone)]
pub struct PngRenderer {
    output_dir: PathBuf,
    public_prefix: String,
}

impl PngRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            public_prefix: public_prefix.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn draw(&self, request: &PlotRequest) -> Result<RgbImage, RenderError> {
        validate(&request.kind)?;

        let mut buffer = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)).into_drawing_area();
            root.fill(&WHITE).map_err(plot_err)?;

            let root = if request.title.is_empty() {
                root
            } else {
                root.titled(&request.title, (FONT, 24.0)).map_err(plot_err)?
            };

            match &request.kind {
                PlotKind::Heatmap { matrix, scale, center } => heatmap(&root, request, matrix, *scale, *center)?,
                PlotKind::Bar { labels, values } => bars(&root, request, labels, values)?,
                PlotKind::GroupedBar { matrix } => grouped_bars(&root, request, matrix)?,
                PlotKind::Histogram { series, bins } => histograms(&root, request, series, *bins)?,
                PlotKind::Mosaic { matrix } => mosaic(&root, request, matrix)?,
            }

            root.present().map_err(plot_err)?;
        }

        RgbImage::from_raw(WIDTH, HEIGHT, buffer)
            .ok_or_else(|| RenderError::Plot("bitmap buffer size mismatch".to_string()))
    }
}

impl Renderer for PngRenderer {
    fn render(&self, request: &PlotRequest) -> Result<String, RenderError> {
        let img = self.draw(request)?;
        let mut encoded = Cursor::new(Vec::new());
        img.write_to(&mut encoded, ImageFormat::Png)?;

        fs::create_dir_all(&self.output_dir)?;
        let file_name = format!("{}.png", request.name);

        // Readers of the served file see either the previous plot or this one
        let mut staged = NamedTempFile::new_in(&self.output_dir)?;
        staged.write_all(encoded.get_ref())?;
        staged
            .persist(self.output_dir.join(&file_name))
            .map_err(|e| RenderError::Io(e.error))?;

        log::debug!("Rendered plot {} ({})", request.name, request.title);
        Ok(format!("{}/{}", self.public_prefix.trim_end_matches('/'), file_name))
    }
}

fn plot_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Plot(err.to_string())
}

/// Reject inputs with nothing to draw before touching the canvas
fn validate(kind: &PlotKind) -> Result<(), RenderError> {
    let empty = |what: &str| Err(RenderError::EmptyInput(what.to_string()));

    match kind {
        PlotKind::Heatmap { matrix, .. } => {
            let (rows, cols) = matrix.shape();
            if rows == 0 || cols == 0 {
                return empty("heatmap without cells");
            }
        }
        PlotKind::Bar { labels, values } => {
            if labels.len() != values.len() {
                return Err(RenderError::EmptyInput(format!(
                    "{} labels for {} values",
                    labels.len(),
                    values.len()
                )));
            }
            if values.is_empty() {
                return empty("bar chart without values");
            }
        }
        PlotKind::GroupedBar { matrix } => {
            let (rows, cols) = matrix.shape();
            if rows == 0 || cols == 0 {
                return empty("grouped bars without groups");
            }
        }
        PlotKind::Histogram { series, bins } => {
            if series.is_empty() || *bins == 0 {
                return empty("histogram without series");
            }
        }
        PlotKind::Mosaic { matrix } => {
            let total: f64 = matrix.values().iter().map(|v| v.max(0.0)).sum();
            if !(total > 0.0) {
                return empty("mosaic without counts");
            }
        }
    }
    Ok(())
}

// ============================================================================
// AXIS HELPERS
// ============================================================================

/// Category whose unit slot is centered on `value`, empty between slots.
/// With `reversed` the first label sits in the top slot.
fn category_at(labels: &[String], value: f64, reversed: bool) -> String {
    let slot = value.floor();
    if slot < 0.0 || (value - slot - 0.5).abs() > 1e-6 {
        return String::new();
    }

    let slot = slot as usize;
    if slot >= labels.len() {
        return String::new();
    }
    let index = if reversed { labels.len() - 1 - slot } else { slot };
    labels[index].clone()
}

/// Counts without decimals, everything else with two
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Dark text on light cells and the reverse
fn ink_for(fill: RGBColor) -> RGBColor {
    let luma = 0.299 * fill.0 as f64 + 0.587 * fill.1 as f64 + 0.114 * fill.2 as f64;
    if luma > 140.0 { BLACK } else { WHITE }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// Headroom above the tallest bar
fn bar_ceiling(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.map(finite_or_zero).fold(0.0f64, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

// ============================================================================
// PLOTS
// ============================================================================

fn heatmap(
    root: &Area,
    request: &PlotRequest,
    matrix: &LabeledMatrix<Option<f64>>,
    scale: ColorScale,
    center: Option<f64>,
) -> Result<(), RenderError> {
    let (n_rows, n_cols) = matrix.shape();
    let (rows, cols) = (matrix.rows(), matrix.cols());

    let defined: Vec<f64> = matrix.values().iter().flatten().copied().filter(|v| v.is_finite()).collect();
    let (lo, hi) = value_range(&defined, center);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(120)
        .build_cartesian_2d(0f64..n_cols as f64, 0f64..n_rows as f64)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(2 * n_cols + 1)
        .y_labels(2 * n_rows + 1)
        .x_label_formatter(&|x| category_at(cols, *x, false))
        .y_label_formatter(&|y| category_at(rows, *y, true))
        .x_desc(request.x_label.as_str())
        .y_desc(request.y_label.as_str())
        .draw()
        .map_err(plot_err)?;

    let annotation = TextStyle::from((FONT, 15.0).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

    for r in 0..n_rows {
        // first row on top
        let y = (n_rows - 1 - r) as f64;
        for c in 0..n_cols {
            let x = c as f64;
            let value = matrix.get(r, c).filter(|v| v.is_finite());
            let fill = match value {
                Some(v) => sample(scale, if hi > lo { (v - lo) / (hi - lo) } else { 0.5 }),
                None => MISSING,
            };

            chart
                .draw_series(std::iter::once(Rectangle::new([(x, y), (x + 1.0, y + 1.0)], fill.filled())))
                .map_err(plot_err)?;
            chart
                .draw_series(std::iter::once(Rectangle::new([(x, y), (x + 1.0, y + 1.0)], WHITE.stroke_width(1))))
                .map_err(plot_err)?;

            let text = value.map(format_value).unwrap_or_else(|| "n/a".to_string());
            chart
                .draw_series(std::iter::once(Text::new(
                    text,
                    (x + 0.5, y + 0.5),
                    annotation.color(&ink_for(fill)),
                )))
                .map_err(plot_err)?;
        }
    }

    Ok(())
}

/// Data range, symmetric around `center` when given
fn value_range(values: &[f64], center: Option<f64>) -> (f64, f64) {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() {
        return (0.0, 0.0);
    }

    match center {
        Some(c) => {
            let half = (hi - c).abs().max((lo - c).abs());
            (c - half, c + half)
        }
        None => (lo, hi),
    }
}

fn bars(root: &Area, request: &PlotRequest, labels: &[String], values: &[f64]) -> Result<(), RenderError> {
    let n = labels.len();

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..n as f64, 0f64..bar_ceiling(values.iter().copied()))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(2 * n + 1)
        .x_label_formatter(&|x| category_at(labels, *x, false))
        .x_desc(request.x_label.as_str())
        .y_desc(request.y_label.as_str())
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(values.iter().enumerate().map(|(i, &v)| {
            let x = i as f64;
            Rectangle::new([(x + 0.15, 0.0), (x + 0.85, finite_or_zero(v))], BAR.filled())
        }))
        .map_err(plot_err)?;

    Ok(())
}

/// One group per row, one colored bar per column, legend by column
fn grouped_bars(root: &Area, request: &PlotRequest, matrix: &LabeledMatrix<f64>) -> Result<(), RenderError> {
    let (n_rows, n_cols) = matrix.shape();
    let groups = matrix.rows();

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..n_rows as f64, 0f64..bar_ceiling(matrix.values().iter().copied()))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(2 * n_rows + 1)
        .x_label_formatter(&|x| category_at(groups, *x, false))
        .x_desc(request.x_label.as_str())
        .y_desc(request.y_label.as_str())
        .draw()
        .map_err(plot_err)?;

    let width = 0.8 / n_cols as f64;
    for (c, label) in matrix.cols().iter().enumerate() {
        let color = categorical(c);
        chart
            .draw_series((0..n_rows).map(|r| {
                let x0 = r as f64 + 0.1 + width * c as f64;
                Rectangle::new([(x0, 0.0), (x0 + width, finite_or_zero(*matrix.get(r, c)))], color.filled())
            }))
            .map_err(plot_err)?
            .label(label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE)
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}

/// One panel per class, equal bins over [0, 1]
fn histograms(root: &Area, request: &PlotRequest, series: &[ProbabilitySeries], bins: usize) -> Result<(), RenderError> {
    let panels = root.split_evenly((series.len(), 1));

    for (i, (panel, s)) in panels.iter().zip(series).enumerate() {
        let counts = bin_counts(&s.values, bins);
        let color = categorical(i);

        let mut chart = ChartBuilder::on(panel)
            .margin(8)
            .caption(&s.class, (FONT, 16.0))
            .x_label_area_size(35)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..1f64, 0f64..bar_ceiling(counts.iter().map(|&c| c as f64)))
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(request.x_label.as_str())
            .y_desc(request.y_label.as_str())
            .draw()
            .map_err(plot_err)?;

        let step = 1.0 / bins as f64;
        chart
            .draw_series(counts.iter().enumerate().map(|(b, &count)| {
                let x0 = b as f64 * step;
                Rectangle::new([(x0, 0.0), (x0 + step, count as f64)], color.filled())
            }))
            .map_err(plot_err)?;
    }

    Ok(())
}

/// Equal-width bins over [0, 1]; 1.0 lands in the last bin
fn bin_counts(values: &[f64], bins: usize) -> Vec<u64> {
    let mut counts = vec![0u64; bins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        let idx = ((v.clamp(0.0, 1.0) * bins as f64) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

/// Column widths ∝ column totals, tile heights ∝ share within the column.
/// Each tile is labeled `<column> / <row>`.
fn mosaic(root: &Area, request: &PlotRequest, matrix: &LabeledMatrix<f64>) -> Result<(), RenderError> {
    let (n_rows, n_cols) = matrix.shape();
    let col_totals: Vec<f64> = (0..n_cols)
        .map(|c| (0..n_rows).map(|r| matrix.get(r, c).max(0.0)).sum())
        .collect();
    let total: f64 = col_totals.iter().sum();

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..1f64, 0f64..1f64)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(request.x_label.as_str())
        .y_desc(request.y_label.as_str())
        .draw()
        .map_err(plot_err)?;

    const GAP: f64 = 0.005;
    let label_style = TextStyle::from((FONT, 12.0).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

    let mut x = 0.0;
    for (c, &col_total) in col_totals.iter().enumerate() {
        let w = col_total / total;
        // first row on top
        let mut top = 1.0;
        for r in 0..n_rows {
            let h = if col_total > 0.0 { matrix.get(r, c).max(0.0) / col_total } else { 0.0 };
            if h > 0.0 && w > 0.0 {
                let fill = categorical(r);
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(x + GAP, top - h + GAP), (x + w - GAP, top - GAP)],
                        fill.filled(),
                    )))
                    .map_err(plot_err)?;

                if h > 0.06 && w > 0.06 {
                    let text = format!("{} / {}", matrix.cols()[c], matrix.rows()[r]);
                    chart
                        .draw_series(std::iter::once(Text::new(
                            text,
                            (x + w / 2.0, top - h / 2.0),
                            label_style.color(&ink_for(fill)),
                        )))
                        .map_err(plot_err)?;
                }
            }
            top -= h;
        }
        x += w;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn heatmap_request(values: Vec<Option<f64>>) -> PlotRequest {
        let matrix = LabeledMatrix::new(labels(&["a", "b"]), labels(&["x", "y"]), values).unwrap();
        PlotRequest::new(
            "residuals",
            "Residuals",
            "Blood Group",
            "Fingerprint Type",
            PlotKind::Heatmap { matrix, scale: ColorScale::Coolwarm, center: Some(0.0) },
        )
    }

    fn has_color(img: &RgbImage, color: RGBColor) -> bool {
        img.pixels().any(|p| p.0 == [color.0, color.1, color.2])
    }

    #[test]
    fn test_render_writes_png_and_returns_reference() {
        let dir = tempdir().unwrap();
        let renderer = PngRenderer::new(dir.path().join("analytics"), "static/analytics/");

        let reference = renderer
            .render(&heatmap_request(vec![Some(1.0), Some(-1.0), None, Some(0.0)]))
            .unwrap();

        assert_eq!(reference, "static/analytics/residuals.png");
        let img = image::open(dir.path().join("analytics").join("residuals.png")).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
    }

    #[test]
    fn test_heatmap_cell_colors() {
        let renderer = PngRenderer::new("unused", "static");
        let img = renderer
            .draw(&heatmap_request(vec![Some(2.0), Some(-2.0), None, Some(0.0)]))
            .unwrap();

        assert!(has_color(&img, RGBColor(180, 4, 38)));
        assert!(has_color(&img, RGBColor(59, 76, 192)));
        assert!(has_color(&img, RGBColor(221, 221, 221)));
        assert!(has_color(&img, MISSING));
    }

    #[test]
    fn test_title_and_axis_labels_are_drawn() {
        let renderer = PngRenderer::new("unused", "static");
        let labelled = heatmap_request(vec![Some(10.0), Some(0.0), Some(5.0), Some(5.0)]);
        let mut unlabelled = labelled.clone();
        unlabelled.title.clear();
        unlabelled.x_label.clear();
        unlabelled.y_label.clear();

        let with_text = renderer.draw(&labelled).unwrap();
        let without_text = renderer.draw(&unlabelled).unwrap();
        assert_ne!(with_text.as_raw(), without_text.as_raw());

        let mut retitled = labelled.clone();
        retitled.title = "Fingerprint vs Blood Group Frequency".to_string();
        assert_ne!(renderer.draw(&retitled).unwrap().as_raw(), with_text.as_raw());
    }

    #[test]
    fn test_cell_values_are_annotated() {
        // same colors after normalization, different numbers in the cells
        let renderer = PngRenderer::new("unused", "static");
        let small = renderer.draw(&heatmap_request(vec![Some(1.0), Some(-1.0), Some(0.0), Some(0.5)])).unwrap();
        let large = renderer.draw(&heatmap_request(vec![Some(4.0), Some(-4.0), Some(0.0), Some(2.0)])).unwrap();

        assert_ne!(small.as_raw(), large.as_raw());
    }

    #[test]
    fn test_rerender_replaces_file_atomically() {
        let dir = tempdir().unwrap();
        let renderer = PngRenderer::new(dir.path(), "static");
        let request = heatmap_request(vec![Some(1.0), Some(2.0), Some(3.0), None]);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| renderer.render(&request).unwrap());
            }
        });

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["residuals.png".to_string()]);
        assert!(image::open(dir.path().join("residuals.png")).is_ok());
    }

    #[test]
    fn test_empty_heatmap_is_rejected() {
        let renderer = PngRenderer::new("unused", "static");
        let matrix = LabeledMatrix::new(Vec::new(), labels(&["x"]), Vec::new()).unwrap();
        let request = PlotRequest::new(
            "heatmap",
            "Empty",
            "",
            "",
            PlotKind::Heatmap { matrix, scale: ColorScale::Viridis, center: None },
        );

        assert!(matches!(renderer.draw(&request), Err(RenderError::EmptyInput(_))));
    }

    #[test]
    fn test_other_kinds_draw() {
        let renderer = PngRenderer::new("unused", "static");
        let counts = LabeledMatrix::new(labels(&["arc", "loop"]), labels(&["A+", "O-"]), vec![10.0, 0.0, 0.0, 10.0]).unwrap();

        let kinds = [
            (PlotKind::Bar { labels: labels(&["arc", "loop"]), values: vec![3.0, 1.0] }, BAR),
            (PlotKind::GroupedBar { matrix: counts.clone() }, categorical(0)),
            (PlotKind::Mosaic { matrix: counts }, categorical(0)),
            (
                PlotKind::Histogram {
                    series: vec![ProbabilitySeries { class: "class1_arc".to_string(), values: vec![0.1, 0.95, 1.0] }],
                    bins: 20,
                },
                categorical(0),
            ),
        ];
        for (kind, fill) in kinds {
            let request = PlotRequest::new("plot", "Title", "x", "y", kind);
            let img = renderer.draw(&request).unwrap();
            assert!(has_color(&img, fill), "missing fill for {:?}", request.kind);
        }
    }

    #[test]
    fn test_mismatched_bar_input() {
        let renderer = PngRenderer::new("unused", "static");
        let request = PlotRequest::new("bar", "", "", "", PlotKind::Bar { labels: labels(&["a"]), values: vec![] });
        assert!(renderer.draw(&request).is_err());
    }

    #[test]
    fn test_category_ticks() {
        let names = labels(&["arc", "loop", "whorl"]);

        assert_eq!(category_at(&names, 0.5, false), "arc");
        assert_eq!(category_at(&names, 2.5, false), "whorl");
        assert_eq!(category_at(&names, 0.5, true), "whorl");
        assert_eq!(category_at(&names, 1.0, false), "");
        assert_eq!(category_at(&names, 3.5, false), "");
    }

    #[test]
    fn test_value_format() {
        assert_eq!(format_value(10.0), "10");
        assert_eq!(format_value(-0.25), "-0.25");
        assert_eq!(format_value(2.0f64.sqrt()), "1.41");
    }

    #[test]
    fn test_bin_counts() {
        let counts = bin_counts(&[0.0, 0.04, 0.05, 0.5, 1.0, 1.3, f64::NAN], 20);
        assert_eq!(counts[0], 2);
        assert_eq!(counts[1], 1);
        assert_eq!(counts[10], 1);
        assert_eq!(counts[19], 2);
        assert_eq!(counts.iter().sum::<u64>(), 6);
    }

    #[test]
    fn test_value_range_centered() {
        assert_eq!(value_range(&[-1.0, 3.0], Some(0.0)), (-3.0, 3.0));
        assert_eq!(value_range(&[2.0, 5.0], None), (2.0, 5.0));
        assert_eq!(value_range(&[], Some(0.0)), (0.0, 0.0));
    }
}
