//! Piecewise-linear colormaps

use plotters::style::RGBColor;

use super::renderer::ColorScale;

const VIRIDIS: [[u8; 3]; 5] = [
    [68, 1, 84],
    [59, 82, 139],
    [33, 145, 140],
    [94, 201, 98],
    [253, 231, 37],
];

const COOLWARM: [[u8; 3]; 3] = [
    [59, 76, 192],
    [221, 221, 221],
    [180, 4, 38],
];

/// matplotlib "tab10"
pub const CATEGORICAL: [[u8; 3]; 10] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
    [127, 127, 127],
    [188, 189, 34],
    [23, 190, 207],
];

pub fn categorical(index: usize) -> RGBColor {
    let [r, g, b] = CATEGORICAL[index % CATEGORICAL.len()];
    RGBColor(r, g, b)
}

/// `t` is clamped to [0, 1]; NaN maps to the middle
pub fn sample(scale: ColorScale, t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    match scale {
        ColorScale::Viridis => interpolate(&VIRIDIS, t),
        ColorScale::Coolwarm => interpolate(&COOLWARM, t),
    }
}

fn interpolate(anchors: &[[u8; 3]], t: f64) -> RGBColor {
    let segments = (anchors.len() - 1) as f64;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(anchors.len() - 2);
    let frac = pos - i as f64;

    let (a, b) = (anchors[i], anchors[i + 1]);
    let mix = |k: usize| (a[k] as f64 + (b[k] as f64 - a[k] as f64) * frac).round() as u8;
    RGBColor(mix(0), mix(1), mix(2))
}
