//! Area Resampling (pixel area relation)
//!
//! Shrinking: every destination pixel is the area-weighted mean of the
//! source pixels under its footprint. Exact integer factors take the block
//! average path; everything else uses fractional edge weights.
//!
//! Enlarging (either axis): area-mode linear kernel in 11-bit fixed point.
//!
//! 8-bit in, 8-bit out. Rounding is half-to-even except the 2x2 block path,
//! which rounds half up.

use image::RgbImage;

use super::CHANNELS;

/// Fixed-point precision of the linear kernel coefficients
const COEF_BITS: u32 = 11;
const COEF_SCALE: f32 = (1 << COEF_BITS) as f32;

/// Edge weights below this are dropped
const AREA_EPSILON: f64 = 1e-3;

/// Resize `src` to `width` x `height` with area interpolation
pub fn resize_area(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (src_w, src_h) = src.dimensions();
    if (src_w, src_h) == (width, height) {
        return src.clone();
    }

    let scale_x = src_w as f64 / width as f64;
    let scale_y = src_h as f64 / height as f64;

    if scale_x >= 1.0 && scale_y >= 1.0 {
        let int_x = scale_x.round();
        let int_y = scale_y.round();
        if (scale_x - int_x).abs() < f64::EPSILON && (scale_y - int_y).abs() < f64::EPSILON {
            return shrink_blocks(src, width, height, int_x as usize, int_y as usize);
        }
        return shrink_fractional(src, width, height, scale_x, scale_y);
    }

    enlarge_linear(src, width, height)
}

#[inline]
fn saturate(value: f32) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

// ============================================================================
// SHRINK
// ============================================================================

/// Integer factors: plain block mean
fn shrink_blocks(src: &RgbImage, width: u32, height: u32, fx: usize, fy: usize) -> RgbImage {
    let raw = src.as_raw();
    let stride = src.width() as usize * CHANNELS;
    let dst_w = width as usize;

    let area = (fx * fy) as u32;
    let inv_area = 1.0f32 / area as f32;
    let half_up = fx == 2 && fy == 2;

    let mut out = RgbImage::new(width, height);
    let data: &mut [u8] = &mut out;

    for dy in 0..height as usize {
        for dx in 0..dst_w {
            for c in 0..CHANNELS {
                let mut sum = 0u32;
                for y in dy * fy..(dy + 1) * fy {
                    let row = y * stride;
                    for x in dx * fx..(dx + 1) * fx {
                        sum += raw[row + x * CHANNELS + c] as u32;
                    }
                }

                data[(dy * dst_w + dx) * CHANNELS + c] = if half_up {
                    ((sum + 2) >> 2) as u8
                } else {
                    saturate(sum as f32 * inv_area)
                };
            }
        }
    }

    out
}

/// Source taps `(index, weight)` covering each destination cell on one axis
fn area_taps(src_len: usize, dst_len: usize, scale: f64) -> Vec<Vec<(usize, f32)>> {
    (0..dst_len)
        .map(|d| {
            let fs1 = d as f64 * scale;
            let fs2 = fs1 + scale;
            let cell = scale.min(src_len as f64 - fs1);

            let mut s2 = fs2.floor() as usize;
            s2 = s2.min(src_len - 1);
            let s1 = (fs1.ceil() as usize).min(s2);

            let mut taps = Vec::with_capacity(scale.ceil() as usize + 1);
            if s1 as f64 - fs1 > AREA_EPSILON {
                taps.push((s1 - 1, ((s1 as f64 - fs1) / cell) as f32));
            }
            for s in s1..s2 {
                taps.push((s, (1.0 / cell) as f32));
            }
            if fs2 - s2 as f64 > AREA_EPSILON {
                let w = (fs2 - s2 as f64).min(1.0).min(cell) / cell;
                taps.push((s2, w as f32));
            }
            taps
        })
        .collect()
}

/// Non-integer factors: separable weighted sum, horizontal pass per source row
fn shrink_fractional(src: &RgbImage, width: u32, height: u32, scale_x: f64, scale_y: f64) -> RgbImage {
    let (src_w, src_h) = src.dimensions();
    let raw = src.as_raw();
    let stride = src_w as usize * CHANNELS;
    let dst_w = width as usize;

    let xtab = area_taps(src_w as usize, dst_w, scale_x);
    let ytab = area_taps(src_h as usize, height as usize, scale_y);

    let mut row_buf = vec![0f32; dst_w * CHANNELS];
    let mut sum = vec![0f32; dst_w * CHANNELS];

    let mut out = RgbImage::new(width, height);
    let data: &mut [u8] = &mut out;

    for (dy, ytaps) in ytab.iter().enumerate() {
        sum.fill(0.0);

        for &(sy, beta) in ytaps {
            let row = &raw[sy * stride..(sy + 1) * stride];
            row_buf.fill(0.0);

            for (dx, xtaps) in xtab.iter().enumerate() {
                for &(sx, alpha) in xtaps {
                    for c in 0..CHANNELS {
                        row_buf[dx * CHANNELS + c] += alpha * row[sx * CHANNELS + c] as f32;
                    }
                }
            }

            for (acc, v) in sum.iter_mut().zip(&row_buf) {
                *acc += beta * v;
            }
        }

        let dst_row = &mut data[dy * dst_w * CHANNELS..(dy + 1) * dst_w * CHANNELS];
        for (px, v) in dst_row.iter_mut().zip(&sum) {
            *px = saturate(*v);
        }
    }

    out
}

// ============================================================================
// ENLARGE
// ============================================================================

/// Per destination index: left source index and fixed-point `[left, right]` weights
fn linear_taps(src_len: usize, dst_len: usize) -> Vec<(usize, [i64; 2])> {
    let scale = src_len as f64 / dst_len as f64;
    let inv_scale = dst_len as f64 / src_len as f64;
    let last = src_len as i64 - 1;

    (0..dst_len)
        .map(|d| {
            let mut s = (d as f64 * scale).floor() as i64;
            let mut f = ((d + 1) as f64 - (s + 1) as f64 * inv_scale) as f32;
            f = if f <= 0.0 { 0.0 } else { f - f.floor() };

            if s < 0 {
                f = 0.0;
                s = 0;
            }
            if s >= last {
                f = 0.0;
                s = last;
            }

            let w0 = ((1.0 - f) * COEF_SCALE).round_ties_even() as i64;
            let w1 = (f * COEF_SCALE).round_ties_even() as i64;
            (s as usize, [w0, w1])
        })
        .collect()
}

fn enlarge_linear(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (src_w, src_h) = src.dimensions();
    let raw = src.as_raw();
    let stride = src_w as usize * CHANNELS;
    let dst_w = width as usize;
    let max_x = src_w as usize - 1;
    let max_y = src_h as usize - 1;

    let xtab = linear_taps(src_w as usize, dst_w);
    let ytab = linear_taps(src_h as usize, height as usize);

    // Horizontal pass for one source row
    let horizontal = |sy: usize| -> Vec<i64> {
        let row = &raw[sy * stride..(sy + 1) * stride];
        let mut buf = vec![0i64; dst_w * CHANNELS];
        for (dx, &(sx, [a0, a1])) in xtab.iter().enumerate() {
            let sx1 = (sx + 1).min(max_x);
            for c in 0..CHANNELS {
                buf[dx * CHANNELS + c] =
                    row[sx * CHANNELS + c] as i64 * a0 + row[sx1 * CHANNELS + c] as i64 * a1;
            }
        }
        buf
    };

    let shift = 2 * COEF_BITS;
    let delta = 1i64 << (shift - 1);

    let mut out = RgbImage::new(width, height);
    let data: &mut [u8] = &mut out;

    for (dy, &(sy, [b0, b1])) in ytab.iter().enumerate() {
        let top = horizontal(sy);
        let bottom = horizontal((sy + 1).min(max_y));

        let dst_row = &mut data[dy * dst_w * CHANNELS..(dy + 1) * dst_w * CHANNELS];
        for (i, px) in dst_row.iter_mut().enumerate() {
            let v = (top[i] * b0 + bottom[i] * b1 + delta) >> shift;
            *px = v.clamp(0, 255) as u8;
        }
    }

    out
}
