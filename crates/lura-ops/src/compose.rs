//! Color transform composer.
//!
//! Builds one affine [`ColorMatrix`] from the four color adjustments and
//! applies it to a [`PixelBuffer`] in a single pass.
//!
//! # Stage order
//!
//! The stages do not commute, so the order is fixed:
//!
//! ```text
//! brightness -> contrast -> saturation -> warmth
//! ```
//!
//! | Stage | Matrix |
//! |-------|--------|
//! | brightness `b` | `diag(b, b, b)` |
//! | contrast `c` | `diag(c, c, c)`, offset `(1 - c) / 2 * 255` |
//! | saturation `s` | row `i` = `(1 - s) * luma + s * e_i` |
//! | warmth `w` | `diag(1 + 0.2 * w/100, 1, 1 - 0.2 * w/100)` |
//!
//! With identity parameters `(1, 1, 1, 0)` every stage is exactly the
//! identity matrix, so [`apply`] reproduces its input bit for bit.
//!
//! # Rounding
//!
//! Channels are evaluated in `f32` on the `[0, 255]` scale, rounded half
//! away from zero and clamped ([`lura_core::quantize`]). Alpha is copied.
//!
//! # Example
//!
//! ```rust
//! use lura_core::{ChannelLayout, PixelBuffer};
//! use lura_ops::compose::{apply, compose};
//!
//! let gray = PixelBuffer::filled(2, 2, ChannelLayout::Rgba, &[128, 128, 128, 255]).unwrap();
//! let out = apply(&compose(1.0, 2.0, 1.0, 0.0), &gray).unwrap();
//! // 128 * 2 + (1 - 2) / 2 * 255 = 128.5, rounded up
//! assert_eq!(out.pixel(0, 0), &[129, 129, 129, 255]);
//! ```

use crate::filter::{convolve, Kernel};
use crate::parallel::{for_each_row, ExecOptions};
use lura_core::{quantize, Error, PixelBuffer, Result, MAX_CHANNEL_VALUE, SATURATION_LUMA};
use lura_math::simd::{transform_row_u8, ColorMatrixX4};
use lura_math::ColorMatrix;
use tracing::{debug, trace};

/// Red/blue gain per unit of normalized warmth.
pub const WARMTH_GAIN: f32 = 0.2;

/// Divisor turning a warmth slider value into normalized warmth.
pub const WARMTH_SCALE: f32 = 100.0;

/// Divisor turning a sharpen amount into kernel strength.
pub const SHARPEN_SCALE: f32 = 100.0;

/// Brightness stage: uniform RGB scale.
#[inline]
pub fn brightness_matrix(brightness: f32) -> ColorMatrix {
    ColorMatrix::scale(brightness)
}

/// Contrast stage: scale around mid-gray.
#[inline]
pub fn contrast_matrix(contrast: f32) -> ColorMatrix {
    let translate = (1.0 - contrast) / 2.0 * MAX_CHANNEL_VALUE;
    ColorMatrix::scale(contrast).with_offset([translate; 3])
}

/// Saturation stage: interpolation between per-pixel luminance and the
/// input color.
///
/// `0` is grayscale, `1` identity, values above `1` oversaturate.
pub fn saturation_matrix(saturation: f32) -> ColorMatrix {
    let inv = 1.0 - saturation;
    let [lr, lg, lb] = SATURATION_LUMA;
    let (r, g, b) = (inv * lr, inv * lg, inv * lb);
    ColorMatrix::from_rows([
        [r + saturation, g, b],
        [r, g + saturation, b],
        [r, g, b + saturation],
    ])
}

/// Warmth stage: red up and blue down for positive warmth, the reverse for
/// negative warmth.
#[inline]
pub fn warmth_matrix(warmth: f32) -> ColorMatrix {
    let w = warmth / WARMTH_SCALE;
    ColorMatrix::diagonal(1.0 + w * WARMTH_GAIN, 1.0, 1.0 - w * WARMTH_GAIN)
}

/// The four stage matrices, in application order.
pub fn stages(brightness: f32, contrast: f32, saturation: f32, warmth: f32) -> [ColorMatrix; 4] {
    [
        brightness_matrix(brightness),
        contrast_matrix(contrast),
        saturation_matrix(saturation),
        warmth_matrix(warmth),
    ]
}

/// Fuses the four adjustments into one matrix.
///
/// # Example
///
/// ```rust
/// use lura_ops::compose::compose;
///
/// assert!(compose(1.0, 1.0, 1.0, 0.0).is_identity());
/// ```
pub fn compose(brightness: f32, contrast: f32, saturation: f32, warmth: f32) -> ColorMatrix {
    stages(brightness, contrast, saturation, warmth)
        .iter()
        .fold(ColorMatrix::IDENTITY, |acc, stage| acc.then(stage))
}

/// Applies `matrix` to every pixel of `src`, returning a new buffer.
///
/// # Errors
///
/// [`Error::AllocationFailed`] if the output buffer can't be allocated,
/// [`Error::InvalidParameter`] if the matrix has non-finite entries.
pub fn apply(matrix: &ColorMatrix, src: &PixelBuffer) -> Result<PixelBuffer> {
    apply_with(matrix, src, ExecOptions::default())
}

/// [`apply`] with explicit execution options.
pub fn apply_with(matrix: &ColorMatrix, src: &PixelBuffer, opts: ExecOptions) -> Result<PixelBuffer> {
    if !matrix.is_finite() {
        return Err(Error::invalid_parameter("matrix", "non-finite coefficient"));
    }
    trace!(
        width = src.width(),
        height = src.height(),
        simd = opts.simd,
        parallel = opts.parallel,
        "apply color matrix"
    );

    let mut dst = src.alloc_like()?;
    let row_len = src.row_len();
    let channels = src.channels();

    if opts.simd {
        let x4 = ColorMatrixX4::new(matrix);
        for_each_row(dst.data_mut(), row_len, opts, |y, row| {
            transform_row_u8(&x4, src.row(y as u32), row, channels);
        });
    } else {
        for_each_row(dst.data_mut(), row_len, opts, |y, row| {
            transform_row_scalar(matrix, src.row(y as u32), row, channels);
        });
    }

    Ok(dst)
}

/// Scalar reference kernel for one row.
fn transform_row_scalar(m: &ColorMatrix, src: &[u8], dst: &mut [u8], channels: usize) {
    for (s, d) in src.chunks_exact(channels).zip(dst.chunks_exact_mut(channels)) {
        let out = m.transform([f32::from(s[0]), f32::from(s[1]), f32::from(s[2])]);
        d[0] = quantize(out[0]);
        d[1] = quantize(out[1]);
        d[2] = quantize(out[2]);
        if channels == 4 {
            d[3] = s[3];
        }
    }
}

/// Applies the four stages as four sequential passes.
///
/// Values stay in `f32` between passes and are quantized once at the end,
/// so the result matches [`apply`] on the fused matrix up to rounding.
/// Slower than the fused path; kept as the reference for it.
pub fn apply_staged(
    src: &PixelBuffer,
    brightness: f32,
    contrast: f32,
    saturation: f32,
    warmth: f32,
) -> Result<PixelBuffer> {
    let channels = src.channels();
    let len = src.pixel_count() * 3;
    let mut work: Vec<f32> = Vec::new();
    work.try_reserve_exact(len)
        .map_err(|e| Error::allocation_failed(len * std::mem::size_of::<f32>(), e.to_string()))?;
    work.extend(
        src.data()
            .chunks_exact(channels)
            .flat_map(|px| [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])]),
    );

    for stage in stages(brightness, contrast, saturation, warmth) {
        for px in work.chunks_exact_mut(3) {
            let out = stage.transform([px[0], px[1], px[2]]);
            px.copy_from_slice(&out);
        }
    }

    let mut dst = src.alloc_like()?;
    for ((d, s), w) in dst
        .data_mut()
        .chunks_exact_mut(channels)
        .zip(src.data().chunks_exact(channels))
        .zip(work.chunks_exact(3))
    {
        d[0] = quantize(w[0]);
        d[1] = quantize(w[1]);
        d[2] = quantize(w[2]);
        if channels == 4 {
            d[3] = s[3];
        }
    }
    Ok(dst)
}

/// Sharpens `src` with a 3x3 unsharp kernel.
///
/// `amount` is clamped to `[0, 1]`; kernel strength is `amount / 100`
/// (center `1 + 4s`, edge neighbours `-s`, corners `0`). Borders are
/// replicated. An amount of zero returns an unmodified copy.
pub fn apply_sharpen(src: &PixelBuffer, amount: f32) -> Result<PixelBuffer> {
    apply_sharpen_with(src, amount, ExecOptions::default())
}

/// [`apply_sharpen`] with explicit execution options.
pub fn apply_sharpen_with(src: &PixelBuffer, amount: f32, opts: ExecOptions) -> Result<PixelBuffer> {
    if amount.is_nan() {
        return Err(Error::invalid_parameter("sharpen", "value is NaN"));
    }
    let amount = amount.clamp(0.0, 1.0);
    if amount == 0.0 {
        return Ok(src.clone());
    }
    debug!(amount, "sharpen");
    let kernel = Kernel::sharpen(amount / SHARPEN_SCALE);
    convolve(src, &kernel, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lura_core::ChannelLayout;

    /// Deterministic RGBA test pattern covering the full sample range.
    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(((x * 37 + y * 11) % 256) as u8);
                data.push(((x * 5 + y * 53) % 256) as u8);
                data.push(((x * 97 + y * 3) % 256) as u8);
                data.push(((x + y) % 256) as u8);
            }
        }
        PixelBuffer::from_data(width, height, ChannelLayout::Rgba, data).unwrap()
    }

    #[test]
    fn test_identity_is_bit_exact() {
        let src = gradient(31, 17);
        let m = compose(1.0, 1.0, 1.0, 0.0);
        assert!(m.is_identity());
        assert_eq!(apply(&m, &src).unwrap(), src);
        assert_eq!(apply_with(&m, &src, ExecOptions::SCALAR).unwrap(), src);
    }

    #[test]
    fn test_mid_gray_contrast() {
        let gray = PixelBuffer::filled(2, 2, ChannelLayout::Rgba, &[128, 128, 128, 255]).unwrap();
        let out = apply(&compose(1.0, 2.0, 1.0, 0.0), &gray).unwrap();
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(out.pixel(x, y), &[129, 129, 129, 255]);
            }
        }
    }

    #[test]
    fn test_brightness_scales_rgb_only() {
        let src = PixelBuffer::filled(1, 1, ChannelLayout::Rgba, &[100, 50, 10, 77]).unwrap();
        let out = apply(&compose(1.5, 1.0, 1.0, 0.0), &src).unwrap();
        assert_eq!(out.pixel(0, 0), &[150, 75, 15, 77]);
    }

    #[test]
    fn test_zero_saturation_is_gray() {
        let src = PixelBuffer::filled(1, 1, ChannelLayout::Rgb, &[200, 100, 50]).unwrap();
        let out = apply(&compose(1.0, 1.0, 0.0, 0.0), &src).unwrap();
        let px = out.pixel(0, 0);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        // 0.213*200 + 0.715*100 + 0.072*50 = 117.7
        assert_eq!(px[0], 118);
    }

    #[test]
    fn test_warmth_sign_symmetry() {
        let warm = warmth_matrix(50.0);
        let cool = warmth_matrix(-50.0);
        assert_abs_diff_eq!(warm.m[0][0], 1.1, epsilon = 1e-6);
        assert_abs_diff_eq!(warm.m[2][2], 0.9, epsilon = 1e-6);
        assert_abs_diff_eq!(cool.m[0][0], 0.9, epsilon = 1e-6);
        assert_abs_diff_eq!(cool.m[2][2], 1.1, epsilon = 1e-6);
        assert_eq!(warm.m[1][1], 1.0);
    }

    #[test]
    fn test_stage_order_matters() {
        // Contrast then brightness would give a different offset
        let m = compose(2.0, 0.5, 1.0, 0.0);
        assert_abs_diff_eq!(m.m[0][0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(m.offset[0], 63.75, epsilon = 1e-4);
    }

    #[test]
    fn test_fused_matches_staged() {
        let src = gradient(40, 23);
        for &(b, c, s, w) in &[
            (0.5, 1.5, 0.3, -40.0),
            (1.3, 0.7, 1.8, 25.0),
            (2.0, 2.0, 2.0, 50.0),
            (0.0, 1.0, 1.0, 0.0),
        ] {
            let fused = apply(&compose(b, c, s, w), &src).unwrap();
            let staged = apply_staged(&src, b, c, s, w).unwrap();
            for (a, z) in fused.data().iter().zip(staged.data()) {
                assert!((*a as i16 - *z as i16).abs() <= 1, "params {:?}", (b, c, s, w));
            }
        }
    }

    #[test]
    fn test_simd_matches_scalar() {
        let src = gradient(33, 9);
        let m = compose(1.17, 1.33, 0.61, -12.5);
        let simd = apply_with(&m, &src, ExecOptions { simd: true, parallel: false }).unwrap();
        let scalar = apply_with(&m, &src, ExecOptions::SCALAR).unwrap();
        assert_eq!(simd, scalar);
    }

    #[test]
    fn test_source_untouched() {
        let src = gradient(8, 8);
        let copy = src.clone();
        let _ = apply(&compose(1.4, 1.2, 0.5, 10.0), &src).unwrap();
        assert_eq!(src, copy);
    }

    #[test]
    fn test_non_finite_matrix_rejected() {
        let src = gradient(2, 2);
        let err = apply(&ColorMatrix::scale(f32::NAN), &src).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_sharpen_zero_is_copy() {
        let src = gradient(5, 5);
        assert_eq!(apply_sharpen(&src, 0.0).unwrap(), src);
    }

    #[test]
    fn test_sharpen_constant_unchanged() {
        let src = PixelBuffer::filled(6, 6, ChannelLayout::Rgba, &[90, 140, 200, 255]).unwrap();
        assert_eq!(apply_sharpen(&src, 1.0).unwrap(), src);
    }

    #[test]
    fn test_sharpen_enhances_peak() {
        let mut src = PixelBuffer::filled(5, 5, ChannelLayout::Rgba, &[50, 50, 50, 255]).unwrap();
        src.set_pixel(2, 2, &[200, 200, 200, 255]);
        let out = apply_sharpen(&src, 1.0).unwrap();
        // center: 200 * 1.04 - 0.01 * 200 = 206
        assert!(out.pixel(2, 2)[0] > 200);
        // edge neighbour: 50 * 1.04 - 0.01 * (200 + 150) = 48.5
        assert!(out.pixel(2, 1)[0] < 50);
        // diagonal neighbour is not in the kernel
        assert_eq!(out.pixel(1, 1)[0], 50);
        assert_eq!(out.pixel(2, 2)[3], 255);
    }
}
