//! SIMD evaluation of color matrices.
//!
//! Uses the `wide` crate for portable 4-lane SIMD on stable Rust. One pixel
//! occupies one `f32x4`: lanes 0, 1, 2 are R, G, B and lane 3 is unused.
//!
//! # Bit compatibility
//!
//! [`ColorMatrixX4::transform`] evaluates `col0*r + col1*g + col2*b + offset`
//! with separate multiplies and adds, left to right, which is exactly the
//! scalar expression in [`ColorMatrix::transform`]. Rust never contracts
//! these into fused multiply-adds, so both paths agree bit for bit.
//!
//! # Example
//!
//! ```rust
//! use lura_math::ColorMatrix;
//! use lura_math::simd::ColorMatrixX4;
//!
//! let m = ColorMatrix::diagonal(1.2, 1.0, 0.8).with_offset([1.0, 2.0, 3.0]);
//! let x4 = ColorMatrixX4::new(&m);
//! assert_eq!(x4.transform([10.0, 20.0, 30.0]), m.transform([10.0, 20.0, 30.0]));
//! ```

use crate::ColorMatrix;
use wide::f32x4;

/// A [`ColorMatrix`] laid out by columns for 4-lane evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ColorMatrixX4 {
    c0: f32x4,
    c1: f32x4,
    c2: f32x4,
    offset: f32x4,
}

impl ColorMatrixX4 {
    /// Splits `m` into column vectors.
    pub fn new(m: &ColorMatrix) -> Self {
        let lanes = |v: [f32; 3]| f32x4::from([v[0], v[1], v[2], 0.0]);
        Self {
            c0: lanes(m.col(0)),
            c1: lanes(m.col(1)),
            c2: lanes(m.col(2)),
            offset: lanes(m.offset),
        }
    }

    /// Transforms one RGB triple.
    #[inline]
    pub fn transform(&self, rgb: [f32; 3]) -> [f32; 3] {
        let out = self.transform_lanes(rgb).to_array();
        [out[0], out[1], out[2]]
    }

    /// Transforms one RGB triple, returning all four lanes.
    #[inline]
    pub fn transform_lanes(&self, rgb: [f32; 3]) -> f32x4 {
        self.c0 * f32x4::splat(rgb[0])
            + self.c1 * f32x4::splat(rgb[1])
            + self.c2 * f32x4::splat(rgb[2])
            + self.offset
    }
}

/// Transforms 8-bit RGB(A) samples from `src` into `dst`.
///
/// `channels` is 3 or 4; alpha (if present) is copied unchanged. Output is
/// rounded half away from zero and clamped to `[0, 255]`.
pub fn transform_row_u8(m: &ColorMatrixX4, src: &[u8], dst: &mut [u8], channels: usize) {
    for (s, d) in src.chunks_exact(channels).zip(dst.chunks_exact_mut(channels)) {
        let rgb = [f32::from(s[0]), f32::from(s[1]), f32::from(s[2])];
        let out = m.transform_lanes(rgb).to_array();
        // f32x4::round is half-to-even; quantize per lane to match the scalar path
        d[0] = quantize_lane(out[0]);
        d[1] = quantize_lane(out[1]);
        d[2] = quantize_lane(out[2]);
        if channels == 4 {
            d[3] = s[3];
        }
    }
}

#[inline]
fn quantize_lane(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
