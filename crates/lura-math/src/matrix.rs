//! Affine color matrix.
//!
//! [`ColorMatrix`] is the "Transform" of the adjustment pipeline. Each
//! adjustment stage (brightness, contrast, saturation, warmth) is one
//! matrix; the stages are fused into a single matrix and evaluated once per
//! pixel.
//!
//! # Convention
//!
//! ```text
//! | m00 m01 m02 |   | r |   | o0 |
//! | m10 m11 m12 | * | g | + | o1 |
//! | m20 m21 m22 |   | b |   | o2 |
//! ```
//!
//! Alpha never takes part; it is carried through by the callers.

use std::ops::{Index, Mul};

/// Affine transform on RGB values.
///
/// # Example
///
/// ```rust
/// use lura_math::ColorMatrix;
///
/// let v = [12.0, 34.0, 56.0];
/// assert_eq!(ColorMatrix::IDENTITY.transform(v), v);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix {
    /// Linear part in row-major order: [row0, row1, row2]
    pub m: [[f32; 3]; 3],
    /// Per-channel offset added after the linear part
    pub offset: [f32; 3],
}

impl ColorMatrix {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
        offset: [0.0; 3],
    };

    /// Creates a matrix from row arrays and an offset.
    #[inline]
    pub const fn new(rows: [[f32; 3]; 3], offset: [f32; 3]) -> Self {
        Self { m: rows, offset }
    }

    /// Creates a linear (offset-free) matrix from row arrays.
    #[inline]
    pub const fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self::new(rows, [0.0; 3])
    }

    /// Creates a per-channel scale.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lura_math::ColorMatrix;
    ///
    /// let warm = ColorMatrix::diagonal(1.1, 1.0, 0.9);
    /// assert_eq!(warm.transform([100.0, 100.0, 100.0])[1], 100.0);
    /// ```
    #[inline]
    pub const fn diagonal(d0: f32, d1: f32, d2: f32) -> Self {
        Self::from_rows([
            [d0, 0.0, 0.0],
            [0.0, d1, 0.0],
            [0.0, 0.0, d2],
        ])
    }

    /// Creates a uniform scale.
    #[inline]
    pub const fn scale(s: f32) -> Self {
        Self::diagonal(s, s, s)
    }

    /// Returns a copy with `offset` replacing the current offset.
    #[inline]
    pub const fn with_offset(self, offset: [f32; 3]) -> Self {
        Self { m: self.m, offset }
    }

    /// Returns the transform that applies `self` first, then `next`.
    ///
    /// Equivalent to `*next * *self`.
    #[inline]
    pub fn then(&self, next: &Self) -> Self {
        next.mul_mat(self)
    }

    /// Multiplies two affine transforms: `(self * other)(v) = self(other(v))`.
    pub fn mul_mat(&self, other: &Self) -> Self {
        let mut m = [[0.0f32; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j];
            }
        }
        // The other offset passes through our linear part
        let offset = self.transform(other.offset);
        Self { m, offset }
    }

    /// Transforms an RGB triple.
    ///
    /// Each output is `m[i][0]*r + m[i][1]*g + m[i][2]*b + offset[i]`,
    /// summed left to right. [`crate::simd::ColorMatrixX4`] reproduces this
    /// order exactly.
    #[inline]
    pub fn transform(&self, v: [f32; 3]) -> [f32; 3] {
        [
            self.m[0][0] * v[0] + self.m[0][1] * v[1] + self.m[0][2] * v[2] + self.offset[0],
            self.m[1][0] * v[0] + self.m[1][1] * v[1] + self.m[1][2] * v[2] + self.offset[1],
            self.m[2][0] * v[0] + self.m[2][1] * v[1] + self.m[2][2] * v[2] + self.offset[2],
        ]
    }

    /// Returns a column of the linear part.
    #[inline]
    pub fn col(&self, i: usize) -> [f32; 3] {
        [self.m[0][i], self.m[1][i], self.m[2][i]]
    }

    /// Returns true if this is exactly the identity.
    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Returns true if all elements are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.m.iter().flatten().chain(self.offset.iter()).all(|x| x.is_finite())
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ColorMatrix * [f32; 3]
impl Mul<[f32; 3]> for ColorMatrix {
    type Output = [f32; 3];

    #[inline]
    fn mul(self, rhs: [f32; 3]) -> [f32; 3] {
        self.transform(rhs)
    }
}

// ColorMatrix * ColorMatrix
impl Mul for ColorMatrix {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.mul_mat(&rhs)
    }
}

impl Index<usize> for ColorMatrix {
    type Output = [f32; 3];

    #[inline]
    fn index(&self, i: usize) -> &[f32; 3] {
        &self.m[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity() {
        let v = [1.0, 2.0, 3.0];
        assert_eq!(ColorMatrix::IDENTITY * v, v);
        assert!(ColorMatrix::default().is_identity());
    }

    #[test]
    fn test_scale() {
        let m = ColorMatrix::scale(2.0);
        assert_eq!(m * [1.0, 2.0, 3.0], [2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_offset_composition() {
        // Scale by 2, then add 10: offset is not scaled
        let m = ColorMatrix::scale(2.0).then(&ColorMatrix::IDENTITY.with_offset([10.0; 3]));
        assert_eq!(m.transform([5.0, 5.0, 5.0]), [20.0, 20.0, 20.0]);

        // Add 10, then scale by 2: offset is scaled
        let m = ColorMatrix::IDENTITY
            .with_offset([10.0; 3])
            .then(&ColorMatrix::scale(2.0));
        assert_eq!(m.transform([5.0, 5.0, 5.0]), [30.0, 30.0, 30.0]);
    }

    #[test]
    fn test_then_matches_sequential() {
        let a = ColorMatrix::new(
            [[1.1, 0.1, 0.0], [0.0, 0.9, 0.2], [0.3, 0.0, 1.0]],
            [5.0, -3.0, 1.5],
        );
        let b = ColorMatrix::new(
            [[0.8, 0.0, 0.1], [0.2, 1.2, 0.0], [0.0, 0.1, 0.7]],
            [-2.0, 4.0, 0.0],
        );
        let v = [40.0, 120.0, 200.0];
        let fused = a.then(&b).transform(v);
        let seq = b.transform(a.transform(v));
        for c in 0..3 {
            assert_abs_diff_eq!(fused[c], seq[c], epsilon = 1e-3);
        }
    }

    #[test]
    fn test_mul_mat() {
        let c = ColorMatrix::scale(2.0) * ColorMatrix::scale(3.0);
        assert_eq!(c, ColorMatrix::scale(6.0));
    }

    #[test]
    fn test_is_finite() {
        assert!(ColorMatrix::IDENTITY.is_finite());
        assert!(!ColorMatrix::scale(f32::NAN).is_finite());
    }

    #[test]
    fn test_col() {
        let m = ColorMatrix::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        assert_eq!(m.col(1), [2.0, 5.0, 8.0]);
        assert_eq!(m[2], [7.0, 8.0, 9.0]);
    }
}
