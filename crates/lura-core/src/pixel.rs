//! Sample constants and quantization helpers.
//!
//! Every stage of the pipeline works on `f32` channel values in the
//! `[0, 255]` domain and is quantized back to `u8` exactly once, by
//! [`quantize`].

// ============================================================================
// Saturation Luminance Constants
// ============================================================================

/// Luminance weight of the red channel used by the saturation stage.
///
/// These are the classic color-matrix saturation weights
/// (`Y = 0.213*R + 0.715*G + 0.072*B`), not the exact Rec.709 triple.
/// They sum to 1.0, so grayscale is (up to rounding) a fixed point.
pub const SATURATION_LUMA_R: f32 = 0.213;

/// Luminance weight of the green channel used by the saturation stage.
pub const SATURATION_LUMA_G: f32 = 0.715;

/// Luminance weight of the blue channel used by the saturation stage.
pub const SATURATION_LUMA_B: f32 = 0.072;

/// Saturation luminance weights as an `[R, G, B]` array.
pub const SATURATION_LUMA: [f32; 3] = [SATURATION_LUMA_R, SATURATION_LUMA_G, SATURATION_LUMA_B];

/// Largest value an 8-bit channel can hold, as `f32`.
pub const MAX_CHANNEL_VALUE: f32 = 255.0;

/// Converts a working value back to an 8-bit sample.
///
/// Rounds half away from zero, then clamps to `[0, 255]`. NaN maps to 0.
///
/// # Example
///
/// ```rust
/// use lura_core::quantize;
///
/// assert_eq!(quantize(128.5), 129);
/// assert_eq!(quantize(-3.0), 0);
/// assert_eq!(quantize(300.0), 255);
/// ```
#[inline]
pub fn quantize(value: f32) -> u8 {
    // `as` saturates and maps NaN to 0
    value.round().clamp(0.0, MAX_CHANNEL_VALUE) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_luma_weights_sum_to_one() {
        assert_abs_diff_eq!(SATURATION_LUMA.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_quantize_rounding() {
        assert_eq!(quantize(0.49), 0);
        assert_eq!(quantize(0.5), 1);
        assert_eq!(quantize(254.5), 255);
        assert_eq!(quantize(f32::NAN), 0);
        assert_eq!(quantize(f32::INFINITY), 255);
    }
}
