//! Filter blender.
//!
//! A preset at intensity `t` acts like the preset's coefficients pulled
//! toward identity: every multiplicative coefficient becomes
//! `1 + (p - 1) * t` and every additive one `p * t`. The blended
//! coefficients are then applied through the composer in a single pass.
//!
//! `t` is clamped to `[0, 1]`. At `t = 0` the coefficients are exactly the
//! identity; at `t = 1` the preset's raw values are used without
//! re-deriving them, so full intensity matches the preset bit for bit.

use std::borrow::Cow;

use crate::catalog::FilterPreset;
use crate::compose::{apply_with, compose};
use crate::parallel::ExecOptions;
use lura_core::{Error, PixelBuffer, Result};
use lura_math::ColorMatrix;
use tracing::trace;

/// Preset coefficients after intensity scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveCoefficients {
    /// Brightness scale.
    pub brightness: f32,
    /// Contrast scale.
    pub contrast: f32,
    /// Saturation factor.
    pub saturation: f32,
    /// Warmth.
    pub warmth: f32,
    /// Hue shift in degrees. Interpolated but not applied to pixels.
    pub hue: f32,
}

impl EffectiveCoefficients {
    /// Identity coefficients.
    pub const IDENTITY: Self = Self {
        brightness: 1.0,
        contrast: 1.0,
        saturation: 1.0,
        warmth: 0.0,
        hue: 0.0,
    };

    /// Fused color matrix for these coefficients.
    pub fn matrix(&self) -> ColorMatrix {
        compose(self.brightness, self.contrast, self.saturation, self.warmth)
    }

    /// Returns `true` if applying these coefficients is a no-op.
    pub fn is_identity(&self) -> bool {
        self.brightness == 1.0 && self.contrast == 1.0 && self.saturation == 1.0 && self.warmth == 0.0
    }
}

impl Default for EffectiveCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Scales a preset's coefficients by `intensity`.
///
/// # Example
///
/// ```rust
/// use lura_ops::{blend::effective_coefficients, catalog};
///
/// let c = effective_coefficients(catalog::find("vintage").unwrap(), 0.5);
/// assert!((c.saturation - 0.9).abs() < 1e-6);
/// assert!((c.warmth - 15.0).abs() < 1e-6);
/// ```
pub fn effective_coefficients(preset: &FilterPreset, intensity: f32) -> EffectiveCoefficients {
    let t = if intensity.is_nan() { 0.0 } else { intensity.clamp(0.0, 1.0) };
    if t >= 1.0 {
        return EffectiveCoefficients {
            brightness: preset.brightness,
            contrast: preset.contrast,
            saturation: preset.saturation,
            warmth: preset.warmth,
            hue: preset.hue,
        };
    }
    let mul = |p: f32| 1.0 + (p - 1.0) * t;
    EffectiveCoefficients {
        brightness: mul(preset.brightness),
        contrast: mul(preset.contrast),
        saturation: mul(preset.saturation),
        warmth: preset.warmth * t,
        hue: preset.hue * t,
    }
}

/// Applies `preset` to `src` at `intensity`.
///
/// The `"none"` preset and any intensity that resolves to identity
/// coefficients return the source borrowed, without touching pixels.
///
/// # Errors
///
/// [`Error::InvalidParameter`] if `intensity` is NaN for a real preset,
/// [`Error::AllocationFailed`] if the output can't be allocated.
pub fn blend<'a>(src: &'a PixelBuffer, preset: &FilterPreset, intensity: f32) -> Result<Cow<'a, PixelBuffer>> {
    blend_with(src, preset, intensity, ExecOptions::default())
}

/// [`blend`] with explicit execution options.
pub fn blend_with<'a>(
    src: &'a PixelBuffer,
    preset: &FilterPreset,
    intensity: f32,
    opts: ExecOptions,
) -> Result<Cow<'a, PixelBuffer>> {
    if preset.is_none() {
        return Ok(Cow::Borrowed(src));
    }
    if intensity.is_nan() {
        return Err(Error::invalid_parameter("filter_intensity", "value is NaN"));
    }
    let coeffs = effective_coefficients(preset, intensity);
    if coeffs.is_identity() {
        return Ok(Cow::Borrowed(src));
    }
    trace!(preset = preset.id, intensity, "blend filter");
    apply_with(&coeffs.matrix(), src, opts).map(Cow::Owned)
}
