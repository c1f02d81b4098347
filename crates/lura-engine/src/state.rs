//! Edit parameters and session state.
//!
//! [`EditState`] is owned by the [`Editor`](crate::Editor); observers only
//! ever see an [`EditSnapshot`].

use std::fmt;
use std::sync::Arc;

use lura_core::{Error, PixelBuffer, Result};
use lura_ops::catalog::{self, FilterPreset};

/// One continuous adjustment slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjustment {
    /// Uniform RGB scale.
    Brightness,
    /// Scale around mid-gray.
    Contrast,
    /// Luminance-weighted saturation.
    Saturation,
    /// Red/blue balance.
    Warmth,
    /// Unsharp strength.
    Sharpen,
}

impl Adjustment {
    /// All adjustments in pipeline order.
    pub const fn all() -> &'static [Self] {
        &[
            Self::Brightness,
            Self::Contrast,
            Self::Saturation,
            Self::Warmth,
            Self::Sharpen,
        ]
    }

    /// Parameter name used in errors and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Saturation => "saturation",
            Self::Warmth => "warmth",
            Self::Sharpen => "sharpen",
        }
    }

    /// Inclusive valid range.
    pub const fn range(self) -> (f32, f32) {
        match self {
            Self::Brightness | Self::Contrast | Self::Saturation => (0.0, 2.0),
            Self::Warmth => (-50.0, 50.0),
            Self::Sharpen => (0.0, 1.0),
        }
    }

    /// Value that leaves pixels unchanged.
    pub const fn identity(self) -> f32 {
        match self {
            Self::Brightness | Self::Contrast | Self::Saturation => 1.0,
            Self::Warmth | Self::Sharpen => 0.0,
        }
    }

    /// Clamps `value` into [`range`](Self::range).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for NaN.
    pub fn clamp(self, value: f32) -> Result<f32> {
        if value.is_nan() {
            return Err(Error::invalid_parameter(self.name(), "value is NaN"));
        }
        let (lo, hi) = self.range();
        Ok(value.clamp(lo, hi))
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Continuous adjustment values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentParameters {
    /// 0.0 - 2.0, identity 1.
    pub brightness: f32,
    /// 0.0 - 2.0, identity 1.
    pub contrast: f32,
    /// 0.0 - 2.0, identity 1.
    pub saturation: f32,
    /// -50 - 50, identity 0.
    pub warmth: f32,
    /// 0.0 - 1.0, identity 0.
    pub sharpen: f32,
}

impl AdjustmentParameters {
    /// Parameters that leave pixels unchanged.
    pub const IDENTITY: Self = Self {
        brightness: 1.0,
        contrast: 1.0,
        saturation: 1.0,
        warmth: 0.0,
        sharpen: 0.0,
    };

    /// Reads one adjustment.
    pub fn get(&self, adjustment: Adjustment) -> f32 {
        match adjustment {
            Adjustment::Brightness => self.brightness,
            Adjustment::Contrast => self.contrast,
            Adjustment::Saturation => self.saturation,
            Adjustment::Warmth => self.warmth,
            Adjustment::Sharpen => self.sharpen,
        }
    }

    /// Writes one adjustment, clamped to its range.
    pub fn set(&mut self, adjustment: Adjustment, value: f32) -> Result<()> {
        let value = adjustment.clamp(value)?;
        let slot = match adjustment {
            Adjustment::Brightness => &mut self.brightness,
            Adjustment::Contrast => &mut self.contrast,
            Adjustment::Saturation => &mut self.saturation,
            Adjustment::Warmth => &mut self.warmth,
            Adjustment::Sharpen => &mut self.sharpen,
        };
        *slot = value;
        Ok(())
    }

    /// Returns `true` if every value is at identity.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for AdjustmentParameters {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Selected preset and its blend intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSelection {
    /// Catalog entry.
    pub preset: &'static FilterPreset,
    /// 0.0 - 1.0.
    pub intensity: f32,
}

impl FilterSelection {
    /// Full intensity, the default for a newly selected preset.
    pub const FULL_INTENSITY: f32 = 1.0;
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            preset: catalog::none(),
            intensity: Self::FULL_INTENSITY,
        }
    }
}

/// Mutable session state. Single owner: the editor.
#[derive(Debug, Clone, Default)]
pub struct EditState {
    /// Loaded source pixels. Replaced only by re-source operations.
    pub original: Option<Arc<PixelBuffer>>,
    /// Last published result.
    pub derived: Option<Arc<PixelBuffer>>,
    /// Continuous adjustments.
    pub params: AdjustmentParameters,
    /// Preset selection.
    pub selection: FilterSelection,
    /// A recompute for the current parameters is outstanding.
    pub is_processing: bool,
}

impl EditState {
    /// Starts a session on `buffer` with identity parameters.
    pub fn load(&mut self, buffer: PixelBuffer) {
        let buffer = Arc::new(buffer);
        self.original = Some(Arc::clone(&buffer));
        self.derived = Some(buffer);
        self.params = AdjustmentParameters::IDENTITY;
        self.selection = FilterSelection::default();
        self.is_processing = false;
    }

    /// Returns identity parameters and `derived = original`.
    pub fn reset(&mut self) {
        self.derived = self.original.clone();
        self.params = AdjustmentParameters::IDENTITY;
        self.selection = FilterSelection::default();
        self.is_processing = false;
    }

    /// Source buffer, or [`Error::NoSourceImage`].
    pub fn require_original(&self) -> Result<&Arc<PixelBuffer>> {
        self.original.as_ref().ok_or(Error::NoSourceImage)
    }

    /// Read-only view tagged with `version`.
    pub fn snapshot(&self, version: u64) -> EditSnapshot {
        EditSnapshot {
            original: self.original.clone(),
            derived: self.derived.clone(),
            params: self.params,
            selection: self.selection,
            is_processing: self.is_processing,
            version,
        }
    }
}

/// Read-only projection of [`EditState`] handed to observers.
#[derive(Debug, Clone)]
pub struct EditSnapshot {
    /// Source pixels.
    pub original: Option<Arc<PixelBuffer>>,
    /// Last published result.
    pub derived: Option<Arc<PixelBuffer>>,
    /// Continuous adjustments.
    pub params: AdjustmentParameters,
    /// Preset selection.
    pub selection: FilterSelection,
    /// A recompute is outstanding.
    pub is_processing: bool,
    /// Change counter; strictly increasing across snapshots.
    pub version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lura_core::ChannelLayout;

    #[test]
    fn test_clamping() {
        let mut p = AdjustmentParameters::default();
        p.set(Adjustment::Brightness, 5.0).unwrap();
        p.set(Adjustment::Warmth, -80.0).unwrap();
        p.set(Adjustment::Sharpen, -1.0).unwrap();
        assert_eq!(p.brightness, 2.0);
        assert_eq!(p.warmth, -50.0);
        assert_eq!(p.sharpen, 0.0);
    }

    #[test]
    fn test_nan_rejected() {
        let mut p = AdjustmentParameters::default();
        let err = p.set(Adjustment::Contrast, f32::NAN).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "contrast"));
        assert!(p.is_identity());
    }

    #[test]
    fn test_identity_values() {
        let p = AdjustmentParameters::IDENTITY;
        for &a in Adjustment::all() {
            assert_eq!(p.get(a), a.identity(), "{a}");
        }
    }

    #[test]
    fn test_selection() {
        let sel = FilterSelection::default();
        assert!(sel.preset.is_none());
        assert_eq!(sel.intensity, 1.0);
    }

    #[test]
    fn test_load_and_reset() {
        let mut state = EditState::default();
        assert!(matches!(state.require_original(), Err(Error::NoSourceImage)));

        let buf = PixelBuffer::new(2, 2, ChannelLayout::Rgba).unwrap();
        state.load(buf);
        let original = state.original.clone().unwrap();
        assert!(Arc::ptr_eq(&original, state.derived.as_ref().unwrap()));

        state.params.brightness = 1.5;
        state.derived = Some(Arc::new(PixelBuffer::new(2, 2, ChannelLayout::Rgba).unwrap()));
        state.reset();
        assert!(state.params.is_identity());
        assert!(Arc::ptr_eq(&original, state.derived.as_ref().unwrap()));
    }
}
