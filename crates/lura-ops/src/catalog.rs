//! Built-in filter presets.
//!
//! The catalog is a read-only, process-wide table. Its first entry is the
//! `"none"` sentinel with identity coefficients, which is always the
//! default selection.
//!
//! | id | brightness | contrast | saturation | warmth |
//! |----|-----------:|---------:|-----------:|-------:|
//! | none    | 1.00 | 1.00 | 1.00 |   0 |
//! | clean   | 1.05 | 1.05 | 0.95 |   0 |
//! | soft    | 1.10 | 0.90 | 0.85 |   0 |
//! | dark    | 0.70 | 1.20 | 1.10 |   0 |
//! | vintage | 0.95 | 1.10 | 0.80 |  30 |
//! | film    | 1.05 | 1.15 | 1.20 |   0 |
//! | warm    | 1.05 | 1.00 | 1.10 |  40 |
//! | cool    | 1.00 | 1.05 | 1.05 | -30 |

use lura_core::{Error, Result};

/// Id of the non-filtering sentinel preset.
pub const NONE_ID: &str = "none";

/// A named set of color coefficients.
///
/// Multiplicative coefficients have identity `1.0`, additive ones `0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterPreset {
    /// Unique id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Brightness scale (0.0 - 2.0).
    pub brightness: f32,
    /// Contrast scale (0.0 - 2.0).
    pub contrast: f32,
    /// Saturation factor (0.0 - 2.0).
    pub saturation: f32,
    /// Warmth (-50 to 50).
    pub warmth: f32,
    /// Hue shift in degrees (-180 to 180).
    pub hue: f32,
}

impl FilterPreset {
    /// Preset with identity coefficients.
    pub const fn identity(id: &'static str, name: &'static str) -> Self {
        Self {
            id,
            name,
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            warmth: 0.0,
            hue: 0.0,
        }
    }

    /// Returns `true` for the non-filtering sentinel.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.id == NONE_ID
    }
}

const fn preset(
    id: &'static str,
    name: &'static str,
    brightness: f32,
    contrast: f32,
    saturation: f32,
    warmth: f32,
) -> FilterPreset {
    FilterPreset {
        id,
        name,
        brightness,
        contrast,
        saturation,
        warmth,
        hue: 0.0,
    }
}

static FILTERS: [FilterPreset; 8] = [
    FilterPreset::identity(NONE_ID, "Original"),
    preset("clean", "Clean", 1.05, 1.05, 0.95, 0.0),
    preset("soft", "Soft", 1.1, 0.9, 0.85, 0.0),
    preset("dark", "Dark", 0.7, 1.2, 1.1, 0.0),
    preset("vintage", "Vintage", 0.95, 1.1, 0.8, 30.0),
    preset("film", "Film", 1.05, 1.15, 1.2, 0.0),
    preset("warm", "Warm", 1.05, 1.0, 1.1, 40.0),
    preset("cool", "Cool", 1.0, 1.05, 1.05, -30.0),
];

/// All presets, in display order.
#[inline]
pub fn catalog() -> &'static [FilterPreset] {
    &FILTERS
}

/// The `"none"` sentinel.
#[inline]
pub fn none() -> &'static FilterPreset {
    &FILTERS[0]
}

/// Looks up a preset by id.
///
/// # Example
///
/// ```rust
/// use lura_ops::catalog;
///
/// assert_eq!(catalog::find("warm").unwrap().warmth, 40.0);
/// assert!(catalog::find("sepia").is_none());
/// ```
pub fn find(id: &str) -> Option<&'static FilterPreset> {
    FILTERS.iter().find(|p| p.id == id)
}

/// [`find`], reporting an unknown id as [`Error::InvalidParameter`].
pub fn lookup(id: &str) -> Result<&'static FilterPreset> {
    find(id).ok_or_else(|| Error::invalid_parameter("filter", format!("unknown preset `{id}`")))
}
