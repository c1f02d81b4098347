//! Quarter-turn rotations.
//!
//! Rotation replaces the edit source rather than joining the adjustment
//! pipeline, so it works on whole buffers and returns a new one.
//!
//! # Example
//!
//! ```rust
//! use lura_core::{ChannelLayout, PixelBuffer};
//! use lura_ops::transform::{rotate, Rotation};
//!
//! let src = PixelBuffer::new(4, 2, ChannelLayout::Rgb).unwrap();
//! let dst = rotate(&src, Rotation::Cw90).unwrap();
//! assert_eq!(dst.dimensions(), (2, 4));
//! ```

use lura_core::{Error, PixelBuffer, Result};
use tracing::debug;

/// Clockwise rotation by a multiple of 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// 90 degrees clockwise.
    Cw90,
    /// 180 degrees.
    Cw180,
    /// 270 degrees clockwise (90 counter-clockwise).
    Cw270,
}

impl Rotation {
    /// Parses a clockwise angle in degrees.
    ///
    /// Accepts any multiple of 90 except full turns; negative values rotate
    /// counter-clockwise.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees.rem_euclid(360) {
            90 => Ok(Self::Cw90),
            180 => Ok(Self::Cw180),
            270 => Ok(Self::Cw270),
            _ => Err(Error::invalid_parameter(
                "rotation",
                format!("{degrees} is not a quarter turn"),
            )),
        }
    }

    /// Clockwise angle in degrees.
    pub fn degrees(self) -> u32 {
        match self {
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    /// Returns `true` if width and height are exchanged.
    pub fn swaps_axes(self) -> bool {
        !matches!(self, Self::Cw180)
    }
}

/// Rotates `src` clockwise.
pub fn rotate(src: &PixelBuffer, rotation: Rotation) -> Result<PixelBuffer> {
    let (width, height) = (src.width() as usize, src.height() as usize);
    let (new_w, new_h) = if rotation.swaps_axes() {
        (src.height(), src.width())
    } else {
        (src.width(), src.height())
    };
    debug!(width, height, degrees = rotation.degrees(), "rotate");

    let mut dst = PixelBuffer::new(new_w, new_h, src.layout())?;
    let channels = src.channels();
    let new_w = new_w as usize;
    let out = dst.data_mut();

    for (y, row) in src.rows().enumerate() {
        for (x, px) in row.chunks_exact(channels).enumerate() {
            let (nx, ny) = match rotation {
                Rotation::Cw90 => (height - 1 - y, x),
                Rotation::Cw180 => (width - 1 - x, height - 1 - y),
                Rotation::Cw270 => (y, width - 1 - x),
            };
            let idx = (ny * new_w + nx) * channels;
            out[idx..idx + channels].copy_from_slice(px);
        }
    }

    Ok(dst)
}
