//! # lura-core
//!
//! Core types for the Lura non-destructive adjustment engine.
//!
//! - [`PixelBuffer`] - Owned 8-bit RGB/RGBA pixel grid
//! - [`Error`], [`Result`] - Error kinds shared by every Lura crate
//! - [`SATURATION_LUMA`] - Luminance weights used by the saturation stage
//!
//! ## Crate Structure
//!
//! ```text
//! lura-core (this crate)
//!    ^
//!    |
//!    +-- lura-math (affine color matrices, SIMD evaluators)
//!    +-- lura-ops (composer, blender, catalog, sharpen, rotate, thumbnails)
//!    +-- lura-engine (edit state, history, recompute orchestrator)
//!    +-- lura-cli (headless storage collaborator)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod pixel;

pub use buffer::{ChannelLayout, PixelBuffer};
pub use error::{Error, Result};
pub use pixel::{
    quantize, MAX_CHANNEL_VALUE, SATURATION_LUMA, SATURATION_LUMA_B,
    SATURATION_LUMA_G, SATURATION_LUMA_R,
};

/// Prelude module for convenient imports.
///
/// ```
/// use lura_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::{ChannelLayout, PixelBuffer};
    pub use crate::error::{Error, Result};
    pub use crate::pixel::{quantize, MAX_CHANNEL_VALUE, SATURATION_LUMA};
}
