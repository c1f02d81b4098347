//! # lura-ops
//!
//! Pixel operations behind the Lura adjustment pipeline.
//!
//! # Modules
//!
//! - [`catalog`] - Static table of named filter presets
//! - [`compose`] - Brightness/contrast/saturation/warmth fused into one matrix
//! - [`filter`] - 3x3 convolution and the sharpen stage
//! - [`blend`] - Preset coefficients interpolated by intensity
//! - [`transform`] - Quarter-turn rotations (re-source operations)
//! - [`resize`] - Box-filtered thumbnails
//!
//! # Pipeline
//!
//! ```rust
//! use lura_core::{ChannelLayout, PixelBuffer};
//! use lura_ops::{blend, catalog, compose};
//!
//! let original = PixelBuffer::filled(4, 4, ChannelLayout::Rgba, &[120, 90, 60, 255]).unwrap();
//! let vintage = catalog::find("vintage").unwrap();
//!
//! let filtered = blend::blend(&original, vintage, 0.5).unwrap();
//! let m = compose::compose(1.1, 1.0, 1.0, 0.0);
//! let derived = compose::apply(&m, &filtered).unwrap();
//! let derived = compose::apply_sharpen(&derived, 0.5).unwrap();
//! assert_eq!(derived.dimensions(), (4, 4));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod blend;
pub mod catalog;
pub mod compose;
pub mod filter;
pub mod parallel;
pub mod resize;
pub mod transform;

pub use blend::EffectiveCoefficients;
pub use catalog::FilterPreset;
pub use parallel::ExecOptions;
pub use transform::Rotation;
