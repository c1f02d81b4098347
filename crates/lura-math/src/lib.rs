//! # lura-math
//!
//! Math primitives for the adjustment pipeline.
//!
//! - [`ColorMatrix`] - affine RGB transform (3x3 linear part + offset)
//! - [`simd::ColorMatrixX4`] - 4-lane evaluator, bit-identical to [`ColorMatrix::transform`]
//!
//! # Design
//!
//! All matrices are stored **row-major** and act on **column vectors**:
//!
//! ```text
//! result = matrix * rgb + offset
//! ```
//!
//! Composition follows the same convention: `b * a` applies `a` first.
//! [`ColorMatrix::then`] spells that out in application order.
//!
//! # Usage
//!
//! ```rust
//! use lura_math::ColorMatrix;
//!
//! let brighten = ColorMatrix::scale(1.5);
//! let lift = ColorMatrix::IDENTITY.with_offset([10.0, 10.0, 10.0]);
//!
//! let m = brighten.then(&lift);
//! assert_eq!(m.transform([100.0, 100.0, 100.0]), [160.0, 160.0, 160.0]);
//! ```
//!
//! # Used By
//!
//! - `lura-ops` - composer, blender

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod matrix;
pub mod simd;

pub use matrix::*;
