//! Error types for Lura operations.
//!
//! One [`Error`] enum covers every failure mode of the engine:
//! - Buffer construction and allocation
//! - Parameter validation
//! - Undo history
//! - Recomputation scheduling
//!
//! # Usage
//!
//! ```rust
//! use lura_core::{Error, Result};
//!
//! fn checked_brightness(value: f32) -> Result<f32> {
//!     if value.is_nan() {
//!         return Err(Error::invalid_parameter("brightness", "value is NaN"));
//!     }
//!     Ok(value.clamp(0.0, 2.0))
//! }
//! assert!(checked_brightness(f32::NAN).is_err());
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - derive macro for `Display` and `std::error::Error`

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the adjustment engine.
///
/// # Categories
///
/// - **Input errors**: [`InvalidParameter`](Error::InvalidParameter), [`InvalidDimensions`](Error::InvalidDimensions)
/// - **Resource errors**: [`AllocationFailed`](Error::AllocationFailed)
/// - **Session errors**: [`NoSourceImage`](Error::NoSourceImage), [`EmptyHistory`](Error::EmptyHistory)
/// - **Scheduling errors**: [`Cancelled`](Error::Cancelled), [`WorkerUnavailable`](Error::WorkerUnavailable), [`Timeout`](Error::Timeout)
/// - **Configuration errors**: [`Config`](Error::Config)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A parameter could not be accepted even after clamping.
    ///
    /// Range violations are clamped by the setters, so this is only
    /// returned for NaN values, unknown preset ids, malformed kernels and
    /// invalid configuration.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Undo was requested with nothing to undo.
    #[error("nothing to undo")]
    EmptyHistory,

    /// Pixel buffer allocation failed.
    ///
    /// # Fields
    ///
    /// - `requested` - Number of bytes requested
    /// - `reason` - Description of why allocation failed
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },

    /// Invalid buffer dimensions or data length.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// An operation needed a loaded image and none is loaded.
    #[error("no source image loaded")]
    NoSourceImage,

    /// A recompute job was abandoned because newer parameters superseded it.
    #[error("job {generation} superseded")]
    Cancelled {
        /// Generation of the abandoned job
        generation: u64,
    },

    /// The recompute worker is no longer running.
    #[error("recompute worker unavailable")]
    WorkerUnavailable,

    /// Waiting for a recompute job exceeded the caller's deadline.
    #[error("timed out waiting for job {generation}")]
    Timeout {
        /// Generation that was being waited on
        generation: u64,
    },

    /// Engine configuration could not be read or parsed.
    ///
    /// Carries the rendered I/O or RON error so that [`Error`] stays
    /// `Clone` for publication to observers.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates an [`Error::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::Config`] error.
    #[inline]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Returns `true` if this is an allocation error.
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }

    /// Returns `true` if the error only reports that a job was superseded.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns `true` for errors that leave the session untouched and are
    /// meant to be surfaced as a disabled action rather than a failure.
    #[inline]
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::EmptyHistory | Self::NoSourceImage | Self::Cancelled { .. })
    }
}
