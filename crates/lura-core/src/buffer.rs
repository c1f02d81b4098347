//! Pixel buffer type.
//!
//! [`PixelBuffer`] is the only image container the engine knows about: an
//! owned, fixed-size grid of interleaved 8-bit samples.
//!
//! # Memory Layout
//!
//! Pixels are stored in **row-major** order, top-to-bottom:
//!
//! ```text
//! Memory: [R G B A R G B A ...]  <- Row 0
//!         [R G B A R G B A ...]  <- Row 1
//!         ...
//! ```
//!
//! RGB buffers simply omit the alpha sample.
//!
//! # Allocation
//!
//! Every constructor reserves its storage fallibly, so an oversized or
//! zero-sized request surfaces as [`Error::AllocationFailed`] instead of
//! aborting the process.
//!
//! # Usage
//!
//! ```rust
//! use lura_core::{ChannelLayout, PixelBuffer};
//!
//! let mut buf = PixelBuffer::filled(2, 2, ChannelLayout::Rgba, &[128, 128, 128, 255]).unwrap();
//! buf.set_pixel(1, 1, &[255, 0, 0, 255]);
//! assert_eq!(buf.pixel(1, 1), &[255, 0, 0, 255]);
//! assert_eq!(buf.pixel(0, 0)[0], 128);
//! ```

use crate::{Error, Result};

/// Interleaved channel layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Three samples per pixel: red, green, blue.
    Rgb,
    /// Four samples per pixel: red, green, blue, alpha.
    #[default]
    Rgba,
}

impl ChannelLayout {
    /// Number of samples per pixel.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Returns `true` if the layout carries an alpha sample.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba)
    }
}

/// Owned 8-bit pixel grid.
///
/// Once loaded into an editing session a buffer is shared behind an
/// `Arc` and never mutated again; new results are always new buffers.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a zero-filled buffer.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailed`] if either dimension is zero, the byte
    /// size overflows, or the allocator refuses the request.
    pub fn new(width: u32, height: u32, layout: ChannelLayout) -> Result<Self> {
        let data = allocate(width, height, layout)?;
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Creates a buffer from existing samples.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailed`] for zero dimensions,
    /// [`Error::InvalidDimensions`] if `data.len()` doesn't match.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lura_core::{ChannelLayout, PixelBuffer};
    ///
    /// let buf = PixelBuffer::from_data(1, 2, ChannelLayout::Rgb, vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// assert_eq!(buf.pixel(0, 1), &[4, 5, 6]);
    /// ```
    pub fn from_data(width: u32, height: u32, layout: ChannelLayout, data: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height, layout)?;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} samples, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Creates a buffer with every pixel set to `pixel`.
    ///
    /// # Errors
    ///
    /// As [`PixelBuffer::new`], plus [`Error::InvalidDimensions`] if
    /// `pixel` doesn't have exactly `layout.channels()` samples.
    pub fn filled(width: u32, height: u32, layout: ChannelLayout, pixel: &[u8]) -> Result<Self> {
        if pixel.len() != layout.channels() {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("fill pixel has {} samples, layout needs {}", pixel.len(), layout.channels()),
            ));
        }
        let mut buf = Self::new(width, height, layout)?;
        for px in buf.data.chunks_exact_mut(layout.channels()) {
            px.copy_from_slice(pixel);
        }
        Ok(buf)
    }

    /// Creates a zero-filled buffer with the same shape as `self`.
    pub fn alloc_like(&self) -> Result<Self> {
        Self::new(self.width, self.height, self.layout)
    }

    /// Returns the width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the channel layout.
    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Returns the number of samples per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Returns the number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns the number of samples in one row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channels()
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw samples.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Samples of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let idx = self.index(x, y);
        &self.data[idx..idx + self.channels()]
    }

    /// Samples of the pixel at `(x, y)`, or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        (x < self.width && y < self.height).then(|| self.pixel(x, y))
    }

    /// Overwrites the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if out of bounds or `pixel` has the wrong sample count.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: &[u8]) {
        let idx = self.index(x, y);
        let c = self.channels();
        self.data[idx..idx + c].copy_from_slice(pixel);
    }

    /// Samples of row `y`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let len = self.row_len();
        let start = y as usize * len;
        &self.data[start..start + len]
    }

    /// Iterates over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.data.chunks_exact(self.row_len())
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels()
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// Number of samples a `width x height` buffer of `layout` needs.
///
/// # Errors
///
/// [`Error::AllocationFailed`] for zero dimensions or overflow.
pub fn byte_len(width: u32, height: u32, layout: ChannelLayout) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::allocation_failed(
            0,
            format!("cannot allocate a {width}x{height} buffer"),
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(layout.channels()))
        .ok_or_else(|| Error::allocation_failed(usize::MAX, "buffer size overflows usize"))
}

/// Fallibly allocates a zeroed sample vector for a buffer shape.
pub fn allocate(width: u32, height: u32, layout: ChannelLayout) -> Result<Vec<u8>> {
    let len = byte_len(width, height, layout)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|e| Error::allocation_failed(len, e.to_string()))?;
    data.resize(len, 0);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zeroed() {
        let buf = PixelBuffer::new(3, 2, ChannelLayout::Rgba).unwrap();
        assert_eq!(buf.data().len(), 3 * 2 * 4);
        assert!(buf.data().iter().all(|&v| v == 0));
        assert_eq!(buf.row_len(), 12);
    }

    #[test]
    fn test_zero_dimensions_fail_allocation() {
        let err = PixelBuffer::new(0, 10, ChannelLayout::Rgb).unwrap_err();
        assert!(err.is_allocation_error());
        let err = PixelBuffer::from_data(4, 0, ChannelLayout::Rgb, Vec::new()).unwrap_err();
        assert!(err.is_allocation_error());
    }

    #[test]
    fn test_oversized_allocation_fails() {
        let err = PixelBuffer::new(u32::MAX, u32::MAX, ChannelLayout::Rgba).unwrap_err();
        assert!(err.is_allocation_error());
    }

    #[test]
    fn test_from_data_length_mismatch() {
        let err = PixelBuffer::from_data(2, 2, ChannelLayout::Rgba, vec![0; 15]).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
    }

    #[test]
    fn test_filled_and_access() {
        let mut buf = PixelBuffer::filled(2, 2, ChannelLayout::Rgb, &[1, 2, 3]).unwrap();
        assert_eq!(buf.pixel(1, 1), &[1, 2, 3]);
        buf.set_pixel(0, 1, &[9, 9, 9]);
        assert_eq!(buf.row(1), &[9, 9, 9, 1, 2, 3]);
        assert!(buf.get_pixel(2, 0).is_none());
        assert_eq!(buf.rows().count(), 2);
    }

    #[test]
    fn test_filled_rejects_wrong_pixel() {
        assert!(PixelBuffer::filled(1, 1, ChannelLayout::Rgba, &[1, 2, 3]).is_err());
    }

    #[test]
    fn test_layout_channels() {
        assert!(ChannelLayout::Rgba.has_alpha());
        assert!(!ChannelLayout::Rgb.has_alpha());
    }
}
