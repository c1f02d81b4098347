//! Convolution filters.
//!
//! Only the sharpen stage uses this today, but [`convolve`] accepts any odd
//! sized kernel.
//!
//! # Example
//!
//! ```rust
//! use lura_core::{ChannelLayout, PixelBuffer};
//! use lura_ops::filter::{convolve, Kernel};
//! use lura_ops::ExecOptions;
//!
//! let src = PixelBuffer::filled(8, 8, ChannelLayout::Rgb, &[10, 20, 30]).unwrap();
//! let out = convolve(&src, &Kernel::sharpen(0.01), ExecOptions::default()).unwrap();
//! assert_eq!(out, src);
//! ```

use crate::parallel::{for_each_row, ExecOptions};
use lura_core::{quantize, Error, PixelBuffer, Result};
use tracing::trace;

/// Convolution kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Weights, row-major.
    pub data: Vec<f32>,
    /// Kernel width (odd).
    pub width: usize,
    /// Kernel height (odd).
    pub height: usize,
}

impl Kernel {
    /// Creates a kernel from weights.
    ///
    /// Width and height must be odd and match `data.len()`.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> Result<Self> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(Error::invalid_parameter("kernel", "dimensions must be odd"));
        }
        if data.len() != width * height {
            return Err(Error::invalid_parameter(
                "kernel",
                format!("data size {} doesn't match {}x{}", data.len(), width, height),
            ));
        }
        Ok(Self { data, width, height })
    }

    /// 3x3 sharpen kernel.
    ///
    /// Center weight `1 + 4 * strength`, edge neighbours `-strength`,
    /// corners zero. Weights sum to one, so flat regions are preserved.
    ///
    /// ```rust
    /// use lura_ops::filter::Kernel;
    ///
    /// let k = Kernel::sharpen(0.5);
    /// assert_eq!(k.data[4], 3.0);
    /// assert_eq!(k.data[0], 0.0);
    /// ```
    #[rustfmt::skip]
    pub fn sharpen(strength: f32) -> Self {
        let center = 1.0 + 4.0 * strength;
        Self {
            data: vec![
                0.0, -strength, 0.0,
                -strength, center, -strength,
                0.0, -strength, 0.0,
            ],
            width: 3,
            height: 3,
        }
    }

    /// Half-size in x and y.
    #[inline]
    pub fn radius(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }
}

/// Convolves the color channels of `src` with `kernel`.
///
/// Samples outside the image are clamped to the nearest edge pixel. Alpha is
/// copied unchanged. Results are rounded and clamped to `[0, 255]`.
pub fn convolve(src: &PixelBuffer, kernel: &Kernel, opts: ExecOptions) -> Result<PixelBuffer> {
    let (width, height) = (src.width() as usize, src.height() as usize);
    trace!(width, height, kernel_w = kernel.width, kernel_h = kernel.height, "convolve");

    let mut dst = src.alloc_like()?;
    let channels = src.channels();
    let (rx, ry) = kernel.radius();
    let data = src.data();

    for_each_row(dst.data_mut(), src.row_len(), opts, |y, row| {
        for x in 0..width {
            let mut sums = [0.0f32; 3];
            for ky in 0..kernel.height {
                let sy = (y + ky).saturating_sub(ry).min(height - 1);
                for kx in 0..kernel.width {
                    let kw = kernel.data[ky * kernel.width + kx];
                    if kw == 0.0 {
                        continue;
                    }
                    let sx = (x + kx).saturating_sub(rx).min(width - 1);
                    let idx = (sy * width + sx) * channels;
                    for (c, sum) in sums.iter_mut().enumerate() {
                        *sum += f32::from(data[idx + c]) * kw;
                    }
                }
            }

            let out = &mut row[x * channels..(x + 1) * channels];
            for c in 0..3 {
                out[c] = quantize(sums[c]);
            }
            if channels == 4 {
                out[3] = data[(y * width + x) * channels + 3];
            }
        }
    });

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lura_core::ChannelLayout;

    #[test]
    fn test_kernel_new_validation() {
        assert!(Kernel::new(vec![1.0; 6], 2, 3).is_err());
        assert!(Kernel::new(vec![1.0; 8], 3, 3).is_err());
        assert!(Kernel::new(vec![0.0; 9], 3, 3).is_ok());
    }

    #[test]
    fn test_sharpen_weights_sum_to_one() {
        let k = Kernel::sharpen(0.3);
        let sum: f32 = k.data.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert_eq!(k.radius(), (1, 1));
    }

    #[test]
    fn test_identity_kernel() {
        let mut src = PixelBuffer::filled(4, 3, ChannelLayout::Rgba, &[1, 2, 3, 4]).unwrap();
        src.set_pixel(1, 2, &[250, 0, 99, 100]);
        let out = convolve(&src, &Kernel::new(vec![1.0], 1, 1).unwrap(), ExecOptions::SCALAR).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_edges_clamped() {
        // Single column: horizontal neighbours resolve to the pixel itself
        let mut src = PixelBuffer::filled(1, 3, ChannelLayout::Rgb, &[100, 100, 100]).unwrap();
        src.set_pixel(0, 0, &[0, 0, 0]);
        let out = convolve(&src, &Kernel::sharpen(0.5), ExecOptions::SCALAR).unwrap();
        // top: 3*0 - 0.5*(0 + 0 + 0 + 100) < 0
        assert_eq!(out.pixel(0, 0), &[0, 0, 0]);
        // middle: 3*100 - 0.5*(0 + 100 + 100 + 100) = 150
        assert_eq!(out.pixel(0, 1), &[150, 150, 150]);
    }

    #[test]
    fn test_parallel_matches_scalar() {
        let data: Vec<u8> = (0..16 * 9 * 4).map(|i| (i * 31 % 256) as u8).collect();
        let src = PixelBuffer::from_data(16, 9, ChannelLayout::Rgba, data).unwrap();
        let k = Kernel::sharpen(0.01);
        let a = convolve(&src, &k, ExecOptions::SCALAR).unwrap();
        let b = convolve(&src, &k, ExecOptions::default()).unwrap();
        assert_eq!(a, b);
    }
}
