//! Thumbnails.
//!
//! Downscaling uses an area-average box filter: every destination pixel is
//! the mean of the source pixels its footprint covers. Images already
//! within the requested size are copied, never upscaled.

use lura_core::{Error, PixelBuffer, Result};
use tracing::trace;

/// Aspect-preserving dimensions that fit inside `max_w` x `max_h`.
///
/// # Example
///
/// ```rust
/// use lura_ops::resize::fit_dimensions;
///
/// assert_eq!(fit_dimensions(1920, 1080, 640, 480), (640, 360));
/// ```
pub fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let scale_w = max_w as f32 / src_w as f32;
    let scale_h = max_h as f32 / src_h as f32;
    let scale = scale_w.min(scale_h);

    let new_w = ((src_w as f32 * scale).round() as u32).max(1);
    let new_h = ((src_h as f32 * scale).round() as u32).max(1);

    (new_w, new_h)
}

/// Scales `src` so its longer side is at most `max_side`.
///
/// # Errors
///
/// [`Error::InvalidParameter`] if `max_side` is zero.
pub fn thumbnail(src: &PixelBuffer, max_side: u32) -> Result<PixelBuffer> {
    if max_side == 0 {
        return Err(Error::invalid_parameter("max_side", "must be positive"));
    }
    let (w, h) = src.dimensions();
    if w <= max_side && h <= max_side {
        return Ok(src.clone());
    }
    let (new_w, new_h) = fit_dimensions(w, h, max_side, max_side);
    trace!(w, h, new_w, new_h, "thumbnail");
    box_downscale(src, new_w, new_h)
}

/// Area-average downscale to exactly `new_w` x `new_h`.
fn box_downscale(src: &PixelBuffer, new_w: u32, new_h: u32) -> Result<PixelBuffer> {
    let mut dst = PixelBuffer::new(new_w, new_h, src.layout())?;
    let channels = src.channels();
    let (w, h) = (src.width() as u64, src.height() as u64);
    let (nw, nh) = (new_w as u64, new_h as u64);
    let dst_row = dst.row_len();
    let out = dst.data_mut();

    for dy in 0..nh {
        let y0 = (dy * h / nh) as u32;
        let y1 = (((dy + 1) * h).div_ceil(nh) as u32).max(y0 + 1);
        for dx in 0..nw {
            let x0 = (dx * w / nw) as u32;
            let x1 = (((dx + 1) * w).div_ceil(nw) as u32).max(x0 + 1);

            let mut sums = [0u64; 4];
            for sy in y0..y1 {
                for sx in x0..x1 {
                    for (c, px) in src.pixel(sx, sy).iter().enumerate() {
                        sums[c] += u64::from(*px);
                    }
                }
            }

            let count = u64::from((y1 - y0) * (x1 - x0));
            let idx = dy as usize * dst_row + dx as usize * channels;
            for c in 0..channels {
                out[idx + c] = ((sums[c] + count / 2) / count) as u8;
            }
        }
    }

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lura_core::ChannelLayout;

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(1000, 500, 100, 100), (100, 50));
        assert_eq!(fit_dimensions(300, 600, 100, 100), (50, 100));
        assert_eq!(fit_dimensions(1000, 1, 100, 100), (100, 1));
    }

    #[test]
    fn test_no_upscale() {
        let src = PixelBuffer::filled(40, 30, ChannelLayout::Rgba, &[1, 2, 3, 4]).unwrap();
        assert_eq!(thumbnail(&src, 100).unwrap(), src);
    }

    #[test]
    fn test_downscale_constant() {
        let src = PixelBuffer::filled(250, 125, ChannelLayout::Rgba, &[10, 200, 33, 255]).unwrap();
        let thumb = thumbnail(&src, 100).unwrap();
        assert_eq!(thumb.dimensions(), (100, 50));
        assert!(thumb.data().chunks(4).all(|p| p == [10, 200, 33, 255]));
    }

    #[test]
    fn test_downscale_averages() {
        // 2x1 black/white checker averaged into one pixel
        let src = PixelBuffer::from_data(2, 1, ChannelLayout::Rgb, vec![0, 0, 0, 255, 255, 255]).unwrap();
        let thumb = thumbnail(&src, 1).unwrap();
        assert_eq!(thumb.dimensions(), (1, 1));
        assert_eq!(thumb.pixel(0, 0), &[128, 128, 128]);
    }

    #[test]
    fn test_zero_side_rejected() {
        let src = PixelBuffer::new(4, 4, ChannelLayout::Rgb).unwrap();
        assert!(thumbnail(&src, 0).is_err());
    }
}
