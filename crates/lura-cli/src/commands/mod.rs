//! CLI command implementations

pub mod apply;
pub mod presets;
pub mod previews;

use anyhow::{bail, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use lura_core::{ChannelLayout, PixelBuffer};
use lura_engine::EngineConfig;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    /// Lossy, honours the quality setting
    #[default]
    Jpeg,
    /// Lossless
    Png,
    /// Lossless WebP
    Webp,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// How an exported buffer is encoded and named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Encoder.
    pub format: ExportFormat,
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// File name; generated from the current time when `None`.
    pub filename: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: 95,
            filename: None,
        }
    }
}

impl ExportOptions {
    /// Output file name, `LuraEdit_<millis>.<ext>` unless one was given.
    pub fn resolve_filename(&self) -> String {
        match &self.filename {
            Some(name) => name.clone(),
            None => {
                let millis = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis())
                    .unwrap_or_default();
                format!("LuraEdit_{millis}.{}", self.format.extension())
            }
        }
    }
}

/// Loads the engine config, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Decodes an image into an 8-bit RGB or RGBA buffer.
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path).with_context(|| format!("Failed to load: {}", path.display()))?;
    let (width, height) = (img.width(), img.height());
    debug!(path = %path.display(), width, height, color = ?img.color(), "decoded");

    let buffer = if img.color().has_alpha() {
        PixelBuffer::from_data(width, height, ChannelLayout::Rgba, img.into_rgba8().into_raw())
    } else {
        PixelBuffer::from_data(width, height, ChannelLayout::Rgb, img.into_rgb8().into_raw())
    };
    buffer.with_context(|| format!("Unsupported image: {}", path.display()))
}

fn to_dynamic(buffer: &PixelBuffer) -> Result<DynamicImage> {
    let (w, h) = buffer.dimensions();
    let data = buffer.data().to_vec();
    let img = match buffer.layout() {
        ChannelLayout::Rgb => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
        ChannelLayout::Rgba => RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
    };
    match img {
        Some(img) => Ok(img),
        None => bail!("buffer size does not match {w}x{h}"),
    }
}

/// Encodes `buffer` to `path`.
pub fn save_image(path: &Path, buffer: &PixelBuffer, options: &ExportOptions) -> Result<()> {
    let img = to_dynamic(buffer)?;
    debug!(path = %path.display(), format = ?options.format, quality = options.quality, "encoding");

    match options.format {
        ExportFormat::Jpeg => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create: {}", path.display()))?;
            let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), options.quality);
            // JPEG has no alpha channel
            encoder
                .encode_image(&img.into_rgb8())
                .with_context(|| format!("Failed to save: {}", path.display()))
        }
        ExportFormat::Png => img
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("Failed to save: {}", path.display())),
        ExportFormat::Webp => img
            .save_with_format(path, ImageFormat::WebP)
            .with_context(|| format!("Failed to save: {}", path.display())),
    }
}

/// Picks the output path and format for an export.
///
/// An explicit `output` wins; its extension decides the format unless
/// `format` is given. Otherwise a generated name inside `out_dir` is used.
pub fn resolve_output(
    output: Option<&Path>,
    out_dir: &Path,
    format: Option<ExportFormat>,
    quality: u8,
) -> Result<(PathBuf, ExportOptions)> {
    match output {
        Some(path) => {
            let format = match format.or_else(|| ExportFormat::from_path(path)) {
                Some(f) => f,
                None => bail!("Cannot infer format from {}; use --format", path.display()),
            };
            let options = ExportOptions {
                format,
                quality,
                filename: path.file_name().and_then(|n| n.to_str()).map(String::from),
            };
            Ok((path.to_path_buf(), options))
        }
        None => {
            let options = ExportOptions {
                format: format.unwrap_or_default(),
                quality,
                filename: None,
            };
            Ok((out_dir.join(options.resolve_filename()), options))
        }
    }
}
