//! Previews command: one thumbnail per preset, like a filter strip.

use crate::PreviewsArgs;
use anyhow::{Context, Result};
use lura_engine::{Editor, EngineConfig};
use lura_ops::catalog;
use tracing::trace;

use super::{ExportFormat, ExportOptions};

pub fn run(args: PreviewsArgs, config: EngineConfig, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), "previews::run");

    let size = args.size.unwrap_or(config.thumbnail_size);
    let mut editor = Editor::new(config).context("Invalid engine configuration")?;
    editor.load_image(super::load_image(&args.input)?)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create directory: {}", args.out_dir.display()))?;

    let stem = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    for preset in catalog::catalog() {
        let thumb = editor.preview_preset(preset.id, size)?;
        let options = ExportOptions {
            format: ExportFormat::Png,
            filename: Some(format!("{stem}_{}.png", preset.id)),
            ..ExportOptions::default()
        };
        let path = args.out_dir.join(options.resolve_filename());
        super::save_image(&path, &thumb, &options)?;
        if verbose > 0 {
            println!("{:<10} -> {}", preset.id, path.display());
        }
    }

    Ok(())
}
