//! Apply command: runs one editor session headlessly.

use crate::ApplyArgs;
use anyhow::{Context, Result};
use lura_engine::{Editor, EngineConfig, Rotation};
use tracing::{debug, info, trace};

/// Runs the apply command.
///
/// Parameters are applied in pipeline order; the editor coalesces the
/// resulting jobs, so only the final combination is computed.
pub fn run(args: ApplyArgs, config: EngineConfig, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), "apply::run");

    let image = super::load_image(&args.input)?;
    let (w, h) = image.dimensions();
    if verbose > 0 {
        println!("Loaded {} ({}x{})", args.input.display(), w, h);
    }

    let mut editor = Editor::new(config).context("Invalid engine configuration")?;
    editor.load_image(image)?;

    if let Some(degrees) = args.rotate {
        let rotation = Rotation::from_degrees(degrees)?;
        debug!(degrees, "rotating source");
        editor.rotate(rotation)?;
    }

    editor
        .select_filter(&args.preset)
        .with_context(|| format!("Unknown preset `{}` (see `lura presets`)", args.preset))?;
    editor.set_filter_intensity(args.intensity)?;
    editor.set_brightness(args.brightness)?;
    editor.set_contrast(args.contrast)?;
    editor.set_saturation(args.saturation)?;
    editor.set_warmth(args.warmth)?;
    editor.set_sharpen(args.sharpen)?;

    editor.wait_idle(None).context("Recompute did not finish")?;
    if let Some(err) = editor.last_error() {
        return Err(err.clone()).context("Failed to apply adjustments");
    }

    let derived = editor.export_derived()?;
    let (path, options) =
        super::resolve_output(args.output.as_deref(), &args.out_dir, args.format, args.quality)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    info!(
        output = %path.display(),
        format = ?options.format,
        preset = editor.selection().preset.id,
        "exporting"
    );
    super::save_image(&path, &derived, &options)?;

    if verbose > 0 {
        let p = editor.params();
        println!(
            "Applied {} @ {:.2}, b={:.2} c={:.2} s={:.2} w={:.0} sharpen={:.2}",
            editor.selection().preset.id,
            editor.selection().intensity,
            p.brightness,
            p.contrast,
            p.saturation,
            p.warmth,
            p.sharpen
        );
        println!("Saved {}", path.display());
    }

    Ok(())
}
