//! Presets command: prints the filter catalog.

use anyhow::Result;
use lura_ops::catalog;
use tracing::trace;

pub fn run(verbose: u8) -> Result<()> {
    trace!("presets::run");

    println!(
        "{:<10} {:<10} {:>10} {:>8} {:>10} {:>7}",
        "ID", "NAME", "BRIGHTNESS", "CONTRAST", "SATURATION", "WARMTH"
    );
    for p in catalog::catalog() {
        println!(
            "{:<10} {:<10} {:>10.2} {:>8.2} {:>10.2} {:>7.0}",
            p.id, p.name, p.brightness, p.contrast, p.saturation, p.warmth
        );
    }

    if verbose > 0 {
        println!("\n{} presets", catalog::catalog().len());
    }
    Ok(())
}
