//! lura - headless front end for the Lura adjustment engine
//!
//! Decodes an image, drives an editor session and encodes the result.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::ExportFormat;

#[derive(Parser)]
#[command(name = "lura")]
#[command(author, version, about = "Non-destructive photo adjustments from the command line")]
#[command(long_about = "
Applies brightness, contrast, saturation, warmth, sharpening and filter
presets to an image without touching the source file.

Examples:
  lura presets                                  # List filter presets
  lura apply photo.jpg -o out.jpg --preset vintage --intensity 0.5
  lura apply photo.png -o out.webp -b 1.1 -c 1.2 --warmth 20 --sharpen 0.5
  lura apply photo.jpg --out-dir exports -f png --rotate 90
  lura previews photo.jpg --out-dir strip --size 100
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Engine configuration file (RON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply adjustments and export the result
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),

    /// List the built-in filter presets
    #[command(visible_alias = "p")]
    Presets,

    /// Write a thumbnail per preset (filter strip)
    Previews(PreviewsArgs),
}

#[derive(Args)]
struct ApplyArgs {
    /// Input image
    input: PathBuf,

    /// Output file (format from extension unless --format is given)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output directory when --output is omitted
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<ExportFormat>,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value = "95", value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Filter preset id
    #[arg(short, long, default_value = "none")]
    preset: String,

    /// Preset intensity (0-1)
    #[arg(short, long, default_value = "1.0")]
    intensity: f32,

    /// Brightness (0-2)
    #[arg(short, long, default_value = "1.0")]
    brightness: f32,

    /// Contrast (0-2)
    #[arg(short, long, default_value = "1.0")]
    contrast: f32,

    /// Saturation (0-2)
    #[arg(short, long, default_value = "1.0")]
    saturation: f32,

    /// Warmth (-50 to 50)
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    warmth: f32,

    /// Sharpen amount (0-1)
    #[arg(long, default_value = "0")]
    sharpen: f32,

    /// Rotate the source clockwise first (90, 180, 270)
    #[arg(short, long, allow_hyphen_values = true)]
    rotate: Option<i32>,
}

#[derive(Args)]
struct PreviewsArgs {
    /// Input image
    input: PathBuf,

    /// Output directory
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Thumbnail long side in pixels
    #[arg(short, long)]
    size: Option<u32>,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Apply(args) => commands::apply::run(args, config, cli.verbose),
        Commands::Presets => commands::presets::run(cli.verbose),
        Commands::Previews(args) => commands::previews::run(args, config, cli.verbose),
    }
}
