use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use std::path::PathBuf;

use pixelart::{BlockSize, PngCompression};

#[derive(Parser)]
#[command(name = "pixelart-cli")]
#[command(about = "Turn an image into blocky pixel art", long_about = None)]
#[command(version)]
struct Args {
    /// Input image (any format the decoder understands)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output PNG. Defaults to <INPUT dir>/<name>_pixelart.png
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Block size in pixels; zero or negative means the default (10)
    #[arg(
        short,
        long,
        value_name = "PIXELS",
        default_value_t = 10,
        allow_hyphen_values = true
    )]
    block_size: i64,

    /// PNG compression level
    #[arg(long, value_enum, default_value_t = PngCompressionArg::Default)]
    png_compression: PngCompressionArg,

    /// Verbose output
    #[arg(short, long, default_value_t)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, default_value_t)]
    quiet: bool,
}

impl Args {
    fn output_path(&self) -> Result<PathBuf> {
        if let Some(output) = &self.output {
            return Ok(output.clone());
        }

        let name = self
            .input
            .file_name()
            .and_then(|s| s.to_str())
            .context("Input path has no usable file name")?;
        let dir = self.input.parent().unwrap_or_else(|| std::path::Path::new(""));
        Ok(dir.join(pixelart::derived_filename(name)))
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PngCompressionArg {
    Fast,
    Default,
    Best,
}

impl From<PngCompressionArg> for PngCompression {
    fn from(arg: PngCompressionArg) -> Self {
        match arg {
            PngCompressionArg::Fast => PngCompression::Fast,
            PngCompressionArg::Default => PngCompression::Default,
            PngCompressionArg::Best => PngCompression::Best,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    // Validate input file
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let output = args.output_path()?;

    // Create output directory if it doesn't exist
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    let block_size = BlockSize::coerce(args.block_size);
    if i64::from(block_size.get()) != args.block_size {
        log::warn!(
            "Block size {} is not usable, using {block_size}",
            args.block_size
        );
    }

    log::info!(
        "Pixelating `{}` with block size {block_size}",
        args.input.display()
    );

    let (width, height) = pixelart::image::transform_with(
        &args.input,
        &output,
        block_size,
        args.png_compression.into(),
    )
    .with_context(|| format!("Failed to pixelate {}", args.input.display()))?;

    log::info!("Done: {} ({width}x{height})", output.display());

    Ok(())
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}
