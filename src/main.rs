use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use facecrop::{batch, logging, Config};

/// Detect faces in images and save a square crop of each one.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about,
    after_help = "ENVIRONMENT:
    FACECROP_CONFIG     Path to config file (overrides default location)
    FACECROP_LOG        Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/facecrop/config.toml"
)]
struct Cli {
    /// Input images.
    #[arg(required = true, value_name = "IMAGE")]
    inputs: Vec<PathBuf>,

    /// Path to config file.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output directory [default: faces]
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Minimum size of each output image [default: 256]
    #[arg(long)]
    size: Option<u32>,

    /// Face factor between 0 and 1: how much of the output image the face occupies [default: 0.5]
    #[arg(long)]
    face: Option<f64>,

    /// Shift factor [default: 0.1]
    #[arg(long)]
    shift: Option<f64>,

    /// Scale factor [default: 1.1]
    #[arg(long)]
    scale: Option<f64>,

    /// Face rotation angle: 0.0 is 0 radians and 1.0 is 2*pi radians [default: 0]
    #[arg(long)]
    angle: Option<f64>,

    /// Intersection over union threshold [default: 0.2]
    #[arg(long)]
    iou: Option<f64>,

    /// Minimum score [default: 0.5]
    #[arg(long)]
    score: Option<f32>,

    /// Output image format, by file extension [default: png]
    #[arg(long, value_name = "EXT")]
    format: Option<String>,

    /// SeetaFace model file (defaults to the compiled-in model when available)
    #[arg(short, long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Worker threads, 0 for one per core [default: 0]
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Write logs to a rolling file in this directory instead of stderr
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

impl Cli {
    /// Command-line flags take precedence over the config file.
    fn apply(&self, config: &mut Config) {
        if let Some(out) = &self.out {
            config.output.dir = out.clone();
        }
        if let Some(size) = self.size {
            config.output.size = size;
        }
        if let Some(face) = self.face {
            config.output.face = face;
        }
        if let Some(format) = &self.format {
            config.output.format = format.clone();
        }
        if let Some(shift) = self.shift {
            config.scan.shift = shift;
        }
        if let Some(scale) = self.scale {
            config.scan.scale = scale;
        }
        if let Some(angle) = self.angle {
            config.scan.angle = angle;
        }
        if let Some(model) = &self.model {
            config.scan.model = Some(model.clone());
        }
        if let Some(iou) = self.iou {
            config.filter.iou = iou;
        }
        if let Some(score) = self.score {
            config.filter.score = score;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = Some(log_dir.clone());
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    logging::init(config.log_dir.as_deref())?;

    let report = batch::run(&cli.inputs, &config).context("Face cropping aborted")?;
    info!(
        images = report.images_total,
        skipped = report.images_failed,
        crops = report.crops_saved,
        "done"
    );

    Ok(())
}
