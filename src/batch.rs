//! Batch driver: one task per input image, nested tasks per face.
//!
//! Every image runs on a shared worker pool and every face of an image fans
//! out again on the same pool. `run` returns only after all of them finished;
//! failures stay confined to the image or crop that produced them.

use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{FaceCropError, Result};
use crate::faces::{FaceProcessor, FaceScanner, ImageOutcome, RustfaceScanner};
use crate::sink::{CropSink, FileSink};

/// Totals gathered once every image task has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub images_total: usize,
    pub images_processed: usize,
    pub images_failed: usize,
    pub faces_detected: usize,
    pub crops_saved: usize,
    pub crops_failed: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: &Result<ImageOutcome>) {
        match outcome {
            Ok(outcome) => {
                self.images_processed += 1;
                self.faces_detected += outcome.detections;
                self.crops_saved += outcome.saved;
                self.crops_failed += outcome.failed;
            }
            Err(_) => self.images_failed += 1,
        }
    }
}

/// Load the face model, then crop faces from every input with file output.
///
/// Errors returned here abort the whole batch: invalid configuration, an
/// unusable model, or an output directory that cannot be created.
pub fn run(inputs: &[PathBuf], config: &Config) -> Result<BatchReport> {
    config.validate()?;

    let scanner = RustfaceScanner::load(config.scan.model.as_deref())?;
    match &config.scan.model {
        Some(path) => info!(model = %path.display(), "face model loaded"),
        None => info!("using compiled-in face model"),
    }
    let sink = FileSink::from_extension(&config.output.format)?;

    process_all(inputs, config, &scanner, &sink)
}

/// Like [`run`] with a caller-supplied scanner and sink.
pub fn run_with(
    inputs: &[PathBuf],
    config: &Config,
    scanner: &dyn FaceScanner,
    sink: &dyn CropSink,
) -> Result<BatchReport> {
    config.validate()?;
    process_all(inputs, config, scanner, sink)
}

fn process_all(
    inputs: &[PathBuf],
    config: &Config,
    scanner: &dyn FaceScanner,
    sink: &dyn CropSink,
) -> Result<BatchReport> {
    std::fs::create_dir_all(&config.output.dir).map_err(|source| FaceCropError::OutputDir {
        path: config.output.dir.clone(),
        source,
    })?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .thread_name(|i| format!("facecrop-{}", i))
        .build()?;
    let processor = FaceProcessor::new(scanner, sink, config);

    info!(
        images = inputs.len(),
        threads = pool.current_num_threads(),
        out = %config.output.dir.display(),
        "starting batch"
    );

    let outcomes: Vec<Result<ImageOutcome>> = pool.install(|| {
        inputs
            .par_iter()
            .map(|path| {
                processor.process_image(path).inspect_err(|e| {
                    error!(file = %path.display(), error = %e, "skipping image");
                })
            })
            .collect()
    });

    let mut report = BatchReport {
        images_total: inputs.len(),
        ..BatchReport::default()
    };
    for outcome in &outcomes {
        report.record(outcome);
    }

    info!(
        processed = report.images_processed,
        failed = report.images_failed,
        faces = report.faces_detected,
        saved = report.crops_saved,
        crops_failed = report.crops_failed,
        "batch finished"
    );
    Ok(report)
}
