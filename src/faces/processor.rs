use image::DynamicImage;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::clustering::cluster_detections;
use super::detector::{Detection, FaceScanner, GrayFrame, ScanParams};
use super::geometry::compute_crop;
use crate::config::Config;
use crate::error::{FaceCropError, Result};
use crate::sink::CropSink;

/// What happened to one input image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageOutcome {
    pub path: PathBuf,
    /// Detections left after clustering and the score filter.
    pub detections: usize,
    pub saved: usize,
    pub failed: usize,
}

/// Runs detection on one image at a time and writes a crop per face.
///
/// Holds only shared references, so a single processor serves every worker.
pub struct FaceProcessor<'a> {
    scanner: &'a dyn FaceScanner,
    sink: &'a dyn CropSink,
    config: &'a Config,
}

impl<'a> FaceProcessor<'a> {
    pub fn new(scanner: &'a dyn FaceScanner, sink: &'a dyn CropSink, config: &'a Config) -> Self {
        Self {
            scanner,
            sink,
            config,
        }
    }

    /// Window range for an image of `cols` x `rows`. The largest window never
    /// exceeds the short side.
    pub fn scan_params(&self, cols: u32, rows: u32) -> ScanParams {
        ScanParams {
            min_size: (self.config.output.size as f64 * self.config.output.face) as usize,
            max_size: cols.min(rows) as usize,
            shift_factor: self.config.scan.shift,
            scale_factor: self.config.scan.scale,
            angle: self.config.scan.angle,
        }
    }

    /// Scan, cluster and score-filter the faces of a decoded image.
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let gray = image.to_luma8();
        let frame = GrayFrame::from_luma(&gray);
        let params = self.scan_params(image.width(), image.height());

        let raw = self.scanner.scan(&frame, &params)?;
        let clustered = cluster_detections(&raw, self.config.filter.iou);
        let kept = filter_by_score(clustered, self.config.filter.score);

        debug!(
            raw = raw.len(),
            kept = kept.len(),
            min_size = params.min_size,
            max_size = params.max_size,
            "scan finished"
        );
        Ok(kept)
    }

    /// Load `path`, detect faces and save one crop per face.
    ///
    /// Decode and scan failures end processing of this image. Failed saves are
    /// logged and counted without affecting the other crops.
    pub fn process_image(&self, path: &Path) -> Result<ImageOutcome> {
        let image = image::open(path).map_err(|source| FaceCropError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let detections = self.detect(&image)?;
        let (saved, failed) = self.save_crops(path, &image, &detections);

        Ok(ImageOutcome {
            path: path.to_path_buf(),
            detections: detections.len(),
            saved,
            failed,
        })
    }

    fn save_crops(&self, source: &Path, image: &DynamicImage, detections: &[Detection]) -> (usize, usize) {
        let output = &self.config.output;
        let (cols, rows) = (image.width(), image.height());

        let results: Vec<Result<()>> = detections
            .par_iter()
            .enumerate()
            .map(|(number, detection)| {
                let rect = compute_crop(detection, cols, rows, output.size, output.face);
                info!(
                    file = %source.display(),
                    number,
                    min_x = rect.min_x,
                    min_y = rect.min_y,
                    max_x = rect.max_x,
                    max_y = rect.max_y,
                    "detected face"
                );

                let target = output.dir.join(crop_file_name(source, number, &output.format));
                self.sink.save(image, &rect, &target).inspect_err(|e| {
                    error!(file = %target.display(), error = %e, "failed to save face crop");
                })
            })
            .collect();

        let saved = results.iter().filter(|r| r.is_ok()).count();
        (saved, results.len() - saved)
    }
}

/// Keep detections scoring at least `min_score`, preserving order.
pub fn filter_by_score(mut detections: Vec<Detection>, min_score: f32) -> Vec<Detection> {
    detections.retain(|d| d.score >= min_score);
    detections
}

/// `{stem}_{NN}.{extension}` for the `index`-th face of `source`.
pub fn crop_file_name(source: &Path, index: usize, extension: &str) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    format!("{}_{:02}.{}", stem, index, extension)
}
