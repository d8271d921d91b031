use std::io::Cursor;
use std::path::Path;

use super::detector::{Detection, FaceScanner, GrayFrame, ScanParams};
use super::rotation::scan_rotated;
use crate::error::{FaceCropError, Result};

/// Set by `build.rs` when `model/seeta_fd_frontal_v1.0.bin` is in the tree.
#[cfg(embedded_model)]
static EMBEDDED_MODEL: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/model/seeta_fd_frontal_v1.0.bin"
));

/// Edge of the window the SeetaFace classifiers were trained on.
const WINDOW_SIZE: f64 = 40.0;

/// rustface panics below this face size.
const MIN_FACE_SIZE: usize = 20;

/// Raw classifier score a window needs before rustface reports it.
const SCORE_THRESHOLD: f64 = 2.0;

/// Face scanner backed by the `rustface` crate (SeetaFace engine).
///
/// The model is parsed once and cloned into a fresh detector per scan, since
/// a rustface detector needs `&mut self` to run.
pub struct RustfaceScanner {
    model: rustface::Model,
}

impl RustfaceScanner {
    /// Parse a serialized SeetaFace model.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let model = rustface::read_model(Cursor::new(bytes))
            .map_err(|e| FaceCropError::ModelUnpack(e.to_string()))?;
        Ok(Self { model })
    }

    /// Read the model at `path`, or use the compiled-in one when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let bytes = std::fs::read(path).map_err(|source| FaceCropError::ModelRead {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_bytes(&bytes)
            }
            None => Self::embedded(),
        }
    }

    #[cfg(embedded_model)]
    fn embedded() -> Result<Self> {
        Self::from_bytes(EMBEDDED_MODEL)
    }

    #[cfg(not(embedded_model))]
    fn embedded() -> Result<Self> {
        Err(FaceCropError::ModelMissing)
    }

    pub fn has_embedded_model() -> bool {
        cfg!(embedded_model)
    }

    fn scan_upright(&self, frame: &GrayFrame<'_>, params: &ScanParams) -> Vec<Detection> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(params.min_size.max(MIN_FACE_SIZE) as u32);
        detector.set_max_face_size(params.max_size as u32);
        detector.set_pyramid_scale_factor(pyramid_factor(params.scale_factor));
        let step = window_step(params.shift_factor);
        detector.set_slide_window_step(step, step);
        detector.set_score_thresh(SCORE_THRESHOLD);

        let image = rustface::ImageData::new(frame.pixels, frame.cols as u32, frame.rows as u32);
        detector
            .detect(&image)
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                let (width, height) = (bbox.width() as i32, bbox.height() as i32);
                Detection::new(
                    bbox.y() + height / 2,
                    bbox.x() + width / 2,
                    width.max(height) as f32,
                    face.score() as f32,
                )
            })
            .collect()
    }
}

impl FaceScanner for RustfaceScanner {
    fn scan(&self, frame: &GrayFrame<'_>, params: &ScanParams) -> Result<Vec<Detection>> {
        let frame = GrayFrame::new(frame.pixels, frame.rows, frame.cols)?;

        let min_size = params.min_size.max(MIN_FACE_SIZE);
        if frame.rows.min(frame.cols) < min_size || params.max_size < min_size {
            return Ok(Vec::new());
        }

        scan_rotated(&frame, params.angle, |upright| Ok(self.scan_upright(upright, params)))
    }
}

/// rustface shrinks the image by this factor between pyramid levels, which
/// grows the effective window by `scale_factor`.
fn pyramid_factor(scale_factor: f64) -> f32 {
    (1.0 / scale_factor).clamp(0.01, 0.99) as f32
}

/// Window step in pixels of the 40px detection window.
fn window_step(shift_factor: f64) -> u32 {
    ((shift_factor * WINDOW_SIZE).round() as u32).max(1)
}
