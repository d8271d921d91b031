use image::GrayImage;

use crate::error::{FaceCropError, Result};

/// A candidate face found by a scan.
///
/// `row`/`col` locate the window center, `scale` is the window edge in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub row: i32,
    pub col: i32,
    pub scale: f32,
    pub score: f32,
}

impl Detection {
    pub fn new(row: i32, col: i32, scale: f32, score: f32) -> Self {
        Self {
            row,
            col,
            scale,
            score,
        }
    }
}

/// Borrowed row-major luminance buffer handed to a scanner.
#[derive(Debug, Clone, Copy)]
pub struct GrayFrame<'a> {
    pub pixels: &'a [u8],
    pub rows: usize,
    pub cols: usize,
}

impl<'a> GrayFrame<'a> {
    pub fn new(pixels: &'a [u8], rows: usize, cols: usize) -> Result<Self> {
        if pixels.len() != rows * cols {
            return Err(FaceCropError::Scan(format!(
                "pixel buffer holds {} samples, expected {}x{}",
                pixels.len(),
                cols,
                rows
            )));
        }
        Ok(Self { pixels, rows, cols })
    }

    pub fn from_luma(image: &'a GrayImage) -> Self {
        Self {
            pixels: image.as_raw(),
            rows: image.height() as usize,
            cols: image.width() as usize,
        }
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> u8 {
        self.pixels[row * self.cols + col]
    }
}

/// Window search parameters for one scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanParams {
    /// Smallest window edge in pixels.
    pub min_size: usize,
    /// Largest window edge in pixels.
    pub max_size: usize,
    /// Window step as a fraction of the window edge.
    pub shift_factor: f64,
    /// Growth factor between consecutive window sizes.
    pub scale_factor: f64,
    /// In-plane rotation, 0.0..=1.0 of a full turn.
    pub angle: f64,
}

/// Pluggable face scanning backend.
///
/// The pipeline shares one scanner across all worker threads.
pub trait FaceScanner: Send + Sync {
    /// Return every raw candidate window in `frame`, unclustered.
    fn scan(&self, frame: &GrayFrame<'_>, params: &ScanParams) -> Result<Vec<Detection>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_mismatched_buffer() {
        let pixels = vec![0u8; 10];
        assert!(GrayFrame::new(&pixels, 3, 3).is_err());
        assert!(GrayFrame::new(&pixels, 2, 5).is_ok());
    }

    #[test]
    fn frame_from_luma_is_row_major() {
        let mut img = GrayImage::new(4, 2);
        img.put_pixel(3, 1, image::Luma([200]));
        let frame = GrayFrame::from_luma(&img);
        assert_eq!(frame.rows, 2);
        assert_eq!(frame.cols, 4);
        assert_eq!(frame.at(1, 3), 200);
        assert_eq!(frame.at(0, 0), 0);
    }
}
