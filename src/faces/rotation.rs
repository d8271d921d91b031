//! In-plane rotation for scanners that only find upright faces.

use super::detector::{Detection, GrayFrame};
use crate::error::Result;

/// Maps between a frame and a copy of it turned by a fraction of a full turn.
///
/// Pixel (r, c) of the turned copy shows the source at
/// `center + R(angle) * ((r, c) - center)`, so an upright face in the copy is
/// a face tilted by `angle` in the source.
#[derive(Debug, Clone, Copy)]
pub struct Rotation {
    cos: f64,
    sin: f64,
    center_row: f64,
    center_col: f64,
}

impl Rotation {
    pub fn new(angle: f64, rows: usize, cols: usize) -> Self {
        let theta = angle * std::f64::consts::TAU;
        Self {
            cos: theta.cos(),
            sin: theta.sin(),
            center_row: (rows as f64 - 1.0) / 2.0,
            center_col: (cols as f64 - 1.0) / 2.0,
        }
    }

    /// Source position shown at (`row`, `col`) of the turned copy.
    pub fn to_source(&self, row: f64, col: f64) -> (f64, f64) {
        let dr = row - self.center_row;
        let dc = col - self.center_col;
        (
            self.center_row + self.cos * dr - self.sin * dc,
            self.center_col + self.sin * dr + self.cos * dc,
        )
    }

    /// Nearest-neighbour resample of `frame`. Samples outside it are black.
    pub fn apply(&self, frame: &GrayFrame<'_>) -> Vec<u8> {
        let mut turned = vec![0u8; frame.rows * frame.cols];
        if frame.cols == 0 {
            return turned;
        }

        for (row, line) in turned.chunks_mut(frame.cols).enumerate() {
            for (col, pixel) in line.iter_mut().enumerate() {
                let (sr, sc) = self.to_source(row as f64, col as f64);
                let (sr, sc) = (sr.round(), sc.round());
                if sr >= 0.0 && sc >= 0.0 && (sr as usize) < frame.rows && (sc as usize) < frame.cols {
                    *pixel = frame.at(sr as usize, sc as usize);
                }
            }
        }
        turned
    }
}

/// Run the upright `scan` on `frame` turned by `angle` and map the window
/// centers it finds back into `frame`. Whole turns scan the frame as is.
pub fn scan_rotated<F>(frame: &GrayFrame<'_>, angle: f64, scan: F) -> Result<Vec<Detection>>
where
    F: FnOnce(&GrayFrame<'_>) -> Result<Vec<Detection>>,
{
    if angle.fract() == 0.0 {
        return scan(frame);
    }

    let rotation = Rotation::new(angle, frame.rows, frame.cols);
    let pixels = rotation.apply(frame);
    let turned = GrayFrame::new(&pixels, frame.rows, frame.cols)?;

    let found = scan(&turned)?;
    Ok(found
        .into_iter()
        .map(|det| {
            let (row, col) = rotation.to_source(det.row as f64, det.col as f64);
            Detection {
                row: row.round() as i32,
                col: col.round() as i32,
                ..det
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(rows: usize, cols: usize, marks: &[(usize, usize)]) -> Vec<u8> {
        let mut pixels = vec![0u8; rows * cols];
        for (row, col) in marks {
            pixels[row * cols + col] = 255;
        }
        pixels
    }

    fn bright(pixels: &[u8], cols: usize) -> Vec<(usize, usize)> {
        pixels
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == 255)
            .map(|(i, _)| (i / cols, i % cols))
            .collect()
    }

    #[test]
    fn quarter_turn_moves_off_center_pixel() {
        // Above the center of a 31x31 frame; a quarter turn shows it right of center.
        let pixels = marked(31, 31, &[(5, 15)]);
        let frame = GrayFrame::new(&pixels, 31, 31).unwrap();

        let turned = Rotation::new(0.25, 31, 31).apply(&frame);
        assert_eq!(bright(&turned, 31), vec![(15, 25)]);
    }

    #[test]
    fn half_turn_on_wide_frame() {
        let pixels = marked(20, 30, &[(0, 0), (3, 7)]);
        let frame = GrayFrame::new(&pixels, 20, 30).unwrap();

        let turned = Rotation::new(0.5, 20, 30).apply(&frame);
        assert_eq!(bright(&turned, 30), vec![(16, 22), (19, 29)]);
    }

    #[test]
    fn to_source_inverts_apply() {
        let rotation = Rotation::new(0.25, 31, 31);
        let (row, col) = rotation.to_source(15.0, 25.0);
        assert!((row - 5.0).abs() < 1e-9);
        assert!((col - 15.0).abs() < 1e-9);
    }

    /// Reports a window at every bright pixel of the frame it is given.
    fn find_marks(frame: &GrayFrame<'_>) -> Result<Vec<Detection>> {
        Ok(bright(frame.pixels, frame.cols)
            .into_iter()
            .map(|(row, col)| Detection::new(row as i32, col as i32, 20.0, 1.0))
            .collect())
    }

    #[test]
    fn rotated_scan_reports_source_positions() {
        let pixels = marked(31, 31, &[(5, 15), (15, 22)]);
        let frame = GrayFrame::new(&pixels, 31, 31).unwrap();

        let mut seen = Vec::new();
        let found = scan_rotated(&frame, 0.25, |turned| {
            seen = bright(turned.pixels, turned.cols);
            find_marks(turned)
        })
        .unwrap();

        // The scanner sees the marks turned a quarter, the caller gets them back in place.
        assert_eq!(seen, vec![(15, 25), (22, 15)]);
        let mut centers: Vec<_> = found.iter().map(|d| (d.row, d.col)).collect();
        centers.sort();
        assert_eq!(centers, vec![(5, 15), (15, 22)]);
        assert!(found.iter().all(|d| d.scale == 20.0 && d.score == 1.0));
    }

    #[test]
    fn whole_turns_scan_the_frame_unchanged() {
        let pixels = marked(10, 12, &[(2, 9)]);
        let frame = GrayFrame::new(&pixels, 10, 12).unwrap();

        for angle in [0.0, 1.0] {
            let found = scan_rotated(&frame, angle, |upright| {
                assert_eq!(upright.pixels.as_ptr(), pixels.as_ptr());
                find_marks(upright)
            })
            .unwrap();
            assert_eq!(found, vec![Detection::new(2, 9, 20.0, 1.0)]);
        }
    }
}
