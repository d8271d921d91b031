use super::detector::Detection;

/// Square crop region within the source image, `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }
}

/// Square crop around a detection.
///
/// The edge is `max(min_size, scale / face_factor)` so the face fills roughly
/// `face_factor` of the frame, capped at the shorter image side. The square
/// is centered on the detection and shifted inward when it would cross an
/// image edge.
pub fn compute_crop(
    detection: &Detection,
    cols: u32,
    rows: u32,
    min_size: u32,
    face_factor: f64,
) -> CropRect {
    let wanted = f64::max(min_size as f64, detection.scale as f64 / face_factor).round();
    let side = (wanted as i64).clamp(0, cols.min(rows) as i64);

    let x = (detection.col as i64 - side / 2).clamp(0, cols as i64 - side);
    let y = (detection.row as i64 - side / 2).clamp(0, rows as i64 - side);

    CropRect {
        min_x: x as u32,
        min_y: y as u32,
        max_x: (x + side) as u32,
        max_y: (y + side) as u32,
    }
}
