pub mod clustering;
pub mod detector;
pub mod geometry;
pub mod processor;
pub mod rotation;
pub mod rustface_backend;

pub use clustering::cluster_detections;
pub use detector::{Detection, FaceScanner, GrayFrame, ScanParams};
pub use geometry::{compute_crop, CropRect};
pub use processor::{FaceProcessor, ImageOutcome};
pub use rotation::{scan_rotated, Rotation};
pub use rustface_backend::RustfaceScanner;
