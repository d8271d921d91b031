//! Batch face cropping.
//!
//! Each input image is scanned with the SeetaFace detector, overlapping
//! detections are merged, weak ones dropped, and a square crop around every
//! remaining face is written to the output directory as
//! `{stem}_{NN}.{format}`.
//!
//! ```no_run
//! use facecrop::{batch, Config};
//! use std::path::PathBuf;
//!
//! let mut config = Config::default();
//! config.scan.model = Some(PathBuf::from("model/seeta_fd_frontal_v1.0.bin"));
//! let report = batch::run(&[PathBuf::from("group.jpg")], &config).unwrap();
//! println!("saved {} crops", report.crops_saved);
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod faces;
pub mod logging;
pub mod sink;

pub use batch::BatchReport;
pub use config::Config;
pub use error::FaceCropError;
pub use sink::{CropSink, FileSink};
