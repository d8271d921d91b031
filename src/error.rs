use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceCropError {
    #[error("failed to read face model {}: {source}", .path.display())]
    ModelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to unpack face model: {0}")]
    ModelUnpack(String),

    #[error("no face model available (pass --model or vendor model/seeta_fd_frontal_v1.0.bin before building)")]
    ModelMissing,

    #[error("failed to decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("scan failed: {0}")]
    Scan(String),

    #[error("failed to create {}: {source}", .path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, FaceCropError>;
