use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::FaceCropError;
use crate::sink::FileSink;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    /// Worker threads shared by image and crop tasks. 0 means one per core.
    #[serde(default)]
    pub jobs: usize,

    /// Write logs to a daily rolling file in this directory instead of stderr.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Minimum edge of each crop in pixels.
    #[serde(default = "default_output_size")]
    pub size: u32,

    /// Fraction of the crop the face should fill, in (0, 1].
    #[serde(default = "default_face_factor")]
    pub face: f64,

    /// File extension of the written crops; also selects the encoder.
    #[serde(default = "default_output_format")]
    pub format: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("faces")
}

fn default_output_size() -> u32 {
    256
}

fn default_face_factor() -> f64 {
    0.5
}

fn default_output_format() -> String {
    "png".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            size: default_output_size(),
            face: default_face_factor(),
            format: default_output_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_shift_factor")]
    pub shift: f64,

    #[serde(default = "default_scale_factor")]
    pub scale: f64,

    /// In-plane face rotation, 0.0 is 0 radians and 1.0 is 2*pi radians.
    #[serde(default)]
    pub angle: f64,

    /// SeetaFace model file. Falls back to the compiled-in model when unset.
    #[serde(default)]
    pub model: Option<PathBuf>,
}

fn default_shift_factor() -> f64 {
    0.1
}

fn default_scale_factor() -> f64 {
    1.1
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            shift: default_shift_factor(),
            scale: default_scale_factor(),
            angle: 0.0,
            model: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Intersection over union above which detections are merged.
    #[serde(default = "default_iou_threshold")]
    pub iou: f64,

    #[serde(default = "default_min_score")]
    pub score: f32,
}

fn default_iou_threshold() -> f64 {
    0.2
}

fn default_min_score() -> f32 {
    0.5
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            iou: default_iou_threshold(),
            score: default_min_score(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            scan: ScanConfig::default(),
            filter: FilterConfig::default(),
            jobs: 0,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load the config file at `path`, or from the default location.
    ///
    /// An explicit path must exist. The default location is optional and
    /// yields the built-in defaults when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// `FACECROP_CONFIG`, else `$XDG_CONFIG_HOME/facecrop/config.toml`.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("FACECROP_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("facecrop")
            .join("config.toml")
    }

    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> std::result::Result<(), FaceCropError> {
        let invalid =
            |msg: String| -> std::result::Result<(), FaceCropError> { Err(FaceCropError::InvalidConfig(msg)) };

        if self.output.size == 0 {
            return invalid("size must be greater than 0".into());
        }
        if !(self.output.face > 0.0 && self.output.face <= 1.0) {
            return invalid(format!("face must be in (0, 1], got {}", self.output.face));
        }
        FileSink::from_extension(&self.output.format)?;
        if !(self.scan.shift > 0.0 && self.scan.shift <= 1.0) {
            return invalid(format!("shift must be in (0, 1], got {}", self.scan.shift));
        }
        if self.scan.scale.is_nan() || self.scan.scale <= 1.0 {
            return invalid(format!("scale must be greater than 1, got {}", self.scan.scale));
        }
        if !(0.0..=1.0).contains(&self.scan.angle) {
            return invalid(format!("angle must be in [0, 1], got {}", self.scan.angle));
        }
        if !(0.0..=1.0).contains(&self.filter.iou) {
            return invalid(format!("iou must be in [0, 1], got {}", self.filter.iou));
        }
        if self.filter.score.is_nan() {
            return invalid("score must be a number".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let config = Config::default();
        assert_eq!(config.output.dir, PathBuf::from("faces"));
        assert_eq!(config.output.size, 256);
        assert_eq!(config.output.face, 0.5);
        assert_eq!(config.output.format, "png");
        assert_eq!(config.scan.shift, 0.1);
        assert_eq!(config.scan.scale, 1.1);
        assert_eq!(config.scan.angle, 0.0);
        assert_eq!(config.filter.iou, 0.2);
        assert_eq!(config.filter.score, 0.5);
        assert_eq!(config.jobs, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            jobs = 4

            [output]
            dir = "crops"
            size = 128

            [filter]
            score = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(config.jobs, 4);
        assert_eq!(config.output.dir, PathBuf::from("crops"));
        assert_eq!(config.output.size, 128);
        assert_eq!(config.output.face, 0.5);
        assert_eq!(config.filter.score, 2.5);
        assert_eq!(config.filter.iou, 0.2);
        assert_eq!(config.scan.scale, 1.1);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scan]\nangle = 0.25\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.scan.angle, 0.25);

        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let cases: Vec<fn(&mut Config)> = vec![
            |c: &mut Config| c.output.size = 0,
            |c: &mut Config| c.output.face = 0.0,
            |c: &mut Config| c.output.face = 1.5,
            |c: &mut Config| c.output.format = "nope".into(),
            |c: &mut Config| c.output.format = "ico".into(),
            |c: &mut Config| c.output.format = "avif".into(),
            |c: &mut Config| c.scan.shift = 0.0,
            |c: &mut Config| c.scan.scale = 1.0,
            |c: &mut Config| c.scan.angle = 1.5,
            |c: &mut Config| c.scan.angle = -0.1,
            |c: &mut Config| c.filter.iou = 2.0,
            |c: &mut Config| c.filter.score = f32::NAN,
        ];
        for mutate in cases {
            let mut config = Config::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(FaceCropError::InvalidConfig(_))),
                "accepted {:?}",
                config
            );
        }
    }

    #[test]
    fn validate_accepts_other_formats() {
        for format in ["jpg", "ff", "hdr", "exr", "pnm", "webp"] {
            let mut config = Config::default();
            config.output.format = format.into();
            assert!(config.validate().is_ok(), "rejected {}", format);
        }
    }
}
