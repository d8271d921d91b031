use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat};

use crate::error::{FaceCropError, Result};
use crate::faces::CropRect;

/// Destination for face crops.
pub trait CropSink: Send + Sync {
    /// Cut `rect` out of `image` and persist it at `path`.
    fn save(&self, image: &DynamicImage, rect: &CropRect, path: &Path) -> Result<()>;
}

/// Pixel layout handed to an encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Source,
    Rgb8,
    Rgba8,
    Rgba16,
    Rgb32F,
}

impl Layout {
    /// Layout the encoder for `format` accepts, or `None` when crops can't be
    /// written in it.
    fn for_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png | ImageFormat::Tiff => Some(Layout::Source),
            ImageFormat::Jpeg | ImageFormat::Pnm => Some(Layout::Rgb8),
            ImageFormat::Bmp
            | ImageFormat::Gif
            | ImageFormat::Tga
            | ImageFormat::WebP
            | ImageFormat::Qoi => Some(Layout::Rgba8),
            ImageFormat::Farbfeld => Some(Layout::Rgba16),
            ImageFormat::Hdr | ImageFormat::OpenExr => Some(Layout::Rgb32F),
            // ico caps images at 256px, avif and the rest are not wired up
            _ => None,
        }
    }

    fn convert(self, crop: DynamicImage) -> DynamicImage {
        match self {
            Layout::Source => crop,
            Layout::Rgb8 => DynamicImage::ImageRgb8(crop.to_rgb8()),
            Layout::Rgba8 => DynamicImage::ImageRgba8(crop.to_rgba8()),
            Layout::Rgba16 => DynamicImage::ImageRgba16(crop.to_rgba16()),
            Layout::Rgb32F => DynamicImage::ImageRgb32F(crop.to_rgb32f()),
        }
    }
}

/// Writes each crop to its own file with a fixed encoder.
#[derive(Debug, Clone)]
pub struct FileSink {
    format: ImageFormat,
    layout: Layout,
}

impl FileSink {
    /// Sink for `format`, or `None` when crops can't be encoded in it.
    pub fn new(format: ImageFormat) -> Option<Self> {
        Layout::for_format(format)
            .filter(|_| format.writing_enabled())
            .map(|layout| Self { format, layout })
    }

    /// Pick the encoder from a file extension such as `png` or `jpg`.
    pub fn from_extension(extension: &str) -> Result<Self> {
        ImageFormat::from_extension(extension)
            .and_then(Self::new)
            .ok_or_else(|| {
                FaceCropError::InvalidConfig(format!("unsupported output format {:?}", extension))
            })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

impl CropSink for FileSink {
    fn save(&self, image: &DynamicImage, rect: &CropRect, path: &Path) -> Result<()> {
        let crop = self
            .layout
            .convert(image.crop_imm(rect.min_x, rect.min_y, rect.width(), rect.height()));

        let file = File::create(path).map_err(|source| FaceCropError::CreateOutput {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        let encode_err = |source: image::ImageError| FaceCropError::Encode {
            path: path.to_path_buf(),
            source,
        };
        crop.write_to(&mut writer, self.format).map_err(encode_err)?;
        writer
            .flush()
            .map_err(|e| encode_err(image::ImageError::IoError(e)))?;

        Ok(())
    }
}
