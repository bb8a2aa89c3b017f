use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::config::DEFAULT_MAX_WIDTH;
use crate::errors::{ScoutError, ScoutResult};

/// Image ready to be handed to the OCR engine
#[derive(Debug)]
pub enum PreparedImage {
    /// The input file, untouched
    Original(PathBuf),
    /// A downsized copy, deleted when this value is dropped
    Resized(NamedTempFile),
}

impl PreparedImage {
    /// Path the OCR engine should read
    pub fn path(&self) -> &Path {
        match self {
            Self::Original(path) => path,
            Self::Resized(file) => file.path(),
        }
    }

    pub fn is_resized(&self) -> bool {
        matches!(self, Self::Resized(_))
    }
}

/// Optionally downsizes images that are wider than `max_width`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePreprocessor {
    compress: bool,
    max_width: u32,
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(false, DEFAULT_MAX_WIDTH)
    }
}

impl ImagePreprocessor {
    pub fn new(compress: bool, max_width: u32) -> Self {
        Self {
            compress,
            max_width,
        }
    }

    pub fn compress(&self) -> bool {
        self.compress
    }

    /// Prepares `path` for OCR.
    ///
    /// With compression disabled this is the identity and never touches the file.
    /// Otherwise the image is decoded; if it is wider than `max_width` it is
    /// resized to that width with a Lanczos filter, keeping the aspect ratio,
    /// and re-encoded in its original format into a temporary file. Only PNG
    /// and JPEG sources are accepted.
    pub fn prepare(&self, path: &Path) -> ScoutResult<PreparedImage> {
        if !self.compress {
            return Ok(PreparedImage::Original(path.to_path_buf()));
        }

        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = match reader.format() {
            Some(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => format,
            Some(other) => return Err(ScoutError::unsupported_format(path, format!("{:?}", other))),
            None => return Err(ScoutError::unsupported_format(path, "unknown")),
        };
        let image = reader
            .decode()
            .map_err(|e| ScoutError::image_decode(path, e))?;

        if image.width() <= self.max_width {
            trace!(
                "{} is {}px wide, no resize needed",
                path.display(),
                image.width()
            );
            return Ok(PreparedImage::Original(path.to_path_buf()));
        }

        let (width, height) = scaled_dimensions(image.width(), image.height(), self.max_width);
        debug!(
            "Resizing {} from {}x{} to {}x{}",
            path.display(),
            image.width(),
            image.height(),
            width,
            height
        );
        let resized = image.resize_exact(width, height, FilterType::Lanczos3);

        let file = temp_file_for(path, format)?;
        let encoded = match format {
            // JPEG has no alpha channel
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
            _ => resized,
        };
        encoded
            .save_with_format(file.path(), format)
            .map_err(|e| ScoutError::image_write(path, e))?;

        Ok(PreparedImage::Resized(file))
    }
}

/// Width and height after scaling `width` down to `max_width`, rounding the height
fn scaled_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round();
    (max_width, (scaled as u32).max(1))
}

fn temp_file_for(source: &Path, format: ImageFormat) -> ScoutResult<NamedTempFile> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let suffix = match format {
        ImageFormat::Jpeg => ".jpg",
        _ => ".png",
    };
    let file = tempfile::Builder::new()
        .prefix(&format!("ocrscout-{}-", stem))
        .suffix(suffix)
        .tempfile()?;
    Ok(file)
}
