//! Plate image loading
//!
//! Decodes a photograph into the RGB raster the pipeline works on. The
//! format is chosen from the file extension; decoding is done by the `image`
//! crate. Orientation metadata is not applied: plates are expected to be
//! photographed with the origin line at the bottom of the frame.

use crate::config::PreprocessingConfig;
use crate::error::{AnalysisError, Result};
use image::{imageops::FilterType, ImageReader, RgbImage};
use log::debug;
use std::path::Path;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// BMP image
    Bmp,
    /// TIFF image
    Tiff,
    /// WebP image
    WebP,
    /// GIF image (first frame only)
    Gif,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "bmp" => Some(ImageFormat::Bmp),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "webp" => Some(ImageFormat::WebP),
            "gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Gif => image::ImageFormat::Gif,
        }
    }
}

/// Load a plate photograph as an RGB raster
///
/// # Errors
///
/// Returns `AnalysisError::InvalidImage` if:
/// - The extension is not a supported image format
/// - The file cannot be opened
/// - Decoding fails or yields an empty raster
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let format = ImageFormat::from_extension(path).ok_or_else(|| {
        AnalysisError::invalid_image_msg(format!(
            "Unknown image format for file: {}",
            path.display()
        ))
    })?;

    let mut reader = ImageReader::open(path).map_err(|e| {
        AnalysisError::invalid_image(format!("Failed to open image file: {}", path.display()), e)
    })?;
    reader.set_format(format.to_image_format());

    let decoded = reader.decode().map_err(|e| {
        AnalysisError::invalid_image(format!("Failed to decode image: {}", path.display()), e)
    })?;

    let rgb = decoded.to_rgb8();
    ensure_non_empty(&rgb)?;
    debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        rgb.width(),
        rgb.height(),
        format
    );
    Ok(rgb)
}

/// Apply preprocessing to a decoded raster
///
/// Returns the input unchanged when no resize is configured.
pub fn preprocess(image: RgbImage, config: &PreprocessingConfig) -> Result<RgbImage> {
    ensure_non_empty(&image)?;
    match config.resize {
        Some([width, height]) if (width, height) != image.dimensions() => {
            debug!(
                "Resizing {}x{} -> {}x{}",
                image.width(),
                image.height(),
                width,
                height
            );
            Ok(image::imageops::resize(&image, width, height, FilterType::Lanczos3))
        }
        _ => Ok(image),
    }
}

/// Reject rasters with no pixels
pub(crate) fn ensure_non_empty(image: &RgbImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(AnalysisError::invalid_image_msg(format!(
            "Image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}

/// Get list of all supported file extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp", "gif"]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}
